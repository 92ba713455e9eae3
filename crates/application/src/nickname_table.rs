use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use domain::{Nickname, StableIdentity};

/// 昵称表：当前昵称 -> 稳定身份
///
/// 每个昵称只保留最近一次观察到的关联，离开房间不会删除条目。
/// 内部读写锁保证并发分发时的安全；单次插入不会让表处于中间状态，
/// 因此锁中毒时直接取回内部数据继续使用。
#[derive(Debug, Default)]
pub struct NicknameTable {
    entries: RwLock<HashMap<Nickname, StableIdentity>>,
}

impl NicknameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入或覆盖关联，返回被替换的旧身份
    pub fn associate(
        &self,
        nickname: Nickname,
        identity: StableIdentity,
    ) -> Option<StableIdentity> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(nickname, identity)
    }

    pub fn resolve(&self, nickname: &Nickname) -> Option<StableIdentity> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(nickname)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 当前内容的副本
    pub fn snapshot(&self) -> HashMap<Nickname, StableIdentity> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
