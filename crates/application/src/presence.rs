use std::sync::Arc;

use domain::{Nickname, StableIdentity};

use crate::log_sink::LogSink;
use crate::nickname_table::NicknameTable;

/// 在线状态追踪器
///
/// 昵称表的唯一写者。加入、更新、离开等在线状态一律视为
/// “把昵称重新关联到身份”。
pub struct PresenceTracker {
    table: Arc<NicknameTable>,
    log: Arc<dyn LogSink>,
}

impl PresenceTracker {
    pub fn new(table: Arc<NicknameTable>, log: Arc<dyn LogSink>) -> Self {
        Self { table, log }
    }

    pub fn on_presence(&self, nickname: Nickname, identity: StableIdentity) {
        self.log.presence_updated(&nickname, &identity);
        self.table.associate(nickname, identity);
    }
}
