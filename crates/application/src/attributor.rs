use std::sync::Arc;

use domain::{AuditRecord, Nickname};

use crate::error::ApplicationError;
use crate::log_sink::LogSink;
use crate::nickname_table::NicknameTable;

/// 消息归属器
///
/// 通过昵称表解析发送者，每条可归属的消息输出一条审计记录。
/// 不去重，重复消息产生重复的审计行。
pub struct MessageAttributor {
    table: Arc<NicknameTable>,
    log: Arc<dyn LogSink>,
}

impl MessageAttributor {
    pub fn new(table: Arc<NicknameTable>, log: Arc<dyn LogSink>) -> Self {
        Self { table, log }
    }

    /// 查不到昵称时返回 `UnknownSender`，不输出任何记录
    pub fn on_message(
        &self,
        nickname: &Nickname,
        body: &str,
    ) -> Result<AuditRecord, ApplicationError> {
        let identity = self
            .table
            .resolve(nickname)
            .ok_or_else(|| ApplicationError::UnknownSender(nickname.clone()))?;

        let record = AuditRecord::new(identity, body);
        self.log.audit(&record);
        Ok(record)
    }
}
