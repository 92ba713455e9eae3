use std::fmt;

use crate::value_objects::StableIdentity;

/// 审计记录：把一条消息正文归属到发送者的稳定身份。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRecord {
    identity: StableIdentity,
    body: String,
}

impl AuditRecord {
    pub fn new(identity: StableIdentity, body: impl Into<String>) -> Self {
        Self {
            identity,
            body: body.into(),
        }
    }
}

/// 渲染为 `<identity> body`
impl fmt::Display for AuditRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}> {}", self.identity, self.body)
    }
}
