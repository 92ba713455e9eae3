use domain::Nickname;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("unknown sender: no presence recorded for nickname '{0}'")]
    UnknownSender(Nickname),
    #[error("session error: {0}")]
    Session(String),
}

impl ApplicationError {
    /// 创建会话错误
    pub fn session(message: impl Into<String>) -> Self {
        ApplicationError::Session(message.into())
    }
}
