//! 网关错误类型定义

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// 网关操作错误
#[derive(Error, Debug)]
pub enum GatewayError {
    /// 连接或传输错误
    #[error("gateway transport error: {message}")]
    Transport { message: String },

    /// 无法解析或缺少必要字段的帧
    #[error("malformed frame: {message}")]
    MalformedFrame { message: String },

    /// 序列化错误
    #[error("failed to encode frame: {message}")]
    Encode { message: String },

    /// 会话建立失败（加入房间被拒绝或超时）
    #[error("session start failed: {message}")]
    SessionStart { message: String },
}

impl GatewayError {
    pub fn malformed(message: impl Into<String>) -> Self {
        GatewayError::MalformedFrame {
            message: message.into(),
        }
    }
}

/// 网关结果类型
pub type GatewayResult<T> = Result<T, GatewayError>;

impl From<tungstenite::Error> for GatewayError {
    fn from(err: tungstenite::Error) -> Self {
        GatewayError::Transport {
            message: err.to_string(),
        }
    }
}
