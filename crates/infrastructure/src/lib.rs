//! 基础设施层
//!
//! 通过 WebSocket 与 XMPP 网关通信的协议适配器，
//! 负责连接、帧编解码、会话命令以及事件分发。

pub mod gateway;
pub mod retry;

pub use gateway::{
    GatewayClient, GatewayError, GatewaySession, GatewaySettings, TransportOptions,
};
pub use retry::{retry_async, Backoff, RetryConfig};
