//! 应用层实现。
//!
//! 昵称到稳定身份的解析与消息归属：在线状态追踪器是昵称表的唯一写者，
//! 消息归属器只读。`MucBot` 把两者与会话建立逻辑组合起来，
//! 通过 `RoomEventHandler` 暴露给协议适配器。

pub mod attributor;
pub mod bot;
pub mod error;
pub mod handler;
pub mod log_sink;
pub mod nickname_table;
pub mod presence;

pub use attributor::MessageAttributor;
pub use bot::{MucBot, RoomSettings};
pub use error::ApplicationError;
pub use handler::{RoomEventHandler, SessionCommands};
pub use log_sink::{IgnoreReason, LogSink, TracingLogSink, AUDIT_TARGET};
pub use nickname_table::NicknameTable;
pub use presence::PresenceTracker;
