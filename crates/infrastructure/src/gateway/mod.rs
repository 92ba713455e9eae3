//! XMPP 网关适配器
//!
//! 网关把 XMPP 会话桥接为一条 WebSocket 连接上的 JSON 文本帧。
//! 本模块负责把入站帧翻译为房间事件，并实现核心需要的会话命令。

pub mod client;
pub mod error;
pub mod frames;
pub mod session;

// 重新导出
pub use client::*;
pub use error::*;
pub use frames::*;
pub use session::*;
