//! 房间事件
//!
//! 协议适配器从入站通知中提取出的两类事件。

pub mod room_event;

pub use room_event::*;
