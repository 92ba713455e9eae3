//! 聊天室审计机器人核心领域模型
//!
//! 包含昵称、稳定身份、房间地址等值对象，房间事件，以及审计记录。

pub mod audit;
pub mod errors;
pub mod events;
pub mod value_objects;

// 重新导出常用类型
pub use audit::*;
pub use errors::*;
pub use events::*;
pub use value_objects::*;
