use serde::{Deserialize, Serialize};

use crate::value_objects::{Nickname, RoomAddress, StableIdentity};

/// 在线状态类型，仅用于观测，追踪器对两者一视同仁
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceKind {
    #[default]
    Available,
    Unavailable,
}

/// 房间在线状态通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceNotification {
    pub room: RoomAddress,
    pub nickname: Nickname,
    pub identity: StableIdentity,
    pub kind: PresenceKind,
}

/// 房间群聊消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomMessage {
    pub room: RoomAddress,
    pub nickname: Nickname,
    /// 消息正文，可以为空
    pub body: String,
}

/// 适配器投递给核心的事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    Presence(PresenceNotification),
    Message(RoomMessage),
}

impl RoomEvent {
    pub fn room(&self) -> &RoomAddress {
        match self {
            RoomEvent::Presence(presence) => &presence.room,
            RoomEvent::Message(message) => &message.room,
        }
    }

    pub fn nickname(&self) -> &Nickname {
        match self {
            RoomEvent::Presence(presence) => &presence.nickname,
            RoomEvent::Message(message) => &message.nickname,
        }
    }
}
