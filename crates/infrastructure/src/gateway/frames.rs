//! 网关帧定义
//!
//! 每个 WebSocket 文本帧是一个以 `type` 字段区分的 JSON 对象。

use domain::{
    Jid, Nickname, PresenceKind, PresenceNotification, RoomAddress, RoomEvent, RoomMessage,
};
use serde::{Deserialize, Serialize};

use super::error::{GatewayError, GatewayResult};

/// 网关发给机器人的帧
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundFrame {
    /// XMPP 会话已建立
    SessionReady { jid: String },
    /// 房间在线状态
    Presence {
        room: String,
        #[serde(default)]
        nick: Option<String>,
        /// 参与者的完整 JID，匿名房间中缺失
        #[serde(default)]
        jid: Option<String>,
        #[serde(default)]
        kind: PresenceKind,
    },
    /// 房间群聊消息
    Groupchat {
        room: String,
        #[serde(default)]
        nick: Option<String>,
        #[serde(default)]
        body: Option<String>,
    },
    /// 加入房间确认
    Joined { room: String, nick: String },
    /// 加入房间失败
    JoinError { room: String, condition: String },
}

/// 网关建立 XMPP 连接时使用的传输选项
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportOptions {
    #[serde(default)]
    pub ipv6: bool,
    #[serde(default)]
    pub tls12: bool,
}

/// 机器人发给网关的帧
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundFrame {
    Auth {
        jid: String,
        password: String,
        #[serde(default)]
        transport: TransportOptions,
    },
    /// 广播自身在线状态
    Presence,
    Join {
        room: String,
        nick: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        password: Option<String>,
    },
}

// 手写 Debug，避免密码进入日志
impl std::fmt::Debug for OutboundFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutboundFrame::Auth { jid, transport, .. } => f
                .debug_struct("Auth")
                .field("jid", jid)
                .field("transport", transport)
                .finish(),
            OutboundFrame::Presence => f.write_str("Presence"),
            OutboundFrame::Join { room, nick, .. } => f
                .debug_struct("Join")
                .field("room", room)
                .field("nick", nick)
                .finish(),
        }
    }
}

impl OutboundFrame {
    pub fn encode(&self) -> GatewayResult<String> {
        serde_json::to_string(self).map_err(|e| GatewayError::Encode {
            message: e.to_string(),
        })
    }
}

/// 解码并校验后的入站帧
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    SessionReady(Jid),
    Room(RoomEvent),
    Joined { room: RoomAddress, nickname: Nickname },
    JoinError { room: RoomAddress, condition: String },
}

/// 解码文本帧
///
/// 非法 JSON、未知类型、缺少昵称或身份的帧都视为畸形帧。
pub fn decode(text: &str) -> GatewayResult<Inbound> {
    let frame: InboundFrame =
        serde_json::from_str(text).map_err(|e| GatewayError::malformed(e.to_string()))?;

    let inbound = match frame {
        InboundFrame::SessionReady { jid } => Inbound::SessionReady(
            Jid::parse(&jid).map_err(|e| GatewayError::malformed(e.to_string()))?,
        ),
        InboundFrame::Presence {
            room,
            nick,
            jid,
            kind,
        } => {
            let nickname = required_nickname(nick, "presence")?;
            let jid = jid.ok_or_else(|| {
                GatewayError::malformed(format!("presence from '{nickname}' carries no jid"))
            })?;
            let identity = Jid::parse(&jid)
                .map_err(|e| GatewayError::malformed(e.to_string()))?
                .bare();
            Inbound::Room(RoomEvent::Presence(PresenceNotification {
                room: parse_room(&room)?,
                nickname,
                identity,
                kind,
            }))
        }
        InboundFrame::Groupchat { room, nick, body } => {
            let nickname = required_nickname(nick, "groupchat")?;
            Inbound::Room(RoomEvent::Message(RoomMessage {
                room: parse_room(&room)?,
                nickname,
                body: body.unwrap_or_default(),
            }))
        }
        InboundFrame::Joined { room, nick } => Inbound::Joined {
            room: parse_room(&room)?,
            nickname: Nickname::parse(nick).map_err(|e| GatewayError::malformed(e.to_string()))?,
        },
        InboundFrame::JoinError { room, condition } => Inbound::JoinError {
            room: parse_room(&room)?,
            condition,
        },
    };
    Ok(inbound)
}

fn required_nickname(nick: Option<String>, kind: &str) -> GatewayResult<Nickname> {
    let nick = nick.ok_or_else(|| GatewayError::malformed(format!("{kind} carries no nick")))?;
    Nickname::parse(nick).map_err(|e| GatewayError::malformed(e.to_string()))
}

fn parse_room(room: &str) -> GatewayResult<RoomAddress> {
    RoomAddress::parse(room).map_err(|e| GatewayError::malformed(e.to_string()))
}
