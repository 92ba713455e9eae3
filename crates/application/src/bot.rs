use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use config::BotConfig;
use domain::{
    DomainError, Jid, Nickname, PresenceNotification, RoomAddress, RoomEvent, RoomMessage,
    StableIdentity,
};

use crate::attributor::MessageAttributor;
use crate::error::ApplicationError;
use crate::handler::{RoomEventHandler, SessionCommands};
use crate::log_sink::{IgnoreReason, LogSink};
use crate::nickname_table::NicknameTable;
use crate::presence::PresenceTracker;

/// 核心使用的房间设置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSettings {
    pub room: RoomAddress,
    pub nickname: Nickname,
    pub password: Option<String>,
    /// 机器人账号的 bare JID，用于在昵称确认前识别自身的在线状态
    pub own_identity: Option<StableIdentity>,
}

impl RoomSettings {
    pub fn new(room: RoomAddress, nickname: Nickname) -> Self {
        Self {
            room,
            nickname,
            password: None,
            own_identity: None,
        }
    }

    pub fn with_own_identity(mut self, identity: StableIdentity) -> Self {
        self.own_identity = Some(identity);
        self
    }

    pub fn from_config(config: &BotConfig) -> Result<Self, DomainError> {
        Ok(Self {
            room: RoomAddress::parse(&config.room.address)?,
            nickname: Nickname::parse(config.room.nickname.clone())?,
            password: config.room.password.clone().filter(|p| !p.is_empty()),
            own_identity: Some(Jid::parse(&config.account.jid)?.bare()),
        })
    }
}

/// 房间审计机器人
///
/// 组合在线状态追踪器与消息归属器，负责：
/// 1. 会话建立时广播在线状态并加入房间
/// 2. 过滤其他房间的事件与自身回显
/// 3. 把无法归属的消息记录为警告后丢弃
pub struct MucBot {
    settings: RoomSettings,
    /// 服务器确认后的自身昵称
    own_nickname: RwLock<Nickname>,
    table: Arc<NicknameTable>,
    tracker: PresenceTracker,
    attributor: MessageAttributor,
    log: Arc<dyn LogSink>,
}

impl MucBot {
    pub fn new(settings: RoomSettings, log: Arc<dyn LogSink>) -> Self {
        let table = Arc::new(NicknameTable::new());
        Self {
            own_nickname: RwLock::new(settings.nickname.clone()),
            tracker: PresenceTracker::new(table.clone(), log.clone()),
            attributor: MessageAttributor::new(table.clone(), log.clone()),
            table,
            settings,
            log,
        }
    }

    pub fn own_nickname(&self) -> Nickname {
        self.own_nickname
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn table(&self) -> &NicknameTable {
        &self.table
    }

    fn ignore_reason(&self, room: &RoomAddress, nickname: &Nickname) -> Option<IgnoreReason> {
        if room != &self.settings.room {
            return Some(IgnoreReason::OtherRoom);
        }
        if *nickname == self.own_nickname() {
            return Some(IgnoreReason::SelfEcho);
        }
        None
    }

    /// 服务器可能在加入确认之前就以改写后的昵称回送自身在线状态，
    /// 因此在线状态还要按身份识别自身
    fn presence_ignore_reason(&self, presence: &PresenceNotification) -> Option<IgnoreReason> {
        self.ignore_reason(&presence.room, &presence.nickname).or_else(|| {
            self.settings
                .own_identity
                .as_ref()
                .filter(|own| **own == presence.identity)
                .map(|_| IgnoreReason::SelfEcho)
        })
    }
}

#[async_trait]
impl RoomEventHandler for MucBot {
    async fn on_session_start(&self, session: &dyn SessionCommands) -> Result<(), ApplicationError> {
        session.send_own_presence().await?;

        let confirmed = session
            .join_room(
                &self.settings.room,
                &self.settings.nickname,
                self.settings.password.clone(),
            )
            .await?;

        *self
            .own_nickname
            .write()
            .unwrap_or_else(PoisonError::into_inner) = confirmed.clone();
        self.log.session_joined(&self.settings.room, &confirmed);
        Ok(())
    }

    fn on_presence(&self, presence: PresenceNotification) {
        if let Some(reason) = self.presence_ignore_reason(&presence) {
            self.log
                .event_ignored(&RoomEvent::Presence(presence), reason);
            return;
        }
        self.tracker.on_presence(presence.nickname, presence.identity);
    }

    fn on_message(&self, message: RoomMessage) {
        if let Some(reason) = self.ignore_reason(&message.room, &message.nickname) {
            self.log.event_ignored(&RoomEvent::Message(message), reason);
            return;
        }
        if let Err(err) = self.attributor.on_message(&message.nickname, &message.body) {
            self.log.message_dropped(&message.nickname, &err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BotConfig {
        let mut config = BotConfig::default();
        config.account.jid = "Bot@example.org/desktop".to_string();
        config.room.address = "Lobby@Conference.example.org".to_string();
        config.room.nickname = "auditor".to_string();
        config
    }

    #[test]
    fn settings_from_config() {
        let mut config = config();
        config.room.password = Some(String::new());
        let settings = RoomSettings::from_config(&config).unwrap();
        assert_eq!(settings.room.as_str(), "lobby@conference.example.org");
        assert_eq!(settings.nickname.as_str(), "auditor");
        assert_eq!(settings.password, None);
        assert_eq!(
            settings.own_identity,
            Some(StableIdentity::parse("Bot@example.org").unwrap())
        );
    }

    #[test]
    fn settings_from_config_rejects_empty_nickname() {
        let mut config = config();
        config.room.nickname = String::new();
        assert!(RoomSettings::from_config(&config).is_err());
    }
}
