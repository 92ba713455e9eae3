use async_trait::async_trait;
use domain::{Nickname, PresenceNotification, RoomAddress, RoomEvent, RoomMessage};

use crate::error::ApplicationError;

/// 会话建立时核心向协议引擎发出的命令
#[async_trait]
pub trait SessionCommands: Send + Sync {
    /// 广播自己的在线状态
    async fn send_own_presence(&self) -> Result<(), ApplicationError>;

    /// 以指定昵称加入房间，等待确认后返回服务器确认的昵称
    async fn join_room(
        &self,
        room: &RoomAddress,
        nickname: &Nickname,
        password: Option<String>,
    ) -> Result<Nickname, ApplicationError>;
}

/// 核心对协议适配器暴露的能力接口
///
/// 适配器按到达顺序逐个调用；实现必须同步、快速地返回。
#[async_trait]
pub trait RoomEventHandler: Send + Sync {
    /// 会话就绪后调用一次
    async fn on_session_start(&self, session: &dyn SessionCommands) -> Result<(), ApplicationError>;

    fn on_presence(&self, presence: PresenceNotification);

    fn on_message(&self, message: RoomMessage);

    fn handle(&self, event: RoomEvent) {
        match event {
            RoomEvent::Presence(presence) => self.on_presence(presence),
            RoomEvent::Message(message) => self.on_message(message),
        }
    }
}
