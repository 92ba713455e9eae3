use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use application::{ApplicationError, SessionCommands};
use async_trait::async_trait;
use domain::{Nickname, RoomAddress};
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;

use super::frames::{OutboundFrame, TransportOptions};

/// 等待中的加入请求
struct PendingJoin {
    room: RoomAddress,
    reply: oneshot::Sender<Result<Nickname, String>>,
}

/// 网关会话命令
///
/// 所有出站帧经由 mpsc 通道交给发送任务，加入房间的确认
/// 由分发循环通过 `complete_join` 回填。
pub struct GatewaySession {
    outbound: mpsc::Sender<OutboundFrame>,
    pending_join: Mutex<Option<PendingJoin>>,
    join_timeout: Duration,
}

impl GatewaySession {
    pub fn new(outbound: mpsc::Sender<OutboundFrame>, join_timeout: Duration) -> Self {
        Self {
            outbound,
            pending_join: Mutex::new(None),
            join_timeout,
        }
    }

    async fn send(&self, frame: OutboundFrame) -> Result<(), ApplicationError> {
        self.outbound
            .send(frame)
            .await
            .map_err(|_| ApplicationError::session("gateway connection closed"))
    }

    pub async fn authenticate(
        &self,
        jid: &str,
        password: &str,
        transport: TransportOptions,
    ) -> Result<(), ApplicationError> {
        self.send(OutboundFrame::Auth {
            jid: jid.to_string(),
            password: password.to_string(),
            transport,
        })
        .await
    }

    /// 回填加入结果，房间不匹配或没有等待中的请求时返回 false
    pub fn complete_join(&self, room: &RoomAddress, result: Result<Nickname, String>) -> bool {
        let mut pending = self
            .pending_join
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match pending.take() {
            Some(join) if &join.room == room => join.reply.send(result).is_ok(),
            other => {
                *pending = other;
                false
            }
        }
    }

    /// 放弃等待中的加入请求，等待方会收到连接关闭错误
    pub fn abandon_pending_join(&self) {
        self.pending_join
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

#[async_trait]
impl SessionCommands for GatewaySession {
    async fn send_own_presence(&self) -> Result<(), ApplicationError> {
        self.send(OutboundFrame::Presence).await
    }

    async fn join_room(
        &self,
        room: &RoomAddress,
        nickname: &Nickname,
        password: Option<String>,
    ) -> Result<Nickname, ApplicationError> {
        let (reply, confirmation) = oneshot::channel();
        *self
            .pending_join
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(PendingJoin {
            room: room.clone(),
            reply,
        });

        self.send(OutboundFrame::Join {
            room: room.to_string(),
            nick: nickname.to_string(),
            password,
        })
        .await?;
        tracing::debug!(room = %room, nickname = %nickname, "已发送加入房间请求");

        match timeout(self.join_timeout, confirmation).await {
            Ok(Ok(Ok(confirmed))) => Ok(confirmed),
            Ok(Ok(Err(condition))) => Err(ApplicationError::session(format!(
                "join {room} rejected: {condition}"
            ))),
            Ok(Err(_)) => Err(ApplicationError::session(
                "gateway connection closed before join confirmation",
            )),
            Err(_) => {
                self.abandon_pending_join();
                Err(ApplicationError::session(format!(
                    "no join confirmation for {room} within {}s",
                    self.join_timeout.as_secs_f32()
                )))
            }
        }
    }
}
