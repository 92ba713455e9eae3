use std::sync::Arc;
use std::time::Duration;

use application::{ApplicationError, RoomEventHandler};
use config::BotConfig;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use super::error::{GatewayError, GatewayResult};
use super::frames::{decode, Inbound, OutboundFrame, TransportOptions};
use super::session::GatewaySession;
use crate::retry::{retry_async, RetryConfig};

/// 网关连接参数
#[derive(Clone)]
pub struct GatewaySettings {
    pub url: String,
    pub jid: String,
    pub password: String,
    pub transport: TransportOptions,
    pub retry: RetryConfig,
    pub join_timeout: Duration,
}

impl GatewaySettings {
    pub fn from_config(config: &BotConfig) -> Self {
        Self {
            url: config.gateway.url.clone(),
            jid: config.account.jid.clone(),
            password: config.account.password.clone(),
            transport: TransportOptions {
                ipv6: config.gateway.ipv6,
                tls12: config.gateway.tls12,
            },
            retry: RetryConfig::new(
                config.gateway.connect_attempts,
                Duration::from_millis(config.gateway.retry_base_ms),
            ),
            join_timeout: Duration::from_secs(config.gateway.join_timeout_secs),
        }
    }
}

/// 网关客户端
///
/// 一次 `run` 对应一条连接、一个会话：
/// - 连接失败按重试策略重连，耗尽后返回错误
/// - 入站帧在当前任务中按到达顺序同步分发
/// - 会话建立在独立任务中执行，避免阻塞等待加入确认的分发循环
pub struct GatewayClient {
    settings: GatewaySettings,
}

impl GatewayClient {
    pub fn new(settings: GatewaySettings) -> Self {
        Self { settings }
    }

    /// 运行直到网关关闭连接或会话建立失败
    pub async fn run(&self, handler: Arc<dyn RoomEventHandler>) -> GatewayResult<()> {
        let url = self.settings.url.as_str();
        let (stream, _response) =
            retry_async(self.settings.retry.clone(), || connect_async(url)).await?;
        tracing::info!(url = %url, "已连接网关");

        let (mut sink, mut incoming) = stream.split();

        // 发送任务：统一处理所有对 WebSocket sender 的写操作
        let (cmd_tx, mut cmd_rx) = mpsc::channel::<OutboundFrame>(32);
        let send_task = tokio::spawn(async move {
            while let Some(frame) = cmd_rx.recv().await {
                let text = match frame.encode() {
                    Ok(text) => text,
                    Err(err) => {
                        tracing::warn!(error = %err, frame = ?frame, "网关帧编码失败");
                        continue;
                    }
                };
                if sink.send(Message::text(text)).await.is_err() {
                    tracing::warn!("发送网关帧失败");
                    break;
                }
            }
            tracing::debug!("网关发送任务结束");
        });

        let session = Arc::new(GatewaySession::new(cmd_tx, self.settings.join_timeout));
        if let Err(err) = session
            .authenticate(
                &self.settings.jid,
                &self.settings.password,
                self.settings.transport,
            )
            .await
        {
            send_task.abort();
            return Err(GatewayError::Transport {
                message: err.to_string(),
            });
        }

        let (failure_tx, mut failure_rx) = mpsc::channel::<ApplicationError>(1);
        let mut start_task: Option<JoinHandle<()>> = None;

        let result = loop {
            tokio::select! {
                frame = incoming.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        self.dispatch(text.as_str(), &handler, &session, &failure_tx, &mut start_task);
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::info!("网关连接已关闭");
                        break Ok(());
                    }
                    // ping/pong 由 tungstenite 自动处理
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        tracing::error!(error = %err, "网关连接错误");
                        break Err(GatewayError::from(err));
                    }
                },
                Some(err) = failure_rx.recv() => {
                    break Err(GatewayError::SessionStart { message: err.to_string() });
                }
            }
        };

        // 连接结束后不会再有加入确认
        session.abandon_pending_join();
        if let Some(task) = start_task {
            let _ = task.await;
        }
        send_task.abort();
        result
    }

    fn dispatch(
        &self,
        text: &str,
        handler: &Arc<dyn RoomEventHandler>,
        session: &Arc<GatewaySession>,
        failure_tx: &mpsc::Sender<ApplicationError>,
        start_task: &mut Option<JoinHandle<()>>,
    ) {
        match decode(text) {
            Ok(Inbound::Room(event)) => handler.handle(event),
            Ok(Inbound::SessionReady(jid)) => {
                if start_task.is_some() {
                    tracing::warn!(jid = %jid, "重复的会话就绪通知，已忽略");
                    return;
                }
                tracing::info!(jid = %jid, "XMPP 会话已建立");
                let handler = Arc::clone(handler);
                let session = Arc::clone(session);
                let failure_tx = failure_tx.clone();
                *start_task = Some(tokio::spawn(async move {
                    if let Err(err) = handler.on_session_start(&*session).await {
                        tracing::error!(error = %err, "会话建立失败");
                        let _ = failure_tx.try_send(err);
                    }
                }));
            }
            Ok(Inbound::Joined { room, nickname }) => {
                if !session.complete_join(&room, Ok(nickname)) {
                    tracing::debug!(room = %room, "没有等待中的加入请求，忽略确认");
                }
            }
            Ok(Inbound::JoinError { room, condition }) => {
                if !session.complete_join(&room, Err(condition.clone())) {
                    tracing::warn!(room = %room, condition = %condition, "收到未预期的加入失败通知");
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "丢弃畸形网关帧");
            }
        }
    }
}
