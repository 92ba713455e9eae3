use std::fmt;

use domain::{AuditRecord, Nickname, RoomAddress, RoomEvent, StableIdentity};

use crate::error::ApplicationError;

/// 审计通道名称，与运行日志区分
///
/// 沿用既有日志配置中按名称过滤的 logger 名。
pub const AUDIT_TARGET: &str = "xmppMessages";

/// 事件被忽略的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// 机器人自己发出的消息或在线状态
    SelfEcho,
    /// 不属于配置房间的事件
    OtherRoom,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreReason::SelfEcho => f.write_str("self-echo"),
            IgnoreReason::OtherRoom => f.write_str("other room"),
        }
    }
}

/// 注入到核心组件的日志输出
///
/// 核心不依赖进程级的日志单例，测试可以直接捕获输出。
pub trait LogSink: Send + Sync {
    /// 昵称关联更新（DEBUG）
    fn presence_updated(&self, nickname: &Nickname, identity: &StableIdentity);

    /// 审计记录（INFO，审计通道）
    fn audit(&self, record: &AuditRecord);

    /// 无法归属的消息被丢弃（WARN）
    fn message_dropped(&self, nickname: &Nickname, error: &ApplicationError);

    /// 事件被过滤（DEBUG）
    fn event_ignored(&self, event: &RoomEvent, reason: IgnoreReason);

    /// 已加入房间（INFO）
    fn session_joined(&self, room: &RoomAddress, nickname: &Nickname);
}

/// 基于 tracing 的实现
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn presence_updated(&self, nickname: &Nickname, identity: &StableIdentity) {
        tracing::debug!(
            nickname = %nickname,
            identity = %identity,
            "Nick: {:<32} JID: {}",
            nickname,
            identity
        );
    }

    fn audit(&self, record: &AuditRecord) {
        tracing::info!(target: AUDIT_TARGET, "{}", record);
    }

    fn message_dropped(&self, nickname: &Nickname, error: &ApplicationError) {
        tracing::warn!(nickname = %nickname, error = %error, "丢弃无法归属的消息");
    }

    fn event_ignored(&self, event: &RoomEvent, reason: IgnoreReason) {
        tracing::debug!(
            room = %event.room(),
            nickname = %event.nickname(),
            reason = %reason,
            "忽略房间事件"
        );
    }

    fn session_joined(&self, room: &RoomAddress, nickname: &Nickname) {
        tracing::info!(room = %room, nickname = %nickname, "已加入房间");
    }
}

/// 内存实现的日志输出（用于测试）
#[cfg(any(test, feature = "testing"))]
pub mod memory {
    use super::*;
    use std::sync::{Mutex, PoisonError};
    use tracing::Level;

    /// 日志通道
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum LogChannel {
        Audit,
        Operational,
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct LogEntry {
        pub level: Level,
        pub channel: LogChannel,
        pub line: String,
    }

    #[derive(Debug, Default)]
    pub struct MemoryLogSink {
        entries: Mutex<Vec<LogEntry>>,
    }

    impl MemoryLogSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn entries(&self) -> Vec<LogEntry> {
            self.entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// 审计通道上的所有行
        pub fn audit_lines(&self) -> Vec<String> {
            self.entries()
                .into_iter()
                .filter(|entry| entry.channel == LogChannel::Audit)
                .map(|entry| entry.line)
                .collect()
        }

        pub fn count(&self, level: Level) -> usize {
            self.entries()
                .iter()
                .filter(|entry| entry.level == level)
                .count()
        }

        fn push(&self, level: Level, channel: LogChannel, line: String) {
            self.entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(LogEntry {
                    level,
                    channel,
                    line,
                });
        }
    }

    impl LogSink for MemoryLogSink {
        fn presence_updated(&self, nickname: &Nickname, identity: &StableIdentity) {
            self.push(
                Level::DEBUG,
                LogChannel::Operational,
                format!("Nick: {:<32} JID: {}", nickname, identity),
            );
        }

        fn audit(&self, record: &AuditRecord) {
            self.push(Level::INFO, LogChannel::Audit, record.to_string());
        }

        fn message_dropped(&self, nickname: &Nickname, error: &ApplicationError) {
            self.push(
                Level::WARN,
                LogChannel::Operational,
                format!("dropped message from {nickname}: {error}"),
            );
        }

        fn event_ignored(&self, event: &RoomEvent, reason: IgnoreReason) {
            self.push(
                Level::DEBUG,
                LogChannel::Operational,
                format!("ignored event from {} ({reason})", event.nickname()),
            );
        }

        fn session_joined(&self, room: &RoomAddress, nickname: &Nickname) {
            self.push(
                Level::INFO,
                LogChannel::Operational,
                format!("joined {room} as {nickname}"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audit_channel_keeps_established_logger_name() {
        assert_eq!(AUDIT_TARGET, "xmppMessages");
    }

    #[test]
    fn ignore_reasons_render_readably() {
        assert_eq!(IgnoreReason::SelfEcho.to_string(), "self-echo");
        assert_eq!(IgnoreReason::OtherRoom.to_string(), "other room");
    }
}
