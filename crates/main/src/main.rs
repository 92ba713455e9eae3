//! 主应用程序入口
//!
//! 连接 XMPP 网关，加入配置的聊天室，并以发送者的完整身份记录每条消息。

mod cli;
mod logging;

use std::sync::Arc;

use anyhow::Context;
use application::{MucBot, RoomSettings, TracingLogSink};
use clap::Parser;
use config::BotConfig;
use infrastructure::{GatewayClient, GatewayError, GatewaySettings};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 加载配置：默认值 -> 配置文件 -> 环境变量 -> 命令行
    let mut config = BotConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    cli.apply(&mut config);
    cli::prompt_missing(&mut config)?;
    config.check().context("invalid configuration")?;

    // 初始化日志
    logging::init(&config.logging.level, config.logging.audit_file.as_deref())?;
    tracing::debug!(config = %config.sanitize(), "配置加载完成");

    let settings = RoomSettings::from_config(&config)?;
    tracing::debug!(
        jid = %config.account.jid,
        room = %settings.room,
        nickname = %settings.nickname,
        "启动聊天室审计机器人"
    );

    let bot = Arc::new(MucBot::new(settings, Arc::new(TracingLogSink)));
    let client = GatewayClient::new(GatewaySettings::from_config(&config));

    tokio::select! {
        result = client.run(bot) => match result {
            Ok(()) => tracing::info!("Done"),
            Err(err @ GatewayError::Transport { .. }) => {
                tracing::error!(error = %err, "Unable to connect.");
                return Err(err.into());
            }
            Err(err) => {
                tracing::error!(error = %err, "会话异常结束");
                return Err(err.into());
            }
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("收到中断信号，退出");
        }
    }

    Ok(())
}
