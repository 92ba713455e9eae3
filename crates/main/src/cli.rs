use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use config::BotConfig;

/// mucbot - 记录聊天室消息及发送者完整身份的审计机器人
#[derive(Parser, Debug)]
#[command(name = "mucbot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// 配置文件路径（TOML/YAML/JSON）
    #[arg(short, long, env = "MUCBOT_CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// 日志级别设为 ERROR
    #[arg(short, long, group = "verbosity")]
    pub quiet: bool,

    /// 日志级别设为 DEBUG
    #[arg(short, long, group = "verbosity")]
    pub debug: bool,

    /// 日志级别设为 TRACE（包含协议通信）
    #[arg(short, long, group = "verbosity")]
    pub verbose: bool,

    /// 使用的 JID
    #[arg(short, long)]
    pub jid: Option<String>,

    /// 密码
    #[arg(short, long)]
    pub password: Option<String>,

    /// 要加入的聊天室
    #[arg(short, long)]
    pub room: Option<String>,

    /// 聊天室昵称
    #[arg(short, long)]
    pub nick: Option<String>,

    /// 网关 WebSocket 地址
    #[arg(short, long)]
    pub gateway: Option<String>,

    /// 启用 IPv6
    #[arg(short, long)]
    pub ipv6: bool,

    /// 启用 TLS 1.2
    #[arg(short, long)]
    pub tls12: bool,
}

impl Cli {
    /// 命令行指定的日志级别
    pub fn log_level(&self) -> Option<&'static str> {
        if self.quiet {
            Some("error")
        } else if self.debug {
            Some("debug")
        } else if self.verbose {
            Some("trace")
        } else {
            None
        }
    }

    /// 用命令行参数覆盖配置
    pub fn apply(&self, config: &mut BotConfig) {
        if let Some(jid) = &self.jid {
            config.account.jid = jid.clone();
        }
        if let Some(password) = &self.password {
            config.account.password = password.clone();
        }
        if let Some(room) = &self.room {
            config.room.address = room.clone();
        }
        if let Some(nick) = &self.nick {
            config.room.nickname = nick.clone();
        }
        if let Some(url) = &self.gateway {
            config.gateway.url = url.clone();
        }
        if self.ipv6 {
            config.gateway.ipv6 = true;
        }
        if self.tls12 {
            config.gateway.tls12 = true;
        }
        if let Some(level) = self.log_level() {
            config.logging.level = level.to_string();
        }
    }
}

/// 交互式补齐缺失的凭据与房间信息
pub fn prompt_missing(config: &mut BotConfig) -> anyhow::Result<()> {
    if config.account.jid.is_empty() {
        config.account.jid = prompt_text("Username")?;
    }
    if config.account.password.is_empty() {
        config.account.password = dialoguer::Password::new()
            .with_prompt("Password")
            .interact()
            .context("failed to read password")?;
    }
    if config.room.address.is_empty() {
        config.room.address = prompt_text("MUC room")?;
    }
    if config.room.nickname.is_empty() {
        config.room.nickname = prompt_text("MUC nickname")?;
    }
    Ok(())
}

fn prompt_text(prompt: &str) -> anyhow::Result<String> {
    dialoguer::Input::<String>::new()
        .with_prompt(prompt)
        .interact_text()
        .with_context(|| format!("failed to read {prompt}"))
}
