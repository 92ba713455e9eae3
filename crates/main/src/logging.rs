use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use application::AUDIT_TARGET;
use tracing::Level;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// 初始化日志
///
/// 控制台级别取自 `RUST_LOG`，未设置时使用 `level`。
/// 指定审计文件时，审计通道的记录无论控制台级别如何都会追加写入该文件。
pub fn init(level: &str, audit_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let console = fmt::layer().with_filter(filter);

    let audit = match audit_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open audit file {}", path.display()))?;
            let layer = fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false)
                .with_level(false)
                .with_filter(Targets::new().with_target(AUDIT_TARGET, Level::INFO));
            Some(layer)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(audit)
        .try_init()
        .context("failed to install tracing subscriber")?;
    Ok(())
}
