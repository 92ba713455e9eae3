//! 统一配置中心
//!
//! 提供机器人的全局配置管理，包括：
//! - 账号凭据
//! - 目标房间与昵称
//! - 网关连接
//! - 日志输出
//!
//! 加载顺序：默认值 -> 可选配置文件 -> `MUCBOT_` 前缀环境变量。

use std::env;
use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// 环境变量前缀
pub const ENV_PREFIX: &str = "MUCBOT_";

/// 指定配置文件路径的环境变量
pub const CONFIG_FILE_ENV: &str = "MUCBOT_CONFIG_FILE";

const REDACTED: &str = "[REDACTED]";

/// 全局机器人配置
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct BotConfig {
    /// 账号配置
    #[validate(nested)]
    pub account: AccountConfig,
    /// 房间配置
    #[validate(nested)]
    pub room: RoomConfig,
    /// 网关配置
    #[serde(default)]
    #[validate(nested)]
    pub gateway: GatewayConfig,
    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 账号配置
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct AccountConfig {
    #[validate(contains(pattern = "@", message = "jid must look like user@domain"))]
    pub jid: String,
    #[validate(length(min = 1, message = "password cannot be empty"))]
    pub password: String,
}

/// 房间配置
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RoomConfig {
    /// 房间地址，例如 `lobby@conference.example.org`
    #[validate(contains(pattern = "@", message = "room must look like room@service"))]
    pub address: String,
    #[validate(length(min = 1, message = "nickname cannot be empty"))]
    pub nickname: String,
    /// 房间密码（可选）
    #[serde(default)]
    pub password: Option<String>,
}

/// 网关配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GatewayConfig {
    #[validate(url)]
    pub url: String,
    /// 连接尝试次数
    #[validate(range(min = 1, max = 20))]
    pub connect_attempts: u32,
    /// 重试退避基数（毫秒）
    pub retry_base_ms: u64,
    /// 等待加入房间确认的超时时间（秒）
    #[validate(range(min = 1))]
    pub join_timeout_secs: u64,
    /// 网关连接 XMPP 服务器时优先使用 IPv6
    #[serde(default)]
    pub ipv6: bool,
    /// 网关与 XMPP 服务器之间强制使用 TLS 1.2
    #[serde(default)]
    pub tls12: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:5280/mucbot".to_string(),
            connect_attempts: 3,
            retry_base_ms: 500,
            join_timeout_secs: 30,
            ipv6: false,
            tls12: false,
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 控制台日志级别，`RUST_LOG` 优先
    pub level: String,
    /// 审计记录额外追加写入的文件
    #[serde(default)]
    pub audit_file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            audit_file: None,
        }
    }
}

impl BotConfig {
    /// 构建分层配置源
    ///
    /// 未显式给出文件时读取 `MUCBOT_CONFIG_FILE`。
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut fig = Figment::from(Serialized::defaults(BotConfig::default()));

        let path = file
            .map(Path::to_path_buf)
            .or_else(|| env::var_os(CONFIG_FILE_ENV).map(PathBuf::from));
        if let Some(path) = path {
            fig = match path.extension().and_then(|ext| ext.to_str()) {
                Some("yml") | Some("yaml") => fig.merge(Yaml::file(path)),
                Some("json") => fig.merge(Json::file(path)),
                _ => fig.merge(Toml::file(path)),
            };
        }

        fig.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// 加载配置，不做校验
    ///
    /// 凭据可能要在交互式输入后才补齐，所以校验由调用方在之后执行。
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        Ok(Self::figment(file).extract()?)
    }

    /// 从 TOML/YAML/JSON 字符串解析，按简单规则识别格式
    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: BotConfig = if s.trim_start().starts_with('{') {
            serde_json::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?
        } else if s.contains('[') || s.contains('=') {
            toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?
        } else {
            serde_yaml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?
        };
        cfg.check()?;
        Ok(cfg)
    }

    /// 验证配置有效性
    pub fn check(&self) -> Result<(), ConfigError> {
        self.validate()?;
        if self.room.nickname.trim().is_empty() {
            return Err(ConfigError::InvalidRoom(
                "nickname cannot be blank".to_string(),
            ));
        }
        if self.room.address.contains('/') {
            return Err(ConfigError::InvalidRoom(
                "room address must not carry a resource".to_string(),
            ));
        }
        Ok(())
    }

    /// 用于日志输出的脱敏表示
    pub fn sanitize(&self) -> String {
        let mut redacted = self.clone();
        if !redacted.account.password.is_empty() {
            redacted.account.password = REDACTED.to_string();
        }
        if redacted.room.password.is_some() {
            redacted.room.password = Some(REDACTED.to_string());
        }
        format!("{:?}", redacted)
    }
}

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration source error: {0}")]
    Source(#[from] figment::Error),
    #[error("invalid configuration: {0}")]
    Validation(#[from] validator::ValidationErrors),
    #[error("invalid room configuration: {0}")]
    InvalidRoom(String),
    #[error("failed to parse configuration: {0}")]
    Parse(String),
}
