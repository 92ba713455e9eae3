use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// 房间内昵称。
///
/// 只在某一时刻的房间成员中唯一，重新加入或改名后不再稳定。
/// 区分大小写，不做裁剪。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Nickname(String);

impl Nickname {
    pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.is_empty() {
            return Err(DomainError::invalid_argument("nickname", "cannot be empty"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Nickname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// 参与者的稳定身份（bare JID）。
///
/// 不校验格式，只要求非空。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StableIdentity(String);

impl StableIdentity {
    pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.is_empty() {
            return Err(DomainError::invalid_argument(
                "stable_identity",
                "cannot be empty",
            ));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StableIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 完整 JID（`local@domain/resource`）。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Jid {
    bare: String,
    resource: Option<String>,
}

impl Jid {
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let value = value.trim();
        // 资源部分可以包含 '/'，只在第一个 '/' 处切分
        let (bare, resource) = match value.split_once('/') {
            Some((bare, resource)) => (bare, Some(resource)),
            None => (value, None),
        };
        if bare.is_empty() {
            return Err(DomainError::invalid_argument("jid", "bare part cannot be empty"));
        }
        Ok(Self {
            bare: bare.to_owned(),
            resource: resource.filter(|r| !r.is_empty()).map(str::to_owned),
        })
    }

    /// 去掉资源部分后的账号身份
    pub fn bare(&self) -> StableIdentity {
        StableIdentity(self.bare.clone())
    }

    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }
}

impl fmt::Display for Jid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.resource {
            Some(resource) => write!(f, "{}/{}", self.bare, resource),
            None => f.write_str(&self.bare),
        }
    }
}

/// 聊天室地址（房间的 bare JID），统一为小写。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomAddress(String);

impl RoomAddress {
    pub fn parse(value: impl AsRef<str>) -> Result<Self, DomainError> {
        let value = value.as_ref().trim();
        if value.is_empty() {
            return Err(DomainError::invalid_argument("room", "cannot be empty"));
        }
        if value.contains('/') {
            return Err(DomainError::invalid_argument(
                "room",
                "must be a bare address without resource",
            ));
        }
        Ok(Self(value.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
