// src/auth/credential.rs

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// 访问 Photos API 使用的 OAuth 凭据
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credential {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl Credential {
    /// 没有过期时间的凭据视为长期有效；临近过期 (1 分钟内) 也按过期处理。
    pub fn is_expired(&self) -> bool {
        self.expiry
            .is_some_and(|expiry| expiry <= Utc::now() + Duration::minutes(1))
    }

    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

// 不在日志中输出 token 明文
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token_type", &self.token_type)
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("expiry", &self.expiry)
            .finish()
    }
}

/// 只允许写入一次的凭据槽，回调处理器写入，授权协调器轮询读取。
#[derive(Debug, Default)]
pub struct CredentialSlot {
    inner: OnceLock<Credential>,
}

impl CredentialSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_credential(&self) -> bool {
        self.inner.get().is_some()
    }

    /// 尚未写入时返回 `None`
    pub fn credential(&self) -> Option<Credential> {
        self.inner.get().cloned()
    }

    /// 写入凭据。槽已被占用时返回 `false`，原有值保持不变。
    pub fn set(&self, credential: Credential) -> bool {
        self.inner.set(credential).is_ok()
    }
}
