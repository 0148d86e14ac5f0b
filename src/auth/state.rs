// src/auth/state.rs

use crate::{constants::oauth::STATE_BYTES, error::AppResult};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use rand::{RngCore, rngs::OsRng};

/// 一次浏览器授权尝试对应的防伪造状态，只能被回调消费一次。
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub state: String,
    pub issued_at: DateTime<Utc>,
}

impl AuthSession {
    pub fn new() -> AppResult<Self> {
        Ok(Self {
            state: generate_state()?,
            issued_at: Utc::now(),
        })
    }
}

/// 从操作系统随机源生成 URL 安全的 state。随机源失败时直接返回错误，不降级。
pub fn generate_state() -> AppResult<String> {
    let mut bytes = [0u8; STATE_BYTES];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}
