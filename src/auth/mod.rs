// src/auth/mod.rs

mod coordinator;
mod credential;
mod oauth;
mod server;
mod state;

pub use coordinator::{authorize, wait_for_credential};
pub use credential::{Credential, CredentialSlot};
pub use oauth::OAuthClient;
pub use server::AuthCallbackServer;
pub use state::{AuthSession, generate_state};

use crate::{client::HttpClient, config::AppConfig, config::token, error::*, symbols};
use log::{info, warn};

/// 凭据的来源。只有来自缓存的凭据才可能在使用时被服务端拒绝后重新授权。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Cache,
    Refreshed,
    Login,
}

/// 获取本次运行使用的凭据：
/// 有效的本地缓存直接使用；过期但带 refresh_token 的尝试刷新；否则进入浏览器授权。
/// 新获取的凭据会写回缓存，写入失败视为致命错误。
pub async fn resolve_credential(
    config: &AppConfig,
    http: &HttpClient,
    force_login: bool,
) -> AppResult<(Credential, CredentialSource)> {
    let cached = if force_login {
        info!("用户要求重新登录，忽略本地缓存的 Token");
        None
    } else {
        token::load_token_from_config(&config.config_path)
    };

    if let Some(credential) = cached {
        if !credential.is_expired() {
            info!("使用本地缓存的 Token");
            println!("{} 已从本地缓存加载 Token。", *symbols::INFO);
            return Ok((credential, CredentialSource::Cache));
        }
        if let Some(refresh_token) = credential.refresh_token.as_deref() {
            let settings = config.oauth_settings()?;
            // 刷新不经过回调，redirect_uri 留空
            let client = OAuthClient::new(settings, String::new(), http.clone());
            match client.refresh(refresh_token).await {
                Ok(refreshed) => {
                    token::save_token(&config.config_path, &refreshed)?;
                    return Ok((refreshed, CredentialSource::Refreshed));
                }
                Err(e) => warn!("刷新 Token 失败，将重新授权: {}", e),
            }
        } else {
            info!("本地 Token 已过期且不可刷新，将重新授权");
        }
    }

    Ok((login(config, http).await?, CredentialSource::Login))
}

/// 进行浏览器授权并将新凭据写回缓存。
pub async fn login(config: &AppConfig, http: &HttpClient) -> AppResult<Credential> {
    let credential = authorize(config, http.clone()).await?;
    token::save_token(&config.config_path, &credential)?;
    Ok(credential)
}
