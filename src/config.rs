// src/config.rs

pub mod token;

use self::token::{get_config_path, load_or_default};
use crate::{auth::Credential, cli::Cli, constants, error::AppResult};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NetworkConfig {
    pub connect_timeout_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
}

/// 可在配置文件中覆盖的远程端点，主要用于测试或代理环境
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EndpointConfig {
    pub auth_url: Option<String>,
    pub token_url: Option<String>,
    pub api_base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExternalConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<Credential>,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub endpoints: EndpointConfig,
}

impl ExternalConfig {
    pub(crate) fn default_app_config() -> Self {
        Self {
            token: None,
            network: NetworkConfig {
                connect_timeout_secs: Some(10),
                timeout_secs: Some(60),
            },
            endpoints: EndpointConfig::default(),
        }
    }
}

/// 授权流程所需的 OAuth 客户端参数
#[derive(Debug, Clone)]
pub struct OAuthSettings {
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub config_path: PathBuf,
    pub max_workers: usize,
    pub callback_port: u16,
    /// `None` 表示不设截止时间
    pub auth_timeout: Option<Duration>,
    pub poll_interval: Duration,
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub auth_url: String,
    pub token_url: String,
    pub api_base_url: String,
    pub scopes: Vec<String>,
}

impl AppConfig {
    pub fn new(args: &Cli) -> AppResult<Self> {
        let config_path = match &args.config {
            Some(path) => path.clone(),
            None => get_config_path()?,
        };
        let external_config = load_or_default(&config_path)?;

        Ok(Self {
            config_path,
            max_workers: args.workers.unwrap_or(constants::DEFAULT_MAX_WORKERS).max(1),
            callback_port: args.port,
            auth_timeout: (args.auth_timeout > 0).then(|| Duration::from_secs(args.auth_timeout)),
            poll_interval: constants::POLL_INTERVAL,
            user_agent: constants::USER_AGENT.into(),
            connect_timeout: Duration::from_secs(
                external_config.network.connect_timeout_secs.unwrap_or(10),
            ),
            timeout: Duration::from_secs(external_config.network.timeout_secs.unwrap_or(60)),
            client_id: non_empty(args.client_id.as_deref()),
            client_secret: non_empty(args.client_secret.as_deref()),
            auth_url: external_config
                .endpoints
                .auth_url
                .unwrap_or_else(|| constants::oauth::AUTH_URL.into()),
            token_url: external_config
                .endpoints
                .token_url
                .unwrap_or_else(|| constants::oauth::TOKEN_URL.into()),
            api_base_url: external_config
                .endpoints
                .api_base_url
                .unwrap_or_else(|| constants::photos::API_BASE_URL.into()),
            scopes: vec![constants::oauth::PHOTOS_SCOPE.into()],
        })
    }

    /// 仅在确实需要授权 (登录或刷新) 时才要求客户端凭据。
    pub fn oauth_settings(&self) -> AppResult<OAuthSettings> {
        match (&self.client_id, &self.client_secret) {
            (Some(id), Some(secret)) => Ok(OAuthSettings {
                client_id: id.clone(),
                client_secret: secret.clone(),
                auth_url: self.auth_url.clone(),
                token_url: self.token_url.clone(),
                scopes: self.scopes.clone(),
            }),
            _ => Err(crate::error::AppError::MissingClientCredentials),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(feature = "testing")]
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_path: std::env::temp_dir().join("photos-dl-test-config.json"),
            max_workers: 4,
            callback_port: 0,
            auth_timeout: Some(Duration::from_secs(5)),
            poll_interval: Duration::from_millis(50),
            user_agent: "test-agent/1.0".to_string(),
            connect_timeout: Duration::from_secs(5),
            timeout: Duration::from_secs(15),
            client_id: Some("test-client-id".to_string()),
            client_secret: Some("test-client-secret".to_string()),
            auth_url: "https://auth.example.test/o/oauth2/auth".to_string(),
            token_url: "https://auth.example.test/token".to_string(),
            api_base_url: "https://photos.example.test".to_string(),
            scopes: vec![constants::oauth::PHOTOS_SCOPE.to_string()],
        }
    }
}
