// src/error.rs

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("认证失败 (Token 无效或已过期)，可使用 --force-login 重新登录")]
    TokenInvalid,
    #[error("缺少 OAuth 客户端凭据，请通过 --client-id/--client-secret 或环境变量 CLIENT_ID/CLIENT_SECRET 提供")]
    MissingClientCredentials,
    #[error("系统随机数源不可用: {0}")]
    RandomSource(#[from] rand::Error),
    #[error("OAuth 授权失败: {0}")]
    OAuth(String),
    #[error("等待浏览器授权超时 ({}秒)", .0.as_secs())]
    AuthTimeout(Duration),
    #[error("无法解析配置文件 '{path}': {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("API 请求失败 (HTTP {status}): {message}")]
    Api { status: u16, message: String },
    #[error("网络请求失败: {0}")]
    Network(#[from] reqwest::Error),
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON 解析错误: {0}")]
    Json(#[from] serde_json::Error),
    #[error("URL 解析错误: {0}")]
    Url(#[from] url::ParseError),
    #[error("未知错误: {0}")]
    Other(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_invalid_hints_force_login() {
        assert!(AppError::TokenInvalid.to_string().contains("--force-login"));
    }
}
