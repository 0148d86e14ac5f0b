// src/auth/oauth.rs

use super::credential::Credential;
use crate::{
    client::{HttpClient, extract_error_message},
    config::OAuthSettings,
    error::*,
};
use chrono::{Duration, Utc};
use log::{debug, info};
use serde::Deserialize;
use url::Url;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// 授权码模式的 OAuth 客户端：构造授权地址、用授权码换取凭据、刷新凭据。
#[derive(Clone)]
pub struct OAuthClient {
    settings: OAuthSettings,
    redirect_uri: String,
    http: HttpClient,
}

impl OAuthClient {
    pub fn new(settings: OAuthSettings, redirect_uri: String, http: HttpClient) -> Self {
        Self {
            settings,
            redirect_uri,
            http,
        }
    }

    pub fn authorization_url(&self, state: &str) -> AppResult<String> {
        let mut url = Url::parse(&self.settings.auth_url)?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.settings.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.settings.scopes.join(" "))
            // 请求 refresh_token，以便下次运行时无需重新登录
            .append_pair("access_type", "offline")
            .append_pair("state", state);
        Ok(url.into())
    }

    pub async fn exchange_code(&self, code: &str) -> AppResult<Credential> {
        debug!("使用授权码换取 Token: {}", self.settings.token_url);
        let params = [
            ("client_id", self.settings.client_id.as_str()),
            ("client_secret", self.settings.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.redirect_uri.as_str()),
        ];
        let response = self.request_token(&params).await?;
        info!("授权码换取 Token 成功");
        Ok(into_credential(response, None))
    }

    /// 刷新过期的凭据。服务端未返回新的 refresh_token 时沿用旧值。
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<Credential> {
        debug!("刷新 Token: {}", self.settings.token_url);
        let params = [
            ("client_id", self.settings.client_id.as_str()),
            ("client_secret", self.settings.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];
        let response = self.request_token(&params).await?;
        info!("Token 刷新成功");
        Ok(into_credential(response, Some(refresh_token)))
    }

    async fn request_token(&self, params: &[(&str, &str)]) -> AppResult<TokenResponse> {
        let res = self
            .http
            .api_post(&self.settings.token_url)
            .form(params)
            .send()
            .await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::OAuth(format!(
                "Token 端点返回 HTTP {}: {}",
                status.as_u16(),
                extract_error_message(&body)
            )));
        }
        Ok(res.json().await?)
    }
}

fn into_credential(response: TokenResponse, previous_refresh: Option<&str>) -> Credential {
    Credential {
        access_token: response.access_token,
        token_type: response.token_type.unwrap_or_else(|| "Bearer".to_string()),
        refresh_token: response
            .refresh_token
            .or_else(|| previous_refresh.map(str::to_string)),
        expiry: response
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(secs)),
    }
}
