// src/client.rs

use crate::{config::AppConfig, error::*};
use anyhow::Context;
use reqwest::{IntoUrl, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// 进程内共享的 HTTP 客户端。API 请求带整体超时，文件下载只限制连接超时。
#[derive(Clone)]
pub struct HttpClient {
    pub client: reqwest::Client,
    pub(crate) api_timeout: Duration,
}

impl HttpClient {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.max_workers)
            .build()
            .context("创建 HTTP 客户端失败")?;

        Ok(Self {
            client,
            api_timeout: config.timeout,
        })
    }

    /// 构造带超时的 API 请求
    pub fn api_get<T: IntoUrl>(&self, url: T) -> RequestBuilder {
        self.client.get(url).timeout(self.api_timeout)
    }

    pub fn api_post<T: IntoUrl>(&self, url: T) -> RequestBuilder {
        self.client.post(url).timeout(self.api_timeout)
    }

    /// 用于下载文件的无认证 GET 请求
    pub async fn get<T: IntoUrl>(&self, url: T) -> AppResult<Response> {
        let res = self.client.get(url).send().await?;
        Ok(res.error_for_status()?)
    }
}

/// 检查 API 响应状态，将认证失败与其他错误区分开，并尽量取出服务端给出的错误信息。
pub async fn check_api_response(res: Response) -> AppResult<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(AppError::TokenInvalid);
    }
    let body = res.text().await.unwrap_or_default();
    Err(AppError::Api {
        status: status.as_u16(),
        message: extract_error_message(&body),
    })
}

/// Google API 的错误格式为 `{"error": {"message": ...}}`，OAuth 端点为
/// `{"error": "...", "error_description": "..."}`。
pub fn extract_error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };
    if let Some(msg) = value.pointer("/error/message").and_then(Value::as_str) {
        return msg.to_string();
    }
    match (
        value.get("error").and_then(Value::as_str),
        value.get("error_description").and_then(Value::as_str),
    ) {
        (Some(err), Some(desc)) => format!("{}: {}", err, desc),
        (Some(err), None) => err.to_string(),
        _ => body.trim().to_string(),
    }
}
