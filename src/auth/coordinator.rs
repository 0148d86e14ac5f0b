// src/auth/coordinator.rs

use super::{credential::Credential, server::AuthCallbackServer};
use crate::{client::HttpClient, config::AppConfig, error::*, symbols, ui};
use colored::Colorize;
use log::{debug, info, warn};
use std::time::Duration;
use tokio::time::Instant;

/// 完成一次完整的浏览器授权：启动回调服务，提示用户访问，轮询直到拿到凭据后关闭服务。
pub async fn authorize(config: &AppConfig, http: HttpClient) -> AppResult<Credential> {
    let settings = config.oauth_settings()?;
    let mut server = AuthCallbackServer::start(config.callback_port, settings, http).await?;

    let root_url = server.root_url();
    let hint = format!("完成后程序会自动继续 (按 {} 中止)。", *symbols::CTRL_C);
    ui::box_message(
        "需要登录 Google 账号",
        &[
            "请在浏览器中打开以下地址并完成授权:",
            root_url.as_str(),
            "",
            hint.as_str(),
        ],
        |s| s.cyan(),
    );
    info!("等待用户在浏览器中完成授权: {}", root_url);

    let result = wait_for_credential(&server, config.poll_interval, config.auth_timeout).await;
    server.stop().await;

    let credential = result?;
    println!("{} 授权成功。", *symbols::OK);
    Ok(credential)
}

/// 以固定间隔轮询凭据槽。`deadline` 为 `None` 时一直等待。
pub async fn wait_for_credential(
    server: &AuthCallbackServer,
    poll_interval: Duration,
    deadline: Option<Duration>,
) -> AppResult<Credential> {
    let started = Instant::now();
    loop {
        if server.has_credential()
            && let Some(credential) = server.credential()
        {
            debug!("授权完成，用时 {:?}", started.elapsed());
            return Ok(credential);
        }
        if let Some(limit) = deadline
            && started.elapsed() >= limit
        {
            warn!("等待授权超时 ({:?})", limit);
            return Err(AppError::AuthTimeout(limit));
        }
        tokio::time::sleep(poll_interval).await;
    }
}
