// src/lib.rs

pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod constants;
pub mod downloader;
pub mod error;
pub mod logger;
pub mod models;
pub mod photos;
pub mod symbols;
pub mod ui;
pub mod utils;

use crate::{
    cli::Cli,
    client::HttpClient,
    config::AppConfig,
    downloader::DownloadOrchestrator,
    error::{AppError, AppResult},
    photos::{AlbumFetcher, GooglePhotosClient},
};
use anyhow::Context;
use colored::*;
use log::{debug, info, warn};
use std::sync::Arc;

/// 库的公共入口点，由 `main.rs` 调用
pub async fn run_from_cli(args: Arc<Cli>) -> AppResult<()> {
    debug!("CLI 参数: album_id={}, output={:?}", args.album_id, args.output);

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("无法创建输出目录 '{}'", args.output.display()))?;
    let output_dir = dunce::canonicalize(&args.output)
        .with_context(|| format!("无法解析输出目录 '{}'", args.output.display()))?;
    ui::info(&format!("文件将保存到: {}", output_dir.display()));

    let config = AppConfig::new(&args)?;
    debug!(
        "配置文件: {}, 并发数: {}, 回调端口: {}",
        config.config_path.display(),
        config.max_workers,
        config.callback_port
    );
    let http = HttpClient::new(&config)?;

    let (credential, source) = auth::resolve_credential(&config, &http, args.force_login).await?;

    let mut fetcher = GooglePhotosClient::new(http.clone(), credential, &config.api_base_url);
    let album = match fetcher.fetch_album(&args.album_id).await {
        // 缓存的凭据可能已被撤销，重新授权一次
        Err(AppError::TokenInvalid) if source != auth::CredentialSource::Login => {
            warn!("缓存的 Token 被服务端拒绝，重新进行浏览器授权");
            ui::warn("本地缓存的 Token 已失效，需要重新登录。");
            let credential = auth::login(&config, &http).await?;
            fetcher = GooglePhotosClient::new(http.clone(), credential, &config.api_base_url);
            fetcher.fetch_album(&args.album_id).await?
        }
        result => result?,
    };
    ui::print_header(&format!("相册: {}", album.title));
    let items = fetcher.list_media_items(&album).await?;
    info!("相册 '{}' 共有 {} 个条目", album.id, items.len());

    if items.is_empty() {
        ui::warn("相册中没有任何条目。");
        return Ok(());
    }

    DownloadOrchestrator::new(http, config.max_workers)
        .download_all(&items, &output_dir)
        .await;

    println!("\n{} {}", *symbols::OK, "下载流程结束。".green());
    Ok(())
}
