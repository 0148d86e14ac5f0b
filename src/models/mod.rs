// src/models/mod.rs

pub mod api;

use crate::constants::photos::{IMAGE_MIME_PREFIX, ORIGINAL_QUALITY_SUFFIX};
use crate::error::AppError;
use crate::symbols;
use colored::{ColoredString, Colorize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Album {
    pub id: String,
    pub title: String,
    pub media_items_count: Option<u64>,
}

impl From<api::AlbumResponse> for Album {
    fn from(res: api::AlbumResponse) -> Self {
        Self {
            title: res.title.unwrap_or_else(|| res.id.clone()),
            media_items_count: res.media_items_count.and_then(|c| c.parse().ok()),
            id: res.id,
        }
    }
}

/// 相册中的一个媒体条目，由相册接口提供，下载过程只读。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub id: String,
    /// 显示名，同时作为本地文件名
    pub filename: String,
    pub mime_type: String,
    pub base_url: String,
}

impl MediaItem {
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with(IMAGE_MIME_PREFIX)
    }

    /// 原始画质文件的下载地址
    pub fn download_url(&self) -> String {
        format!("{}{}", self.base_url, ORIGINAL_QUALITY_SUFFIX)
    }
}

impl From<api::MediaItemResponse> for MediaItem {
    fn from(res: api::MediaItemResponse) -> Self {
        Self {
            id: res.id,
            filename: res.filename,
            mime_type: res.mime_type,
            base_url: res.base_url,
        }
    }
}

/// 单个下载任务所处的阶段
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TaskState {
    Pending,
    Fetching,
    Writing,
    Done,
    Failed,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DownloadStatus {
    Success,
    HttpError,
    NetworkError,
    ConnectionError,
    TimeoutError,
    IoError,
    UnexpectedError,
}

impl DownloadStatus {
    pub fn get_display_info(
        &self,
    ) -> (
        &'static ColoredString,
        fn(ColoredString) -> ColoredString,
        &'static str,
    ) {
        match self {
            DownloadStatus::Success => (&symbols::OK, |s| s.green(), "下载成功"),
            DownloadStatus::HttpError => (&symbols::ERROR, |s| s.red(), "服务器返回错误"),
            DownloadStatus::NetworkError => (&symbols::ERROR, |s| s.red(), "网络请求失败"),
            DownloadStatus::ConnectionError => (&symbols::ERROR, |s| s.red(), "无法建立连接"),
            DownloadStatus::TimeoutError => (&symbols::WARN, |s| s.yellow(), "网络连接超时"),
            DownloadStatus::IoError => (&symbols::ERROR, |s| s.red(), "本地文件读写错误"),
            DownloadStatus::UnexpectedError => {
                (&symbols::ERROR, |s| s.red(), "发生未预期的程序错误")
            }
        }
    }
}

impl From<&AppError> for DownloadStatus {
    fn from(error: &AppError) -> Self {
        match error {
            AppError::Network(err) => {
                if err.is_timeout() {
                    DownloadStatus::TimeoutError
                } else if err.is_connect() {
                    DownloadStatus::ConnectionError
                } else if err.is_status() {
                    DownloadStatus::HttpError
                } else {
                    DownloadStatus::NetworkError
                }
            }
            AppError::Io(_) => DownloadStatus::IoError,
            _ => DownloadStatus::UnexpectedError,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DownloadResult {
    pub filename: String,
    pub status: DownloadStatus,
    pub message: Option<String>,
}
