// src/downloader/mod.rs

mod task_processor;
mod task_runner;

pub use task_processor::TaskProcessor;

use crate::{client::HttpClient, models::MediaItem};
use log::{debug, info};
use std::path::Path;

/// 将相册条目中的图片并发下载到本地目录。
///
/// 非图片条目直接跳过；每个图片条目的失败互不影响，只记录日志，不向调用方返回。
pub struct DownloadOrchestrator {
    http: HttpClient,
    max_workers: usize,
}

impl DownloadOrchestrator {
    pub fn new(http: HttpClient, max_workers: usize) -> Self {
        Self {
            http,
            max_workers: max_workers.max(1),
        }
    }

    /// 阻塞直到所有已启动的下载任务结束 (成功或失败)。`output_dir` 须已存在。
    pub async fn download_all(&self, items: &[MediaItem], output_dir: &Path) {
        let images: Vec<MediaItem> = items
            .iter()
            .filter(|item| {
                if item.is_image() {
                    true
                } else {
                    debug!("跳过非图片条目 '{}' (类型: {})", item.filename, item.mime_type);
                    false
                }
            })
            .cloned()
            .collect();

        info!(
            "共 {} 个条目，其中 {} 个图片待下载，保存到 '{}'",
            items.len(),
            images.len(),
            output_dir.display()
        );

        let processor = TaskProcessor::new(self.http.clone(), output_dir.to_path_buf());
        task_runner::execute_tasks(&processor, images, self.max_workers).await;
        info!("所有下载任务已结束");
    }
}
