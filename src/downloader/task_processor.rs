// src/downloader/task_processor.rs

use crate::{client::HttpClient, error::*, models::*, utils};
use futures::StreamExt;
use log::{debug, error, info};
use std::{io::Write as IoWrite, path::PathBuf};
use tempfile::NamedTempFile;

/// `TaskProcessor` 封装了下载单个媒体条目的全部逻辑。
#[derive(Clone)]
pub struct TaskProcessor {
    http: HttpClient,
    output_dir: PathBuf,
}

impl TaskProcessor {
    pub fn new(http: HttpClient, output_dir: PathBuf) -> Self {
        Self { http, output_dir }
    }

    /// 下载一个条目：先写入输出目录中的临时文件，完整接收后再替换目标文件。
    /// 同名条目并发下载时，目标文件始终是某一个条目的完整内容。
    /// 任一步骤失败只结束本任务，临时文件随之删除，错误体现在返回的 `DownloadResult` 中。
    pub async fn process(&self, item: MediaItem) -> DownloadResult {
        let filename = utils::sanitize_filename(&item.filename);
        let filepath = self.output_dir.join(&filename);
        let mut stage = TaskState::Pending;

        let attempt_result: AppResult<u64> = async {
            debug!("开始下载 '{}' (id: {})", filename, item.id);
            let mut file = NamedTempFile::new_in(&self.output_dir)?;

            stage = TaskState::Fetching;
            let res = self.http.get(item.download_url()).await?;

            stage = TaskState::Writing;
            let mut written = 0u64;
            let mut stream = res.bytes_stream();
            while let Some(chunk_result) = stream.next().await {
                let chunk = chunk_result?;
                file.write_all(&chunk)?;
                written += chunk.len() as u64;
            }
            file.flush()?;
            file.persist(&filepath).map_err(|e| e.error)?;
            Ok(written)
        }
        .await;

        match attempt_result {
            Ok(bytes) => {
                info!("文件 '{}' 下载完成 ({} 字节)", filename, bytes);
                debug!("任务 '{}': {:?} -> {:?}", filename, stage, TaskState::Done);
                DownloadResult {
                    filename,
                    status: DownloadStatus::Success,
                    message: None,
                }
            }
            Err(e) => {
                error!(
                    "文件 '{}' 在 {:?} 阶段失败: {}",
                    filepath.display(),
                    stage,
                    e
                );
                debug!("任务 '{}': {:?} -> {:?}", filename, stage, TaskState::Failed);
                DownloadResult {
                    filename,
                    status: DownloadStatus::from(&e),
                    message: Some(e.to_string()),
                }
            }
        }
    }
}
