// src/downloader/task_runner.rs

use super::task_processor::TaskProcessor;
use crate::{models::*, ui};
use futures::{StreamExt, stream};
use indicatif::ProgressBar;
use log::error;
use std::cmp::min;

/// 负责执行一批下载任务，限制并发数并报告进度。所有任务结束后才返回。
pub async fn execute_tasks(processor: &TaskProcessor, tasks: Vec<MediaItem>, max_workers: usize) {
    let max_workers = min(max_workers, tasks.len());
    if max_workers == 0 {
        return;
    }

    ui::plain("");
    ui::info(&format!(
        "开始下载 {} 个文件 (并发数: {})...",
        tasks.len(),
        max_workers
    ));
    let main_pbar = ui::new_tasks_progress_bar(tasks.len() as u64, "下载");

    stream::iter(tasks)
        .for_each_concurrent(max_workers, |task| {
            run_single_concurrent_task(task, processor.clone(), main_pbar.clone())
        })
        .await;

    main_pbar.finish_and_clear();
}

/// 在并发池中运行的单个任务单元。每个条目在独立的运行时任务中执行，
/// 即使发生 panic 也不会影响其他条目。
async fn run_single_concurrent_task(task: MediaItem, processor: TaskProcessor, main_pbar: ProgressBar) {
    let task_name = task.filename.clone();
    let result = tokio::spawn(async move { processor.process(task).await }).await;

    match result {
        Ok(result) => {
            let (symbol, color_fn, default_msg) = result.status.get_display_info();
            main_pbar.suspend(|| match result.message {
                Some(err_msg) => eprintln!(
                    "{} {} {}",
                    symbol,
                    result.filename,
                    color_fn(format!("失败: {} (详情: {})", default_msg, err_msg).into())
                ),
                None => println!("{} {}", symbol, result.filename),
            });
        }
        Err(e) => {
            error!("下载任务 '{}' 异常终止: {}", task_name, e);
        }
    }
    main_pbar.inc(1);
}
