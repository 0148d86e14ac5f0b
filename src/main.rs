// src/main.rs

use clap::{CommandFactory, FromArgMatches};
use colored::*;
use photos_dl::{cli::Cli, logger, run_from_cli, symbols};
use std::{env, sync::Arc, time::Duration};

#[tokio::main]
async fn main() {
    // 为 Windows 终端启用 ANSI 颜色支持。
    #[cfg(windows)]
    {
        colored::control::set_virtual_terminal(true).ok();
    }
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("\n{} 用户强制中断程序。", *symbols::CTRL_C);
            tokio::time::sleep(Duration::from_millis(100)).await;
            std::process::exit(130);
        }
    });

    let bin_name = env::var("CARGO_BIN_NAME").unwrap_or_else(|_| "photos-dl".to_string());

    let after_help = format!(
        "示例:\n  # 下载相册中的全部图片到 ./photos\n  {bin} AF1QipXXXX -o ./photos\n\n  # 指定客户端凭据与并发数\n  {bin} AF1QipXXXX -o ./photos --client-id <ID> --client-secret <SECRET> -w 16\n\n  # 忽略缓存的 Token，重新登录\n  {bin} AF1QipXXXX -o ./photos --force-login",
        bin = bin_name
    );

    let cmd = Cli::command().after_help(after_help);
    let args = match Cli::from_arg_matches(&cmd.get_matches()) {
        Ok(args) => Arc::new(args),
        Err(e) => e.exit(),
    };

    logger::init_logger(args.log_level);

    if let Err(e) = run_from_cli(args).await {
        log::error!("程序执行出错: {}", e);
        eprintln!("\n{} {}", *symbols::ERROR, format!("程序执行出错: {}", e).red());
        std::process::exit(1);
    }
}
