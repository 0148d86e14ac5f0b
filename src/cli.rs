// src/cli.rs

use crate::constants;
use clap::{Parser, ValueEnum, crate_version};
use std::path::PathBuf;

/// 定义日志输出级别
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    version = crate_version!(),
    about,
    long_about = None,
    arg_required_else_help = true,
    disable_help_flag = true,
    disable_version_flag = true,
)]
pub struct Cli {
    /// 要下载的相册 ID
    #[arg(value_name = "ALBUM_ID")]
    pub album_id: String,
    /// 设置文件保存目录 (不存在时自动创建)
    #[arg(short, long, value_name = "DIR", help_heading = "Options")]
    pub output: PathBuf,

    // --- 认证选项 (Auth) ---
    /// OAuth 客户端 ID
    #[arg(long, env = "CLIENT_ID", hide_env_values = true, help_heading = "Auth")]
    pub client_id: Option<String>,
    /// OAuth 客户端密钥
    #[arg(long, env = "CLIENT_SECRET", hide_env_values = true, help_heading = "Auth")]
    pub client_secret: Option<String>,
    /// 本地授权回调服务监听的端口
    #[arg(long, default_value_t = constants::DEFAULT_CALLBACK_PORT, help_heading = "Auth")]
    pub port: u16,
    /// 等待浏览器授权的最长时间 (秒)，0 表示一直等待
    #[arg(long, value_name = "SECS", default_value_t = constants::DEFAULT_AUTH_TIMEOUT_SECS, help_heading = "Auth")]
    pub auth_timeout: u64,
    /// 忽略本地缓存的 Token，重新进行浏览器授权
    #[arg(long, action = clap::ArgAction::SetTrue, help_heading = "Auth")]
    pub force_login: bool,

    // --- 下载选项 (Options) ---
    /// 设置最大并发下载数
    #[arg(short, long, value_parser = clap::value_parser!(usize), help_heading = "Options")]
    pub workers: Option<usize>,
    /// 指定配置文件路径 (默认: ~/.photos-dl/config.json)
    #[arg(long, value_name = "FILE", help_heading = "Options")]
    pub config: Option<PathBuf>,

    // --- 通用选项 (General) ---
    /// 显示此帮助信息并退出
    #[arg(short = 'h', long, action = clap::ArgAction::Help, global = true, help_heading = "General")]
    _help: Option<bool>,
    /// 显示版本信息并退出
    #[arg(short = 'V', long, action = clap::ArgAction::Version, global = true, help_heading = "General")]
    _version: Option<bool>,
    /// 设置日志文件的输出级别
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true, help_heading = "General")]
    pub log_level: LogLevel,
}
