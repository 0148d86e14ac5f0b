// src/symbols.rs

//! 终端输出使用的状态前缀。日志文件不使用这些符号。

use colored::{ColoredString, Colorize};
use std::sync::LazyLock;

/// 授权成功、文件下载完成
pub static OK: LazyLock<ColoredString> = LazyLock::new(|| "[OK]".green().bold());
/// 单个文件下载失败或程序出错
pub static ERROR: LazyLock<ColoredString> = LazyLock::new(|| "[X]".red().bold());
pub static INFO: LazyLock<ColoredString> = LazyLock::new(|| "[i]".cyan());
/// 超时、缓存失效等可恢复的情况
pub static WARN: LazyLock<ColoredString> = LazyLock::new(|| "[!]".yellow());
pub static CTRL_C: LazyLock<ColoredString> = LazyLock::new(|| "Ctrl+C".yellow().bold());
