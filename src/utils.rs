// src/utils.rs

use crate::constants::MAX_FILENAME_BYTES;
use regex::Regex;
use std::sync::LazyLock;

/// 路径分隔符、Windows 禁用字符、控制字符以及空白，连续出现时合并为一个空格
static UNSAFE_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/*?:"<>|\x00-\x1f\s]+"#).unwrap());
static RESERVED_STEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(CON|PRN|AUX|NUL|COM[1-9]|LPT[1-9])$").unwrap());

/// 将相册条目的显示名转换为可以直接放进输出目录的文件名。
///
/// 结果不包含路径分隔符，不以点或空格开头结尾，不超过 `MAX_FILENAME_BYTES` 字节，
/// 截断时保留扩展名。
pub fn sanitize_filename(display_name: &str) -> String {
    if display_name.trim().is_empty() {
        return "unknown".to_string();
    }

    let collapsed = UNSAFE_RUN_RE.replace_all(display_name, " ");
    let cleaned = collapsed.trim_matches(|c: char| c == '.' || c == ' ');
    if cleaned.is_empty() {
        return "unnamed".to_string();
    }

    let stem = cleaned.split_once('.').map_or(cleaned, |(stem, _)| stem);
    let name = if RESERVED_STEM_RE.is_match(stem) {
        format!("_{}", cleaned)
    } else {
        cleaned.to_string()
    };

    fit_to_limit(name)
}

fn fit_to_limit(name: String) -> String {
    if name.len() <= MAX_FILENAME_BYTES {
        return name;
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) if ext.len() + 1 < MAX_FILENAME_BYTES => {
            let budget = MAX_FILENAME_BYTES - ext.len() - 1;
            format!("{}.{}", floor_to_char_boundary(stem, budget), ext)
        }
        _ => floor_to_char_boundary(&name, MAX_FILENAME_BYTES).to_string(),
    }
}

fn floor_to_char_boundary(s: &str, max_bytes: usize) -> &str {
    let end = s
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take_while(|&end| end <= max_bytes)
        .last()
        .unwrap_or(0);
    &s[..end]
}
