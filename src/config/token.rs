// src/config/token.rs

use crate::{
    auth::Credential,
    config::ExternalConfig,
    constants,
    error::{AppError, AppResult},
};
use anyhow::{Context, anyhow};
use log::{debug, info, warn};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub fn get_config_path() -> AppResult<PathBuf> {
    let path = dirs::home_dir()
        .ok_or_else(|| AppError::Other(anyhow!("无法获取用户主目录")))?
        .join(constants::CONFIG_DIR_NAME)
        .join(constants::CONFIG_FILE_NAME);
    Ok(path)
}

pub(crate) fn load_or_create_external_config(config_path: &Path) -> AppResult<ExternalConfig> {
    if config_path.is_file() {
        let content = fs::read_to_string(config_path)
            .with_context(|| format!("读取配置文件 '{}' 失败", config_path.display()))?;
        serde_json::from_str(&content).map_err(|source| AppError::ConfigParse {
            path: config_path.display().to_string(),
            source,
        })
    } else {
        info!("配置文件 {:?} 不存在，将创建默认配置。", config_path);
        let config = ExternalConfig::default_app_config();
        write_config(config_path, &config)?;
        Ok(config)
    }
}

/// 文件内容损坏时回退到默认配置，其余 I/O 错误仍然向上传递。
pub(crate) fn load_or_default(config_path: &Path) -> AppResult<ExternalConfig> {
    match load_or_create_external_config(config_path) {
        Err(e @ AppError::ConfigParse { .. }) => {
            warn!("{}，将使用默认配置。", e);
            Ok(ExternalConfig::default_app_config())
        }
        other => other,
    }
}

fn write_config(config_path: &Path, config: &ExternalConfig) -> AppResult<()> {
    if let Some(dir) = config_path.parent() {
        fs::create_dir_all(dir)?;
    }
    let json_content = serde_json::to_string_pretty(config)?;
    fs::write(config_path, json_content)
        .with_context(|| format!("写入配置文件 '{}' 失败", config_path.display()))?;
    Ok(())
}

/// 将新获取的凭据写回配置文件，保留文件中的其他设置。
pub fn save_token(config_path: &Path, credential: &Credential) -> AppResult<()> {
    let mut config = load_or_default(config_path)?;
    config.token = Some(credential.clone());
    write_config(config_path, &config)?;

    info!("Token 已保存至配置文件: {}", config_path.display());
    println!(
        "{} Token 已保存至: {}",
        *crate::symbols::INFO,
        config_path.display()
    );
    Ok(())
}

/// 读取缓存的凭据。文件损坏或不可读时视为没有缓存，走重新授权流程。
pub fn load_token_from_config(config_path: &Path) -> Option<Credential> {
    match load_or_create_external_config(config_path) {
        Ok(config) => {
            debug!("本地 Token 缓存: {}", if config.token.is_some() { "存在" } else { "不存在" });
            config.token
        }
        Err(e) => {
            warn!("读取本地 Token 缓存失败，将重新授权: {}", e);
            None
        }
    }
}
