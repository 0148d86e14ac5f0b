// src/constants.rs

use std::time::Duration;

pub const UI_WIDTH: usize = 88;
pub const MAX_FILENAME_BYTES: usize = 200;
pub const CONFIG_DIR_NAME: &str = concat!(".", clap::crate_name!());
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const LOG_FILE_NAME: &str = "app.log";
pub const LOG_FALLBACK_FILE_NAME: &str = "fallback.log";
pub const USER_AGENT: &str = concat!(clap::crate_name!(), "/", clap::crate_version!());

pub const DEFAULT_CALLBACK_PORT: u16 = 5837;
pub const DEFAULT_MAX_WORKERS: usize = 8;
pub const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 300;
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

pub mod oauth {
    pub const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
    pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
    pub const PHOTOS_SCOPE: &str = "https://www.googleapis.com/auth/photoslibrary.readonly";
    pub const STATE_COOKIE: &str = "oauthstate";
    /// 随机 state 的字节数 (256 bit)
    pub const STATE_BYTES: usize = 32;
}

pub mod routes {
    pub const ROOT: &str = "/";
    pub const LOGIN: &str = "/auth/google/login";
    pub const CALLBACK: &str = "/auth/google/callback";
}

pub mod photos {
    pub const API_BASE_URL: &str = "https://photoslibrary.googleapis.com";
    pub const SEARCH_PAGE_SIZE: u32 = 100;
    /// 追加在 baseUrl 之后，请求原始画质的文件
    pub const ORIGINAL_QUALITY_SUFFIX: &str = "=d";
    pub const IMAGE_MIME_PREFIX: &str = "image/";
}
