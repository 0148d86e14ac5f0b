// src/photos/mod.rs

pub mod google;

use crate::{
    error::*,
    models::{Album, MediaItem},
};
use async_trait::async_trait;

pub use google::GooglePhotosClient;

/// 相册数据来源：按 ID 查询相册，并按原有顺序列出其中的媒体条目。
#[async_trait]
pub trait AlbumFetcher: Send + Sync {
    async fn fetch_album(&self, album_id: &str) -> AppResult<Album>;

    async fn list_media_items(&self, album: &Album) -> AppResult<Vec<MediaItem>>;
}
