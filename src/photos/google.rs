// src/photos/google.rs

use super::AlbumFetcher;
use crate::{
    auth::Credential,
    client::{HttpClient, check_api_response},
    constants::photos::SEARCH_PAGE_SIZE,
    error::*,
    models::{
        Album, MediaItem,
        api::{AlbumResponse, SearchMediaItemsRequest, SearchMediaItemsResponse},
    },
};
use async_trait::async_trait;
use log::{debug, info};
use reqwest::header;

/// 基于 Photos Library REST API 的相册客户端
pub struct GooglePhotosClient {
    http: HttpClient,
    credential: Credential,
    api_base_url: String,
}

impl GooglePhotosClient {
    pub fn new(http: HttpClient, credential: Credential, api_base_url: &str) -> Self {
        Self {
            http,
            credential,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn search_page(
        &self,
        album_id: &str,
        page_token: Option<&str>,
    ) -> AppResult<SearchMediaItemsResponse> {
        let url = format!("{}/v1/mediaItems:search", self.api_base_url);
        let body = SearchMediaItemsRequest {
            album_id,
            page_size: SEARCH_PAGE_SIZE,
            page_token,
        };
        let res = self
            .http
            .api_post(&url)
            .header(header::AUTHORIZATION, self.credential.authorization_header())
            .json(&body)
            .send()
            .await?;
        Ok(check_api_response(res).await?.json().await?)
    }
}

#[async_trait]
impl AlbumFetcher for GooglePhotosClient {
    async fn fetch_album(&self, album_id: &str) -> AppResult<Album> {
        let url = format!("{}/v1/albums/{}", self.api_base_url, album_id);
        debug!("查询相册: {}", url);
        let res = self
            .http
            .api_get(&url)
            .header(header::AUTHORIZATION, self.credential.authorization_header())
            .send()
            .await?;
        let album: AlbumResponse = check_api_response(res).await?.json().await?;
        Ok(album.into())
    }

    async fn list_media_items(&self, album: &Album) -> AppResult<Vec<MediaItem>> {
        let mut items = Vec::with_capacity(album.media_items_count.unwrap_or(0) as usize);
        let mut page_token: Option<String> = None;
        let mut page = 0;
        loop {
            page += 1;
            let response = self.search_page(&album.id, page_token.as_deref()).await?;
            debug!("第 {} 页返回 {} 个条目", page, response.media_items.len());
            items.extend(response.media_items.into_iter().map(MediaItem::from));

            match response.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        info!("相册 '{}' 共列出 {} 个条目", album.title, items.len());
        Ok(items)
    }
}
