// tests/photos_client_test.rs

use mockito::Matcher;
use photos_dl::auth::Credential;
use photos_dl::client::HttpClient;
use photos_dl::config::AppConfig;
use photos_dl::error::AppError;
use photos_dl::photos::{AlbumFetcher, GooglePhotosClient};
use serde_json::json;

fn credential() -> Credential {
    Credential {
        access_token: "at-123".into(),
        token_type: "Bearer".into(),
        refresh_token: None,
        expiry: None,
    }
}

fn photos_client(base_url: &str) -> GooglePhotosClient {
    let http = HttpClient::new(&AppConfig::default()).expect("Failed to create client");
    GooglePhotosClient::new(http, credential(), base_url)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_album_listing_follows_pagination_in_order() {
    let mut server = mockito::Server::new_async().await;

    let album_mock = server
        .mock("GET", "/v1/albums/alb-1")
        .match_header("authorization", "Bearer at-123")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"alb-1","title":"假期","mediaItemsCount":"3"}"#)
        .create_async()
        .await;

    let first_page = server
        .mock("POST", "/v1/mediaItems:search")
        .match_header("authorization", "Bearer at-123")
        .match_body(Matcher::Json(json!({"albumId": "alb-1", "pageSize": 100})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "mediaItems": [
                    {"id": "m1", "filename": "a.jpg", "mimeType": "image/jpeg", "baseUrl": "http://x/u1"},
                    {"id": "m2", "filename": "clip.mp4", "mimeType": "video/mp4", "baseUrl": "http://x/u2"}
                ],
                "nextPageToken": "p2"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let second_page = server
        .mock("POST", "/v1/mediaItems:search")
        .match_body(Matcher::PartialJson(json!({"albumId": "alb-1", "pageToken": "p2"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "mediaItems": [
                    {"id": "m3", "filename": "b.png", "mimeType": "image/png", "baseUrl": "http://x/u3"}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = photos_client(&server.url());
    let album = client.fetch_album("alb-1").await.unwrap();
    assert_eq!(album.title, "假期");
    assert_eq!(album.media_items_count, Some(3));

    let items = client.list_media_items(&album).await.unwrap();
    let names: Vec<&str> = items.iter().map(|i| i.filename.as_str()).collect();
    assert_eq!(names, ["a.jpg", "clip.mp4", "b.png"]);
    assert!(items[0].is_image());
    assert!(!items[1].is_image());
    assert_eq!(items[2].download_url(), "http://x/u3=d");

    album_mock.assert_async().await;
    first_page.assert_async().await;
    second_page.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unauthorized_album_lookup_maps_to_token_invalid() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/v1/albums/alb-1")
        .with_status(401)
        .with_body(r#"{"error":{"code":401,"message":"Request had invalid authentication credentials.","status":"UNAUTHENTICATED"}}"#)
        .create_async()
        .await;

    let result = photos_client(&server.url()).fetch_album("alb-1").await;

    assert!(matches!(result, Err(AppError::TokenInvalid)));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_album_reports_api_message() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/v1/albums/nope")
        .with_status(404)
        .with_body(r#"{"error":{"code":404,"message":"Requested entity was not found.","status":"NOT_FOUND"}}"#)
        .create_async()
        .await;

    let result = photos_client(&server.url()).fetch_album("nope").await;

    match result {
        Err(AppError::Api { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "Requested entity was not found.");
        }
        other => panic!("expected Api error, got {:?}", other.map(|a| a.id)),
    }
}
