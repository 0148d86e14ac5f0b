// tests/auth_server_test.rs

use photos_dl::auth::{AuthCallbackServer, wait_for_credential};
use photos_dl::client::HttpClient;
use photos_dl::config::{AppConfig, OAuthSettings};
use photos_dl::error::AppError;
use reqwest::{StatusCode, header, redirect::Policy};
use std::time::Duration;

const TOKEN_BODY: &str =
    r#"{"access_token":"at-123","token_type":"Bearer","expires_in":3600,"refresh_token":"rt-456"}"#;

fn settings(token_url: String) -> OAuthSettings {
    OAuthSettings {
        client_id: "test-client-id".into(),
        client_secret: "test-client-secret".into(),
        auth_url: "https://auth.example.test/o/oauth2/auth".into(),
        token_url,
        scopes: vec!["https://www.googleapis.com/auth/photoslibrary.readonly".into()],
    }
}

async fn start_server(token_url: String) -> AuthCallbackServer {
    let http = HttpClient::new(&AppConfig::default()).expect("Failed to create client");
    AuthCallbackServer::start(0, settings(token_url), http)
        .await
        .expect("Failed to start callback server")
}

// 不跟随重定向的浏览器替身
fn browser() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(Policy::none())
        .build()
        .unwrap()
}

fn location(res: &reqwest::Response) -> String {
    res.headers()
        .get(header::LOCATION)
        .expect("missing Location header")
        .to_str()
        .unwrap()
        .to_string()
}

/// 访问登录入口，返回 cookie 中签发的 state 以及跳转目标
async fn login(server: &AuthCallbackServer) -> (String, String) {
    let res = browser()
        .get(format!("http://{}/auth/google/login", server.local_addr()))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);

    let set_cookie = res
        .headers()
        .get(header::SET_COOKIE)
        .expect("login must set the state cookie")
        .to_str()
        .unwrap()
        .to_string();
    let state = set_cookie
        .split(';')
        .next()
        .and_then(|pair| pair.trim().strip_prefix("oauthstate="))
        .expect("cookie must be named oauthstate")
        .to_string();
    (state, location(&res))
}

async fn callback(
    server: &AuthCallbackServer,
    query_state: &str,
    cookie_state: &str,
) -> reqwest::Response {
    browser()
        .get(format!("http://{}/auth/google/callback", server.local_addr()))
        .query(&[("state", query_state), ("code", "the-code")])
        .header(header::COOKIE, format!("oauthstate={}", cookie_state))
        .send()
        .await
        .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_root_redirects_to_login() {
    let server = start_server("http://127.0.0.1:1/token".into()).await;

    let res = browser().get(server.root_url()).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/auth/google/login");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_sets_cookie_matching_authorization_url_state() {
    let server = start_server("http://127.0.0.1:1/token".into()).await;

    let (state, auth_url) = login(&server).await;

    assert_eq!(state.len(), 43);
    let url = url::Url::parse(&auth_url).unwrap();
    assert_eq!(url.host_str(), Some("auth.example.test"));
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    assert!(pairs.contains(&("state".into(), state.clone())));
    assert!(pairs.contains(&("response_type".into(), "code".into())));
    assert!(pairs.contains(&(
        "redirect_uri".into(),
        format!("http://{}/auth/google/callback", server.local_addr())
    )));

    // 每次登录都签发新的 state
    let (second_state, _) = login(&server).await;
    assert_ne!(state, second_state);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_state_mismatch_is_rejected_without_exchange() {
    let mut token_server = mockito::Server::new_async().await;
    let token_mock = token_server
        .mock("POST", "/token")
        .with_status(200)
        .with_body(TOKEN_BODY)
        .expect(0)
        .create_async()
        .await;
    let server = start_server(format!("{}/token", token_server.url())).await;
    let (state, _) = login(&server).await;

    // 查询参数与 cookie 不一致
    let res = callback(&server, "forged-state", &state).await;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/");

    // 两者一致但不是本服务签发的
    let res = callback(&server, "forged-state", "forged-state").await;
    assert_eq!(location(&res), "/");

    assert!(!server.has_credential());
    token_mock.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_successful_callback_fills_slot_once() {
    let mut token_server = mockito::Server::new_async().await;
    let token_mock = token_server
        .mock("POST", "/token")
        .match_body(mockito::Matcher::UrlEncoded("code".into(), "the-code".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(TOKEN_BODY)
        .expect(1)
        .create_async()
        .await;
    let server = start_server(format!("{}/token", token_server.url())).await;

    let (state, _) = login(&server).await;
    let res = callback(&server, &state, &state).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(server.has_credential());
    let credential = server.credential().unwrap();
    assert_eq!(credential.access_token, "at-123");
    assert_eq!(credential.refresh_token.as_deref(), Some("rt-456"));

    // state 只能消费一次
    let res = callback(&server, &state, &state).await;
    assert_eq!(location(&res), "/");

    // 已有凭据后，新的合法回调也被忽略
    let (fresh_state, _) = login(&server).await;
    let res = callback(&server, &fresh_state, &fresh_state).await;
    assert_eq!(location(&res), "/");

    assert_eq!(server.credential().unwrap().access_token, "at-123");
    token_mock.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_exchange_failure_leaves_slot_empty() {
    let mut token_server = mockito::Server::new_async().await;
    let _token_mock = token_server
        .mock("POST", "/token")
        .with_status(400)
        .with_body(r#"{"error":"invalid_grant","error_description":"Bad Request"}"#)
        .create_async()
        .await;
    let server = start_server(format!("{}/token", token_server.url())).await;

    let (state, _) = login(&server).await;
    let res = callback(&server, &state, &state).await;

    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/");
    assert!(!server.has_credential());
    assert!(server.credential().is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_wait_for_credential_returns_after_callback() {
    let mut token_server = mockito::Server::new_async().await;
    let _token_mock = token_server
        .mock("POST", "/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(TOKEN_BODY)
        .create_async()
        .await;
    let mut server = start_server(format!("{}/token", token_server.url())).await;
    let addr = server.local_addr();

    let browser_task = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let client = browser();
        let res = client
            .get(format!("http://{}/auth/google/login", addr))
            .send()
            .await
            .unwrap();
        let state = res
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .and_then(|v| v.strip_prefix("oauthstate="))
            .unwrap()
            .to_string();
        client
            .get(format!("http://{}/auth/google/callback", addr))
            .query(&[("state", state.as_str()), ("code", "the-code")])
            .header(header::COOKIE, format!("oauthstate={}", state))
            .send()
            .await
            .unwrap()
            .status()
    });

    let credential = wait_for_credential(&server, Duration::from_millis(20), Some(Duration::from_secs(5)))
        .await
        .expect("credential should arrive before the deadline");
    assert_eq!(credential.access_token, "at-123");
    assert_eq!(browser_task.await.unwrap(), StatusCode::OK);

    server.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_wait_for_credential_times_out() {
    let mut server = start_server("http://127.0.0.1:1/token".into()).await;

    let result = wait_for_credential(
        &server,
        Duration::from_millis(20),
        Some(Duration::from_millis(150)),
    )
    .await;

    assert!(matches!(result, Err(AppError::AuthTimeout(_))));
    server.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_malformed_callback_query_redirects_home() {
    let server = start_server("http://127.0.0.1:1/token".into()).await;
    let (state, _) = login(&server).await;

    // 重复的 state 参数无法解析
    let res = browser()
        .get(format!(
            "http://{}/auth/google/callback?state={}&state=other&code=x",
            server.local_addr(),
            state
        ))
        .header(header::COOKIE, format!("oauthstate={}", state))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/");
    assert!(!server.has_credential());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_concurrent_callbacks_assign_credential_once() {
    let mut token_server = mockito::Server::new_async().await;
    let mut token_mocks = Vec::new();
    for (code, token) in [("code-a", "at-a"), ("code-b", "at-b")] {
        let mock = token_server
            .mock("POST", "/token")
            .match_body(mockito::Matcher::UrlEncoded("code".into(), code.into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(r#"{{"access_token":"{}","expires_in":3600}}"#, token))
            .create_async()
            .await;
        token_mocks.push(mock);
    }
    let server = start_server(format!("{}/token", token_server.url())).await;

    let (state_a, _) = login(&server).await;
    let (state_b, _) = login(&server).await;
    let send = |state: String, code: &'static str| {
        let url = format!("http://{}/auth/google/callback", server.local_addr());
        async move {
            browser()
                .get(url)
                .query(&[("state", state.as_str()), ("code", code)])
                .header(header::COOKIE, format!("oauthstate={}", state))
                .send()
                .await
                .unwrap()
                .status()
        }
    };

    let (status_a, status_b) = tokio::join!(send(state_a, "code-a"), send(state_b, "code-b"));

    let accepted = [status_a, status_b]
        .iter()
        .filter(|s| **s == StatusCode::OK)
        .count();
    assert_eq!(accepted, 1, "statuses: {:?} {:?}", status_a, status_b);
    assert!(
        [status_a, status_b].contains(&StatusCode::TEMPORARY_REDIRECT),
        "the losing callback must be redirected home"
    );
    let stored = server.credential().unwrap().access_token;
    assert!(stored == "at-a" || stored == "at-b");
    assert_eq!(server.credential().unwrap().access_token, stored);
}
