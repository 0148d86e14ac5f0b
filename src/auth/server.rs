// src/auth/server.rs

use super::{
    credential::{Credential, CredentialSlot},
    oauth::OAuthClient,
    state::AuthSession,
};
use crate::{
    client::HttpClient,
    config::OAuthSettings,
    constants::{oauth::STATE_COOKIE, routes},
    error::*,
};
use axum::{
    Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use log::{debug, error, info, warn};
use serde::Deserialize;
use std::{
    collections::HashMap,
    net::{Ipv4Addr, SocketAddr},
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

const SUCCESS_PAGE: &str = r#"<!DOCTYPE html>
<html lang="zh-CN">
<head><meta charset="utf-8"><title>授权完成</title></head>
<body><p>授权完成，可以关闭此窗口并返回终端。</p></body>
</html>"#;

/// 所有请求处理器共享的状态
#[derive(Clone)]
struct CallbackState {
    oauth: OAuthClient,
    /// 已签发但尚未被回调消费的 state
    sessions: Arc<Mutex<HashMap<String, AuthSession>>>,
    slot: Arc<CredentialSlot>,
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
    state: Option<String>,
    code: Option<String>,
    error: Option<String>,
}

/// 本地授权回调服务。
///
/// 提供三个路由:
/// - `/` 跳转到登录入口
/// - `/auth/google/login` 签发 state 并跳转到授权页面
/// - `/auth/google/callback` 校验 state，用授权码换取凭据并写入凭据槽
///
/// 校验或换取失败时服务继续运行，用户可以重新访问登录入口。
pub struct AuthCallbackServer {
    local_addr: SocketAddr,
    slot: Arc<CredentialSlot>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl AuthCallbackServer {
    /// 在 `127.0.0.1:<port>` 上启动服务，端口为 0 时由系统分配。
    pub async fn start(port: u16, settings: OAuthSettings, http: HttpClient) -> AppResult<Self> {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, port)).await?;
        let local_addr = listener.local_addr()?;
        let redirect_uri = format!("http://{}{}", local_addr, routes::CALLBACK);
        debug!("授权回调地址: {}", redirect_uri);

        let slot = Arc::new(CredentialSlot::new());
        let app = router(CallbackState {
            oauth: OAuthClient::new(settings, redirect_uri, http),
            sessions: Arc::new(Mutex::new(HashMap::new())),
            slot: slot.clone(),
        });

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            });
            if let Err(e) = server.await {
                error!("授权回调服务异常退出: {}", e);
            }
        });
        info!("授权回调服务已启动: {}", local_addr);

        Ok(Self {
            local_addr,
            slot,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// 提示用户在浏览器中打开的地址
    pub fn root_url(&self) -> String {
        format!("http://{}{}", self.local_addr, routes::ROOT)
    }

    pub fn has_credential(&self) -> bool {
        self.slot.has_credential()
    }

    /// 尚未完成授权时返回 `None`，调用方应先检查 [`Self::has_credential`]。
    pub fn credential(&self) -> Option<Credential> {
        self.slot.credential()
    }

    /// 优雅关闭服务，超过宽限时间仍未退出则强制终止。
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(mut handle) = self.handle.take()
            && tokio::time::timeout(SHUTDOWN_GRACE, &mut handle).await.is_err()
        {
            warn!("授权回调服务未能在 {:?} 内关闭，强制终止", SHUTDOWN_GRACE);
            handle.abort();
        }
        info!("授权回调服务已关闭");
    }
}

impl Drop for AuthCallbackServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn router(state: CallbackState) -> Router {
    Router::new()
        .route(routes::ROOT, get(redirect_to_login))
        .route(routes::LOGIN, get(login))
        .route(routes::CALLBACK, get(callback))
        .with_state(state)
}

async fn redirect_to_login() -> Redirect {
    Redirect::temporary(routes::LOGIN)
}

async fn login(State(state): State<CallbackState>, jar: CookieJar) -> Response {
    let session = match AuthSession::new() {
        Ok(session) => session,
        Err(e) => {
            error!("生成 OAuth state 失败，无法安全地继续授权: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "无法生成授权状态").into_response();
        }
    };
    let auth_url = match state.oauth.authorization_url(&session.state) {
        Ok(url) => url,
        Err(e) => {
            error!("构造授权地址失败: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "授权地址配置错误").into_response();
        }
    };

    let cookie = Cookie::build((STATE_COOKIE, session.state.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    debug!("签发新的授权 state (签发时间: {})", session.issued_at);
    state
        .sessions
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(session.state.clone(), session);

    (jar.add(cookie), Redirect::temporary(&auth_url)).into_response()
}

async fn callback(
    State(state): State<CallbackState>,
    jar: CookieJar,
    params: Result<Query<CallbackParams>, QueryRejection>,
) -> Response {
    let Ok(Query(params)) = params.inspect_err(|e| warn!("无法解析授权回调参数: {}", e)) else {
        return Redirect::temporary(routes::ROOT).into_response();
    };
    if state.slot.has_credential() {
        warn!("已完成授权，忽略重复的回调请求");
        return Redirect::temporary(routes::ROOT).into_response();
    }
    if let Some(err) = params.error.as_deref() {
        warn!("授权服务返回错误: {}", err);
        return Redirect::temporary(routes::ROOT).into_response();
    }

    let cookie_state = jar.get(STATE_COOKIE).map(|c| c.value().to_string());
    let Some(session) = take_session(&state, params.state.as_deref(), cookie_state.as_deref())
    else {
        warn!("回调 state 校验失败: 与签发的 state 不一致或已被使用");
        return Redirect::temporary(routes::ROOT).into_response();
    };
    debug!("state 校验通过 (签发时间: {})", session.issued_at);

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        warn!("授权回调缺少 code 参数");
        return Redirect::temporary(routes::ROOT).into_response();
    };

    match state.oauth.exchange_code(&code).await {
        Ok(credential) => {
            if !state.slot.set(credential) {
                warn!("凭据已由另一个回调写入，丢弃本次结果");
                return Redirect::temporary(routes::ROOT).into_response();
            }
            info!("已获取访问凭据");
            let jar = jar.remove(Cookie::build(STATE_COOKIE).path("/"));
            (jar, Html(SUCCESS_PAGE)).into_response()
        }
        Err(e) => {
            error!("授权码换取 Token 失败: {}", e);
            Redirect::temporary(routes::ROOT).into_response()
        }
    }
}

/// 查询参数与 cookie 中的 state 必须一致，并且是本服务签发且未被使用过的。
/// 匹配成功时该 state 被移除，保证只能消费一次。
fn take_session(
    state: &CallbackState,
    query_state: Option<&str>,
    cookie_state: Option<&str>,
) -> Option<AuthSession> {
    let (Some(query_state), Some(cookie_state)) = (query_state, cookie_state) else {
        return None;
    };
    if query_state != cookie_state {
        return None;
    }
    state
        .sessions
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(query_state)
}
