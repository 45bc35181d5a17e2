//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum app with a single catch-all dispatch handler
//! - Wire up middleware (tracing, timeout, body limit)
//! - Resolve each request through the route-matching engine
//! - Bootstrap sessions for routes that require one
//! - Emit one structured access-log event per request
//!
//! # Design Decisions
//! - All paths funnel through one fallback handler; route resolution is
//!   the engine's job, not Axum's
//! - Session bootstrap treats a stale token the same as a missing one:
//!   discard it and mint a fresh session
//! - The session sweeper runs for exactly as long as the server does

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::to_bytes;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::http::context::{RequestContext, SessionCtx};
use crate::http::cookies::{cookie_get, SetCookie};
use crate::http::reply;
use crate::lifecycle::Shutdown;
use crate::routing::Router as PathRouter;
use crate::session::{SessionStore, Sweeper};

/// Application state injected into the dispatch handler.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<PathRouter>,
    pub sessions: SessionStore<Value>,
    cookie_name: String,
    session_ttl_secs: u64,
    max_body_bytes: usize,
}

/// The serving front end: listener loop, dispatch, session bootstrap.
pub struct HttpServer {
    config: ServerConfig,
    router: Arc<PathRouter>,
    sessions: SessionStore<Value>,
}

impl HttpServer {
    /// Create a server around a fully registered router.
    pub fn new(config: ServerConfig, router: PathRouter) -> Self {
        let sessions = SessionStore::new(config.session.ttl());
        Self {
            config,
            router: Arc::new(router),
            sessions,
        }
    }

    /// Handle to the session store (shared with the running server).
    pub fn sessions(&self) -> SessionStore<Value> {
        self.sessions.clone()
    }

    /// Serve until the shutdown signal fires.
    pub async fn run(self, listener: TcpListener, shutdown: &Shutdown) -> std::io::Result<()> {
        let sweeper = Sweeper::spawn(self.sessions.clone(), shutdown.subscribe());

        let state = AppState {
            router: Arc::clone(&self.router),
            sessions: self.sessions.clone(),
            cookie_name: self.config.session.cookie_name.clone(),
            session_ttl_secs: self.config.session.ttl_secs,
            max_body_bytes: self.config.limits.max_body_bytes,
        };

        for info in self.router.routes() {
            tracing::debug!(pattern = %info.pattern, methods = ?info.methods, "Route registered");
        }

        let app = axum::Router::new()
            .fallback(dispatch)
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(Duration::from_secs(
                self.config.limits.request_timeout_secs,
            )))
            .layer(RequestBodyLimitLayer::new(self.config.limits.max_body_bytes))
            .with_state(state);

        let mut rx = shutdown.subscribe();
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            let _ = rx.recv().await;
        })
        .await?;

        // Serving stopped; wait for the sweeper to observe the signal.
        sweeper.join().await;
        Ok(())
    }
}

/// Resolve, bootstrap the session if the route asks for one, run the
/// handler, queue the session cookie, log.
async fn dispatch(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
) -> Response {
    let start = Instant::now();
    let trace_id = Uuid::new_v4().to_string();

    let (parts, body) = request.into_parts();
    let method = parts.method.clone();
    let raw_path = parts.uri.path();
    let path = urlencoding::decode(raw_path)
        .map(|p| p.into_owned())
        .unwrap_or_else(|_| raw_path.to_string());
    let query = parts.uri.query().map(str::to_string);

    let found = match state.router.resolve(&path, &method) {
        Some(found) => found,
        None => {
            let response = reply::text(StatusCode::NOT_FOUND, "Not Found");
            access_log(&trace_id, &addr, &method, &path, None, &response, start, "-");
            return response;
        }
    };

    let mut pending_cookie = None;
    let session = if found.route.session_required() {
        Some(establish_session(&state, &parts.headers, &mut pending_cookie))
    } else {
        None
    };
    let session_key = session.as_ref().map(|s| s.key.clone());

    let body = match to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(trace_id = %trace_id, error = %err, "Request body rejected");
            return reply::text(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large");
        }
    };

    let ctx = RequestContext {
        method: method.clone(),
        path: path.clone(),
        query,
        headers: parts.headers,
        body,
        params: found.params,
        trace_id: trace_id.clone(),
        session,
    };

    let mut response = (found.route.handler())(ctx).await;

    if let Some(cookie) = pending_cookie {
        match HeaderValue::from_str(&cookie.format()) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(err) => {
                tracing::error!(trace_id = %trace_id, error = %err, "Invalid session cookie value");
            }
        }
    }

    access_log(
        &trace_id,
        &addr,
        &method,
        &path,
        session_key.as_deref(),
        &response,
        start,
        found.route.pattern(),
    );
    response
}

/// Resolve the session for this request, minting a new one when the
/// presented token is absent, unknown, or stale.
fn establish_session(
    state: &AppState,
    headers: &HeaderMap,
    pending_cookie: &mut Option<SetCookie>,
) -> SessionCtx {
    if let Some(token) = cookie_get(headers, &state.cookie_name) {
        if let Some(found) = state.sessions.get(&token, false) {
            if !found.stale {
                state.sessions.touch(&token);
                return SessionCtx::new(token, found.value, state.sessions.clone());
            }
            // Stale entry stays in the store for the sweep; the token is
            // simply no longer honored.
        }
    }

    let key = state.sessions.generate_key();
    let data = json!({ "sid": key });
    state.sessions.insert(&key, data.clone());
    *pending_cookie =
        Some(SetCookie::new(&state.cookie_name, &key).max_age(state.session_ttl_secs));
    SessionCtx::new(key, data, state.sessions.clone())
}

#[allow(clippy::too_many_arguments)]
fn access_log(
    trace_id: &str,
    addr: &SocketAddr,
    method: &axum::http::Method,
    path: &str,
    session_key: Option<&str>,
    response: &Response,
    start: Instant,
    pattern: &str,
) {
    tracing::info!(
        trace_id = %trace_id,
        client_ip = %addr.ip(),
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        session = session_key.unwrap_or("-"),
        route = pattern,
        "request"
    );
}
