//! End-to-end dispatch tests: routing, sessions, and cookies over a live
//! server.

use std::time::Duration;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use wicket::config::ServerConfig;
use wicket::http::reply;
use wicket::routing::{handler, RouteOptions, Router, RouterConfig};

mod common;

fn demo_router() -> Router {
    demo_router_with(RouterConfig::default())
}

fn demo_router_with(config: RouterConfig) -> Router {
    let mut router = Router::new(config);

    router
        .get(
            "nodes/:tree_id:int/:parent_id:int",
            handler(|ctx| async move {
                reply::json(
                    StatusCode::OK,
                    &json!({
                        "tree_id": ctx.params.int("tree_id"),
                        "parent_id": ctx.params.int("parent_id"),
                    }),
                )
            }),
        )
        .unwrap();

    router
        .get(
            "hello",
            handler(|mut ctx| async move {
                let visits = match ctx.session.as_mut() {
                    Some(session) => {
                        let n = session.data["visits"].as_u64().unwrap_or(0) + 1;
                        session.data["visits"] = json!(n);
                        session.save();
                        n
                    }
                    None => 0,
                };
                reply::json(StatusCode::OK, &json!({ "visits": visits }))
            }),
        )
        .unwrap();

    router
        .add_route_opts(
            "static/*",
            &[Method::GET],
            handler(|ctx| async move {
                let rest = ctx.params.wildcard().unwrap_or("").to_string();
                reply::text(StatusCode::OK, rest)
            }),
            RouteOptions { session: false },
        )
        .unwrap();

    router
        .post(
            "echo",
            handler(|ctx| async move {
                match ctx.json::<Value>() {
                    Ok(body) => reply::json(StatusCode::OK, &body),
                    Err(_) => reply::text(StatusCode::BAD_REQUEST, "Bad Request"),
                }
            }),
        )
        .unwrap();

    router
}

#[tokio::test]
async fn test_parameterized_dispatch() {
    let server = common::start_server(ServerConfig::default(), demo_router()).await;
    let client = reqwest::Client::new();

    let body: Value = client
        .get(server.url("/nodes/5/9"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["tree_id"], 5);
    assert_eq!(body["parent_id"], 9);

    server.stop();
}

#[tokio::test]
async fn test_unmatched_path_is_plain_404() {
    let server = common::start_server(ServerConfig::default(), demo_router()).await;
    let client = reqwest::Client::new();

    let response = client.get(server.url("/nowhere")).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    assert_eq!(response.text().await.unwrap(), "Not Found");

    server.stop();
}

#[tokio::test]
async fn test_custom_not_found_route() {
    let mut router = demo_router();
    router.set_not_found(handler(|ctx| async move {
        reply::text(StatusCode::NOT_FOUND, format!("no route for {}", ctx.path))
    }));
    let server = common::start_server(ServerConfig::default(), router).await;
    let client = reqwest::Client::new();

    let response = client.get(server.url("/nowhere")).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    assert_eq!(response.text().await.unwrap(), "no route for /nowhere");

    server.stop();
}

#[tokio::test]
async fn test_wildcard_dispatch_skips_session() {
    let server = common::start_server(ServerConfig::default(), demo_router()).await;
    let client = reqwest::Client::new();

    let response = client
        .get(server.url("/static/css/site.css"))
        .send()
        .await
        .unwrap();
    // No session bootstrap on this route, so no cookie is issued.
    assert!(response.headers().get("set-cookie").is_none());
    assert_eq!(response.text().await.unwrap(), "css/site.css");
    assert_eq!(server.sessions.len(), 0);

    server.stop();
}

#[tokio::test]
async fn test_session_cookie_roundtrip() {
    let server = common::start_server(ServerConfig::default(), demo_router()).await;
    let client = reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .unwrap();

    // First request mints a session and sets the cookie.
    let response = client.get(server.url("/hello")).send().await.unwrap();
    let cookie = response
        .headers()
        .get("set-cookie")
        .expect("first response must set the session cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("sid="));
    assert!(cookie.contains("HttpOnly"));
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["visits"], 1);
    assert_eq!(server.sessions.len(), 1);

    // Second request reuses it: no new cookie, counter advances.
    let response = client.get(server.url("/hello")).send().await.unwrap();
    assert!(response.headers().get("set-cookie").is_none());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["visits"], 2);
    assert_eq!(server.sessions.len(), 1);

    server.stop();
}

#[tokio::test]
async fn test_stale_token_is_replaced() {
    let mut config = ServerConfig::default();
    config.session.ttl_secs = 1;
    let server = common::start_server(config, demo_router()).await;
    let client = reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .unwrap();

    let response = client.get(server.url("/hello")).send().await.unwrap();
    let first = response.headers()["set-cookie"].to_str().unwrap().to_string();

    tokio::time::sleep(Duration::from_millis(1_300)).await;

    // Token is past its TTL; the server discards it and mints a new one.
    let response = client.get(server.url("/hello")).send().await.unwrap();
    let second = response
        .headers()
        .get("set-cookie")
        .expect("stale token must be replaced")
        .to_str()
        .unwrap()
        .to_string();
    assert_ne!(first, second);

    server.stop();
}

#[tokio::test]
async fn test_head_falls_back_to_get() {
    let server = common::start_server(ServerConfig::default(), demo_router()).await;
    let client = reqwest::Client::new();

    let response = client.head(server.url("/nodes/1/2")).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    server.stop();
}

#[tokio::test]
async fn test_head_fallback_disabled() {
    let mut config = ServerConfig::default();
    config.router.check_head = false;
    let router = demo_router_with(RouterConfig { check_head: false });
    let server = common::start_server(config, router).await;
    let client = reqwest::Client::new();

    let response = client.head(server.url("/nodes/1/2")).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

    server.stop();
}

#[tokio::test]
async fn test_json_body_echo() {
    let server = common::start_server(ServerConfig::default(), demo_router()).await;
    let client = reqwest::Client::new();

    let body: Value = client
        .post(server.url("/echo"))
        .json(&json!({"k": "v"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["k"], "v");

    let response = client
        .post(server.url("/echo"))
        .body("not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    server.stop();
}
