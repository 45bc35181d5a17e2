//! Demo server for the wicket framework.
//!
//! Registers a handful of routes exercising exact, parameterized, and
//! wildcard matching plus the session-backed visit counter, then serves
//! until ctrl-c.

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use wicket::config::{load_config, ServerConfig};
use wicket::http::reply;
use wicket::routing::{handler, RouteOptions, Router, RouterConfig};
use wicket::{HttpServer, Shutdown};

use axum::http::{Method, StatusCode};
use serde_json::json;

#[derive(Parser)]
#[command(name = "wicket")]
#[command(about = "Minimal HTTP serving framework demo", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

fn build_router(check_head: bool) -> Result<Router, wicket::routing::RouterError> {
    let mut router = Router::new(RouterConfig { check_head });

    router.get(
        "/",
        handler(|_ctx| async { reply::text(StatusCode::OK, "wicket") }),
    )?;

    // Session-backed visit counter.
    router.get(
        "hello/:name:str",
        handler(|mut ctx| async move {
            let name = ctx.params.str("name").unwrap_or("world").to_string();
            let visits = match ctx.session.as_mut() {
                Some(session) => {
                    let n = session.data["visits"].as_u64().unwrap_or(0) + 1;
                    session.data["visits"] = json!(n);
                    session.save();
                    n
                }
                None => 0,
            };
            reply::json(StatusCode::OK, &json!({ "hello": name, "visits": visits }))
        }),
    )?;

    router.add_route(
        "nodes/:tree_id:int/:parent_id:int",
        &[Method::GET, Method::POST],
        handler(|ctx| async move {
            let Some(tree_id) = ctx.params.int("tree_id") else {
                return reply::text(StatusCode::BAD_REQUEST, "tree_id must be an integer");
            };
            let Some(parent_id) = ctx.params.int("parent_id") else {
                return reply::text(StatusCode::BAD_REQUEST, "parent_id must be an integer");
            };
            reply::json(
                StatusCode::OK,
                &json!({ "tree_id": tree_id, "parent_id": parent_id }),
            )
        }),
    )?;

    // Static-style wildcard route; no session bootstrap.
    router.add_route_opts(
        "static/*",
        &[Method::GET],
        handler(|ctx| async move {
            let rest = ctx.params.wildcard().unwrap_or("").to_string();
            reply::text(StatusCode::OK, format!("static resource: {}", rest))
        }),
        RouteOptions { session: false },
    )?;

    router.set_not_found(handler(|ctx| async move {
        reply::text(StatusCode::NOT_FOUND, format!("no route for {}", ctx.path))
    }));

    Ok(router)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    wicket::observability::logging::init("wicket=debug,tower_http=debug");

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        session_ttl_secs = config.session.ttl_secs,
        check_head = config.router.check_head,
        "Configuration loaded"
    );

    let router = build_router(config.router.check_head)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();

    let server = HttpServer::new(config, router);
    server.run(listener, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
