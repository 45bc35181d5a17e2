//! Minimal HTTP serving framework: pattern routing and expiring sessions.
//!
//! Applications register handlers on a [`routing::Router`] (exact,
//! parameterized `:name:type`, and trailing-wildcard patterns), then hand
//! it to an [`http::HttpServer`] which dispatches every request through
//! the engine and maintains per-client sessions in an expiring store.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod session;

pub use config::ServerConfig;
pub use http::{HttpServer, RequestContext};
pub use lifecycle::Shutdown;
pub use routing::{handler, Router, RouterConfig};
pub use session::SessionStore;
