//! HTTP serving subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, catch-all dispatch)
//!     → routing engine (path + method → route + params)
//!     → cookies.rs / session store (bootstrap, when the route asks)
//!     → application handler (context.rs)
//!     → reply.rs helpers → response (+ queued Set-Cookie)
//! ```

pub mod context;
pub mod cookies;
pub mod reply;
pub mod server;

pub use context::{RequestContext, SessionCtx};
pub use cookies::{cookie_get, SameSite, SetCookie};
pub use server::{AppState, HttpServer};
