//! Observability subsystem.
//!
//! One structured access-log event per request (emitted by the
//! dispatcher), plus component-level events, all through `tracing`.

pub mod logging;
