//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load config → Validate → Build router → Bind listener → Serve
//!
//! Shutdown:
//!     ctrl-c (or explicit trigger) → broadcast to subscribers
//!     → serve loop drains, sweeper exits → process exits
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
