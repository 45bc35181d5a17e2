//! Expiring session store subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher (per request, when the route requires a session):
//!     cookie token → store.get(token, touch = false)
//!         present & fresh → touch + reuse
//!         absent or stale → generate_key + insert, Set-Cookie queued
//!
//! Background:
//!     sweeper task fires every TTL period → store.evict_expired()
//! ```
//!
//! # Design Decisions
//! - One shared TTL for every entry; also the sweep period
//! - Per-entry lifecycle: absent → live (insert) → live (touch) → absent
//!   (remove / sweep); "expired" is computed at read time, never stored

pub mod store;
pub mod sweeper;

pub use store::{Lookup, SessionStore};
pub use sweeper::Sweeper;
