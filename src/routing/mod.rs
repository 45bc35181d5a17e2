//! Route-matching engine.
//!
//! # Data Flow
//! ```text
//! add_route(pattern, methods, handler)
//!     → pattern.rs (classify: exact | parameterized | wildcard, compile)
//!     → table.rs (insert into the partition for every method)
//!
//! resolve(path, method)
//!     → exact partition (verbatim normalized path)
//!     → parameterized bucket (method + segment count, registration order)
//!     → wildcard list (registration order)
//!     → HEAD retried as GET (configurable)
//!     → not-found route, or None
//! ```
//!
//! # Design Decisions
//! - First structural match wins inside a bucket; collisions between
//!   routes sharing method, segment count, and prefix are expected
//! - Matching never inspects the request beyond path and method

pub mod pattern;
pub mod router;
pub(crate) mod table;
pub mod transform;

pub use pattern::RouterError;
pub use router::{
    handler, Handler, Params, Route, RouteInfo, RouteMatch, RouteOptions, Router, RouterConfig,
    WILDCARD_PARAM,
};
pub use transform::{ParamValue, Transformer, TransformerRegistry};
