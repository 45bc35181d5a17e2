//! Route registration and resolution.
//!
//! # Responsibilities
//! - Register routes by pattern + method set, partitioned by strategy
//! - Resolve an incoming (path, method) pair to a route and its parameters
//! - HEAD → GET fallback and configurable not-found route
//!
//! # Design Decisions
//! - Immutable after construction; shared via Arc, no locks at match time
//! - `resolve` returns a per-call `RouteMatch` carrying its own `Params`;
//!   no match state is ever written back onto the shared `Route`
//! - An unmatched request is a normal outcome (`None`), not an error

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::http::Method;
use axum::response::Response;

use crate::http::context::RequestContext;
use crate::routing::pattern::{self, RouterError};
use crate::routing::table::RouteTable;
use crate::routing::transform::{ParamValue, TransformerRegistry};

/// Parameter name carrying the remainder of a wildcard match.
pub const WILDCARD_PARAM: &str = "wildcard";

/// Router behavior switches.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Retry an unmatched HEAD request against the GET partition.
    pub check_head: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self { check_head: true }
    }
}

/// Parameters extracted from one successful match.
///
/// Built fresh per call and handed to the handler; two in-flight requests
/// against the same route never share parameter state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    items: Vec<(String, ParamValue)>,
}

impl Params {
    pub(crate) fn insert(&mut self, name: &str, value: ParamValue) {
        self.items.push((name.to_string(), value));
    }

    /// Look up a parameter by name.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.items.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Integer parameter, if present and parsed.
    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name)?.as_int()
    }

    /// Textual parameter, if present.
    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name)?.as_str()
    }

    /// Remainder of a wildcard match.
    pub fn wildcard(&self) -> Option<&str> {
        self.str(WILDCARD_PARAM)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.items.iter().map(|(n, v)| (n.as_str(), v))
    }
}

/// Future returned by a route handler.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// An application route handler.
pub type Handler = Arc<dyn Fn(RequestContext) -> HandlerFuture + Send + Sync>;

/// Wrap an async function as a [`Handler`].
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(move |ctx| Box::pin(f(ctx)))
}

/// Registration options beyond pattern + methods.
#[derive(Debug, Clone)]
pub struct RouteOptions {
    /// Whether the dispatcher resolves a session before running the
    /// handler. Static-resource routes typically turn this off.
    pub session: bool,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self { session: true }
    }
}

/// A registered route. Created once at registration, immutable thereafter.
pub struct Route {
    pattern: String,
    methods: Vec<Method>,
    session_required: bool,
    handler: Handler,
}

impl Route {
    /// The pattern this route was registered under.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// HTTP methods this route applies to.
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Whether the dispatcher should resolve a session for this route.
    pub fn session_required(&self) -> bool {
        self.session_required
    }

    /// The application handler.
    pub fn handler(&self) -> &Handler {
        &self.handler
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern)
            .field("methods", &self.methods)
            .field("session_required", &self.session_required)
            .finish_non_exhaustive()
    }
}

/// Result of one successful resolution.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: Arc<Route>,
    pub params: Params,
}

/// Summary of a registered route, for startup logging and introspection.
#[derive(Debug, Clone)]
pub struct RouteInfo {
    pub pattern: String,
    pub methods: Vec<Method>,
}

const ALL_METHODS: [Method; 7] = [
    Method::GET,
    Method::PUT,
    Method::POST,
    Method::PATCH,
    Method::DELETE,
    Method::HEAD,
    Method::OPTIONS,
];

/// The route-matching engine.
pub struct Router {
    config: RouterConfig,
    table: RouteTable,
    transformers: TransformerRegistry,
    not_found: Option<Arc<Route>>,
}

impl Router {
    pub fn new(config: RouterConfig) -> Self {
        Self {
            config,
            table: RouteTable::default(),
            transformers: TransformerRegistry::new(),
            not_found: None,
        }
    }

    /// Register a route for an explicit method list. Sessions default on;
    /// use [`Router::add_route_opts`] to change that.
    pub fn add_route(
        &mut self,
        pattern: &str,
        methods: &[Method],
        handler: Handler,
    ) -> Result<(), RouterError> {
        self.add_route_opts(pattern, methods, handler, RouteOptions::default())
    }

    /// Register a route with explicit options.
    pub fn add_route_opts(
        &mut self,
        pattern: &str,
        methods: &[Method],
        handler: Handler,
        options: RouteOptions,
    ) -> Result<(), RouterError> {
        let compiled = pattern::compile(pattern)?;
        let route = Arc::new(Route {
            pattern: pattern.to_string(),
            methods: methods.to_vec(),
            session_required: options.session,
            handler,
        });
        self.table.insert(&compiled, methods, &route);
        Ok(())
    }

    pub fn get(&mut self, pattern: &str, handler: Handler) -> Result<(), RouterError> {
        self.add_route(pattern, &[Method::GET], handler)
    }

    pub fn put(&mut self, pattern: &str, handler: Handler) -> Result<(), RouterError> {
        self.add_route(pattern, &[Method::PUT], handler)
    }

    pub fn patch(&mut self, pattern: &str, handler: Handler) -> Result<(), RouterError> {
        self.add_route(pattern, &[Method::PATCH], handler)
    }

    pub fn post(&mut self, pattern: &str, handler: Handler) -> Result<(), RouterError> {
        self.add_route(pattern, &[Method::POST], handler)
    }

    pub fn delete(&mut self, pattern: &str, handler: Handler) -> Result<(), RouterError> {
        self.add_route(pattern, &[Method::DELETE], handler)
    }

    pub fn head(&mut self, pattern: &str, handler: Handler) -> Result<(), RouterError> {
        self.add_route(pattern, &[Method::HEAD], handler)
    }

    pub fn options(&mut self, pattern: &str, handler: Handler) -> Result<(), RouterError> {
        self.add_route(pattern, &[Method::OPTIONS], handler)
    }

    /// Install the route returned when nothing else matches. Applies to
    /// every method and never triggers session resolution.
    pub fn set_not_found(&mut self, handler: Handler) {
        self.not_found = Some(Arc::new(Route {
            pattern: "404 - Not Found".to_string(),
            methods: ALL_METHODS.to_vec(),
            session_required: false,
            handler,
        }));
    }

    /// Register (or replace) a parameter transformer under a type tag.
    pub fn set_transformer<F>(&mut self, tag: &str, func: F)
    where
        F: Fn(&str) -> ParamValue + Send + Sync + 'static,
    {
        self.transformers.set(tag, func);
    }

    /// Remove a parameter transformer.
    pub fn remove_transformer(&mut self, tag: &str) -> bool {
        self.transformers.remove(tag)
    }

    /// Resolve a request path and method to a route plus extracted
    /// parameters.
    ///
    /// Resolution order: exact, parameterized (registration order within
    /// the bucket), wildcard (registration order), HEAD → GET retry when
    /// enabled, then the configured not-found route or `None`.
    pub fn resolve(&self, path: &str, method: &Method) -> Option<RouteMatch> {
        let path = pattern::normalize(path);

        if let Some(route) = self.table.exact(method, path) {
            return Some(RouteMatch {
                route: Arc::clone(route),
                params: Params::default(),
            });
        }

        if let Some(found) = self.resolve_parameterized(path, method) {
            return Some(found);
        }

        if let Some(found) = self.resolve_wildcard(path, method) {
            return Some(found);
        }

        if *method == Method::HEAD && self.config.check_head {
            if let Some(found) = self.resolve(path, &Method::GET) {
                return Some(found);
            }
        }

        self.not_found.as_ref().map(|route| RouteMatch {
            route: Arc::clone(route),
            params: Params::default(),
        })
    }

    fn resolve_parameterized(&self, path: &str, method: &Method) -> Option<RouteMatch> {
        let bucket = self.table.bucket(method, pattern::segment_count(path))?;
        let segments: Vec<&str> = path.split('/').collect();

        for entry in bucket {
            // An empty prefix matches every path; required for patterns
            // whose first segment is dynamic.
            if !path.starts_with(&entry.pattern.prefix) {
                continue;
            }

            let fixed_ok = entry
                .pattern
                .fixed
                .iter()
                .all(|f| segments.get(f.index).copied() == Some(f.literal.as_str()));
            if !fixed_ok {
                continue;
            }

            let mut params = Params::default();
            for dyn_seg in &entry.pattern.dynamic {
                let raw = segments.get(dyn_seg.index).copied().unwrap_or("");
                params.insert(&dyn_seg.name, self.transformers.apply(&dyn_seg.type_tag, raw));
            }
            return Some(RouteMatch {
                route: Arc::clone(&entry.route),
                params,
            });
        }
        None
    }

    fn resolve_wildcard(&self, path: &str, method: &Method) -> Option<RouteMatch> {
        let slashed = format!("/{}", path);
        for entry in self.table.wildcards() {
            if entry.method == *method && slashed.starts_with(&entry.prefix) {
                // Skip the prefix and its separator; a prefix-length path
                // yields an empty remainder.
                let remainder = path.get(entry.prefix.len()..).unwrap_or("");
                let mut params = Params::default();
                params.insert(WILDCARD_PARAM, ParamValue::Str(remainder.to_string()));
                return Some(RouteMatch {
                    route: Arc::clone(&entry.route),
                    params,
                });
            }
        }
        None
    }

    /// Summaries of every registered route.
    pub fn routes(&self) -> Vec<RouteInfo> {
        self.table
            .all_routes()
            .iter()
            .map(|route| RouteInfo {
                pattern: route.pattern().to_string(),
                methods: route.methods().to_vec(),
            })
            .collect()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(RouterConfig::default())
    }
}
