//! Route table storage.
//!
//! # Responsibilities
//! - Hold registered routes partitioned by matching strategy
//! - Preserve registration order inside each parameterized bucket and the
//!   wildcard list (first structural match wins; a deliberate tie-break)
//!
//! # Design Decisions
//! - Typed lookup keys throughout: exact lookups are method → path,
//!   parameterized buckets are method → segment count. No concatenated
//!   string keys, so the partitions cannot collide with each other.

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::Method;

use crate::routing::pattern::{CompiledPattern, ParamPattern};
use crate::routing::router::Route;

/// Candidate entry in a parameterized bucket.
#[derive(Debug, Clone)]
pub(crate) struct ParamEntry {
    pub pattern: ParamPattern,
    pub route: Arc<Route>,
}

/// Wildcard entry, scanned in registration order.
#[derive(Debug, Clone)]
pub(crate) struct WildcardEntry {
    pub method: Method,
    /// `/`-prefixed literal prefix, e.g. `/static` for pattern `static/*`.
    pub prefix: String,
    pub route: Arc<Route>,
}

/// All registered routes, one partition per matching strategy.
#[derive(Debug, Default)]
pub(crate) struct RouteTable {
    exact: HashMap<Method, HashMap<String, Arc<Route>>>,
    parameterized: HashMap<Method, HashMap<usize, Vec<ParamEntry>>>,
    wildcards: Vec<WildcardEntry>,
}

impl RouteTable {
    /// Insert a compiled pattern under every declared method.
    pub fn insert(&mut self, compiled: &CompiledPattern, methods: &[Method], route: &Arc<Route>) {
        match compiled {
            CompiledPattern::Exact(path) => {
                for method in methods {
                    self.exact
                        .entry(method.clone())
                        .or_default()
                        .insert(path.clone(), Arc::clone(route));
                }
            }
            CompiledPattern::Parameterized(pattern) => {
                for method in methods {
                    self.parameterized
                        .entry(method.clone())
                        .or_default()
                        .entry(pattern.seg_count)
                        .or_default()
                        .push(ParamEntry {
                            pattern: pattern.clone(),
                            route: Arc::clone(route),
                        });
                }
            }
            CompiledPattern::Wildcard(pattern) => {
                for method in methods {
                    self.wildcards.push(WildcardEntry {
                        method: method.clone(),
                        prefix: format!("/{}", pattern.prefix),
                        route: Arc::clone(route),
                    });
                }
            }
        }
    }

    /// Exact partition lookup.
    pub fn exact(&self, method: &Method, path: &str) -> Option<&Arc<Route>> {
        self.exact.get(method)?.get(path)
    }

    /// Parameterized bucket for a method and segment count, in
    /// registration order.
    pub fn bucket(&self, method: &Method, seg_count: usize) -> Option<&[ParamEntry]> {
        Some(self.parameterized.get(method)?.get(&seg_count)?.as_slice())
    }

    /// All wildcard entries, in registration order.
    pub fn wildcards(&self) -> &[WildcardEntry] {
        &self.wildcards
    }

    /// Every distinct registered route, across all partitions.
    pub fn all_routes(&self) -> Vec<Arc<Route>> {
        let mut seen: Vec<Arc<Route>> = Vec::new();
        let mut push = |route: &Arc<Route>| {
            if !seen.iter().any(|r| Arc::ptr_eq(r, route)) {
                seen.push(Arc::clone(route));
            }
        };
        for by_path in self.exact.values() {
            for route in by_path.values() {
                push(route);
            }
        }
        for by_count in self.parameterized.values() {
            for bucket in by_count.values() {
                for entry in bucket {
                    push(&entry.route);
                }
            }
        }
        for entry in &self.wildcards {
            push(&entry.route);
        }
        seen
    }
}
