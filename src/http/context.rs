//! Per-request context handed to route handlers.

use axum::body::Bytes;
use axum::http::{HeaderMap, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::routing::Params;
use crate::session::SessionStore;

/// Session state resolved for this request.
///
/// `data` is a snapshot taken at dispatch; call [`SessionCtx::save`] to
/// write modifications back to the store.
#[derive(Clone)]
pub struct SessionCtx {
    /// The session token, as carried in the client cookie.
    pub key: String,
    /// The session payload at dispatch time.
    pub data: Value,
    store: SessionStore<Value>,
}

impl SessionCtx {
    pub(crate) fn new(key: String, data: Value, store: SessionStore<Value>) -> Self {
        Self { key, data, store }
    }

    /// Persist the (possibly modified) payload. Writing does not refresh
    /// the entry's clock; the dispatch-time read already did.
    pub fn save(&self) {
        let snapshot = self.data.clone();
        let updated = self.store.update(&self.key, |v| *v = snapshot.clone());
        if !updated {
            // Entry was swept mid-request; re-insert under the same token.
            self.store.insert(&self.key, self.data.clone());
        }
    }

    /// Drop this session from the store (logout).
    pub fn destroy(&self) -> bool {
        self.store.remove(&self.key)
    }
}

/// Everything a handler gets about the request it is serving.
pub struct RequestContext {
    pub method: Method,
    /// Decoded request path, without the query string.
    pub path: String,
    /// Raw query string, if any.
    pub query: Option<String>,
    pub headers: HeaderMap,
    /// Buffered request body.
    pub body: Bytes,
    /// Parameters extracted by the route match.
    pub params: Params,
    /// Correlation ID for this request, also present in the access log.
    pub trace_id: String,
    /// Session, when the matched route requires one.
    pub session: Option<SessionCtx>,
}

impl RequestContext {
    /// Parse the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Parse the body as `application/x-www-form-urlencoded` pairs.
    pub fn form(&self) -> Vec<(String, String)> {
        url::form_urlencoded::parse(&self.body)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    /// Parse the query string into pairs.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        match &self.query {
            Some(q) => url::form_urlencoded::parse(q.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
            None => Vec::new(),
        }
    }
}
