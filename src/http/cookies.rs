//! Cookie reading and Set-Cookie formatting.
//!
//! # Responsibilities
//! - Extract a named cookie from the request `Cookie` header
//! - Build `Set-Cookie` header values for the session bootstrap
//!
//! # Design Decisions
//! - Repeated `Set-Cookie` for the same name is left to the browser's
//!   last-one-wins behavior; no deduplication here

use axum::http::{header, HeaderMap};

/// Value of the cookie named `name` from the request headers, if any.
///
/// Values are percent-decoded; this is the inverse of the encoding
/// [`SetCookie::format`] applies, so any issued value reads back intact.
pub fn cookie_get(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in raw.split(';') {
        let part = part.trim();
        if let Some((k, v)) = part.split_once('=') {
            if k.trim() == name {
                let v = v.trim();
                return Some(
                    urlencoding::decode(v)
                        .map(|c| c.into_owned())
                        .unwrap_or_else(|_| v.to_string()),
                );
            }
        }
    }
    None
}

/// SameSite attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Builder for a `Set-Cookie` header value.
///
/// Defaults match the session bootstrap: `Path=/`, `HttpOnly`,
/// `SameSite=Strict`.
#[derive(Debug, Clone)]
pub struct SetCookie {
    name: String,
    value: String,
    path: Option<String>,
    domain: Option<String>,
    max_age: Option<u64>,
    secure: bool,
    http_only: bool,
    same_site: Option<SameSite>,
}

impl SetCookie {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            path: Some("/".to_string()),
            domain: None,
            max_age: None,
            secure: false,
            http_only: true,
            same_site: Some(SameSite::Strict),
        }
    }

    pub fn path(mut self, path: &str) -> Self {
        self.path = Some(path.to_string());
        self
    }

    pub fn domain(mut self, domain: &str) -> Self {
        self.domain = Some(domain.to_string());
        self
    }

    /// Lifetime in seconds.
    pub fn max_age(mut self, seconds: u64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    pub fn same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }

    /// Render the `Set-Cookie` header value.
    pub fn format(&self) -> String {
        let mut parts = vec![format!(
            "{}={}",
            self.name,
            urlencoding::encode(&self.value)
        )];
        if let Some(domain) = &self.domain {
            parts.push(format!("Domain={}", domain));
        }
        if let Some(path) = &self.path {
            parts.push(format!("Path={}", path));
        }
        if let Some(same_site) = &self.same_site {
            parts.push(format!("SameSite={}", same_site.as_str()));
        }
        if let Some(max_age) = self.max_age {
            parts.push(format!("Max-Age={}", max_age));
        }
        if self.secure {
            parts.push("Secure".to_string());
        }
        if self.http_only {
            parts.push("HttpOnly".to_string());
        }
        parts.join("; ")
    }

    /// Header value that deletes the named cookie.
    pub fn removal(name: &str) -> String {
        format!("{}=; Max-Age=0; Path=/", name)
    }
}
