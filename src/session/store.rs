//! Expiring session store.
//!
//! # Responsibilities
//! - Map opaque tokens to per-client payloads with a shared TTL
//! - Mint tokens that are unique at issuance time
//! - Flag staleness lazily on reads; evict authoritatively on sweeps
//!
//! # Design Decisions
//! - Entries are never held in an "expired" state: expiry is computed at
//!   read time, removal happens on `remove` or `evict_expired`
//! - Missing or stale keys are communicated through return values, never
//!   through errors

use std::sync::Arc;
use std::time::{Duration, Instant};

use base64::engine::general_purpose::URL_SAFE_NO_PAD as BASE64;
use base64::Engine as _;
use dashmap::DashMap;
use rand::RngCore;

/// Token entropy: 24 random bytes, base64url-encoded to a 32-char token.
/// The URL-safe alphabet keeps tokens free of `+` and `/`, so they pass
/// through cookie headers without any escaping.
const TOKEN_BYTES: usize = 24;

#[derive(Debug, Clone)]
struct Entry<T> {
    item: T,
    last_touch: Instant,
}

/// Result of a [`SessionStore::get`].
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup<T> {
    pub value: T,
    /// Age exceeded the TTL at the moment of the read (computed before
    /// any touch). A best-effort early signal between sweeps; callers
    /// treat stale and absent identically.
    pub stale: bool,
}

/// Shared, concurrently readable session store.
///
/// Cloning is cheap; all clones observe the same entries.
pub struct SessionStore<T> {
    inner: Arc<DashMap<String, Entry<T>>>,
    ttl: Duration,
}

impl<T> Clone for SessionStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            ttl: self.ttl,
        }
    }
}

impl<T: Clone> SessionStore<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Entry lifetime; also the sweep period.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mint a token not currently present in the store.
    ///
    /// A collision is astronomically unlikely, but the presence check is
    /// required for the uniqueness-at-issuance contract.
    pub fn generate_key(&self) -> String {
        loop {
            let mut buf = [0u8; TOKEN_BYTES];
            rand::thread_rng().fill_bytes(&mut buf);
            let key = BASE64.encode(buf);
            if !self.inner.contains_key(&key) {
                return key;
            }
        }
    }

    /// Insert or overwrite an entry, resetting its clock.
    pub fn insert(&self, key: &str, item: T) {
        self.inner.insert(
            key.to_string(),
            Entry {
                item,
                last_touch: Instant::now(),
            },
        );
    }

    /// Mint a key and insert the payload under it.
    pub fn add(&self, item: T) -> String {
        let key = self.generate_key();
        self.insert(&key, item);
        key
    }

    /// Read an entry. Staleness is computed from the age before any
    /// refresh; with `touch` the clock is refreshed even for stale
    /// entries.
    pub fn get(&self, key: &str, touch: bool) -> Option<Lookup<T>> {
        let now = Instant::now();
        let mut entry = self.inner.get_mut(key)?;
        let stale = now.duration_since(entry.last_touch) > self.ttl;
        if touch {
            entry.last_touch = now;
        }
        Some(Lookup {
            value: entry.item.clone(),
            stale,
        })
    }

    /// Refresh an entry's clock without reading it. Returns whether the
    /// key was present.
    pub fn touch(&self, key: &str) -> bool {
        match self.inner.get_mut(key) {
            Some(mut entry) => {
                entry.last_touch = Instant::now();
                true
            }
            None => false,
        }
    }

    /// Mutate the payload in place without refreshing the clock.
    pub fn update<F>(&self, key: &str, f: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        match self.inner.get_mut(key) {
            Some(mut entry) => {
                f(&mut entry.item);
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, key: &str) -> bool {
        self.inner.remove(key).is_some()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn clear(&self) {
        self.inner.clear();
    }

    /// Remove every entry whose age is at least the TTL. Returns the
    /// number evicted. Every survivor satisfies `age < TTL` at the time
    /// the sweep completes.
    pub fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let ttl = self.ttl;
        // Counted inside the retain pass; a len() snapshot taken before
        // and after would race with concurrent inserts.
        let mut removed = 0;
        self.inner.retain(|_, entry| {
            if now.duration_since(entry.last_touch) < ttl {
                true
            } else {
                removed += 1;
                false
            }
        });
        removed
    }
}
