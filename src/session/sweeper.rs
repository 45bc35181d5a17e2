//! Periodic session eviction.
//!
//! # Responsibilities
//! - Run `evict_expired` once per TTL period
//! - Exit cleanly when the shutdown signal fires
//!
//! # Design Decisions
//! - An owned background task with an explicit handle, not a timer that
//!   re-arms itself out of reach of shutdown
//! - The sweep bounds memory independent of read traffic; the lazy stale
//!   flag on `get` is only a best-effort signal between sweeps

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time;

use crate::session::store::SessionStore;

/// Handle to the background sweep task.
pub struct Sweeper {
    handle: JoinHandle<()>,
}

impl Sweeper {
    /// Spawn the sweep loop for `store`, with period equal to the store's
    /// TTL. The task runs until `shutdown` fires.
    pub fn spawn<T>(store: SessionStore<T>, mut shutdown: broadcast::Receiver<()>) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        let period = store.ttl();
        let handle = tokio::spawn(async move {
            let mut ticker = time::interval(period);
            // The first tick completes immediately; consume it so the
            // first sweep happens one full period after startup.
            ticker.tick().await;

            tracing::debug!(period_ms = period.as_millis() as u64, "Session sweeper started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let evicted = store.evict_expired();
                        if evicted > 0 {
                            tracing::debug!(evicted, remaining = store.len(), "Session sweep");
                        }
                    }
                    _ = shutdown.recv() => {
                        tracing::debug!("Session sweeper received shutdown signal, exiting loop");
                        break;
                    }
                }
            }
        });
        Self { handle }
    }

    /// Wait for the task to exit after shutdown has been triggered.
    pub async fn join(self) {
        let _ = self.handle.await;
    }

    /// Stop the task immediately.
    pub fn abort(&self) {
        self.handle.abort();
    }
}
