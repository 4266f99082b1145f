//! Background purge of expired tokens.
//!
//! Validity never depends on the sweeper; expired tokens already fail
//! validation by timestamp. The sweep only reclaims storage.

use chrono::Utc;
use gatehouse_store::Store;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Periodic expired-token sweeper.
pub struct TokenSweeper {
    handle: JoinHandle<()>,
}

impl TokenSweeper {
    /// Spawn the sweep loop on the current tokio runtime.
    ///
    /// Store failures are logged and the loop keeps running; the next tick
    /// retries naturally.
    #[must_use]
    pub fn spawn(store: Arc<dyn Store>, interval: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick fires immediately; skip it so a fresh start
            // does not race test setup or boot-time migrations.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                match store.delete_expired(Utc::now()).await {
                    Ok(0) => {}
                    Ok(purged) => tracing::debug!(purged, "swept expired tokens"),
                    Err(err) => tracing::warn!(error = %err, "token sweep failed"),
                }
            }
        });

        Self { handle }
    }

    /// Stop the sweep loop.
    pub fn shutdown(self) {
        self.handle.abort();
    }
}

impl Drop for TokenSweeper {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
