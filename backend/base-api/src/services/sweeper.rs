//! Periodic cleanup of expired revocation entries.

use actix_middleware::RevocationStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Spawn the background sweep loop. Sweep failures are logged and the
/// loop keeps running; `is_revoked` stays correct without the sweep, so
/// a failed pass only delays space reclamation.
pub fn spawn_revocation_sweeper(
    store: Arc<dyn RevocationStore>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately; skip it so startup is quiet
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match store.sweep().await {
                Ok(removed) => {
                    tracing::info!(removed, "revocation sweep completed");
                }
                Err(err) => {
                    tracing::error!(error = %err, "revocation sweep failed");
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_middleware::token_revocation::UnavailableStore;
    use actix_middleware::InMemoryRevocationStore;
    use chrono::Utc;

    #[tokio::test]
    async fn sweeper_removes_expired_entries() {
        let store = Arc::new(InMemoryRevocationStore::new());
        store
            .revoke("stale", 1, Utc::now() - chrono::Duration::hours(1), None)
            .await
            .unwrap();
        store
            .revoke("live", 1, Utc::now() + chrono::Duration::hours(1), None)
            .await
            .unwrap();

        let handle = spawn_revocation_sweeper(store.clone(), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.abort();

        assert!(store.is_revoked("live").await.unwrap());
        assert!(!store.is_revoked("stale").await.unwrap());
    }

    #[tokio::test]
    async fn failed_sweep_cycles_do_not_kill_the_loop() {
        let store: Arc<dyn RevocationStore> = Arc::new(UnavailableStore);

        let handle = spawn_revocation_sweeper(store, Duration::from_millis(5));
        // Enough wall time for several cycles, every one of which errors
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(!handle.is_finished(), "sweep loop must outlive failed cycles");
        handle.abort();
    }
}
