//! Audit result caching.
//!
//! # Data Flow
//! ```text
//! orchestrator
//!     → get(target)  (hit: serve cached result, touch recency)
//!     → set(target)  (after a successful pipeline)
//! sweeper task
//!     → purge_expired() on a fixed interval
//! ```
//!
//! # Design Decisions
//! - One store per process, built at startup and shared by `Arc`
//! - Entries are replaced, never updated in place
//! - Failed audits are never cached

pub mod store;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time;

use crate::audit::target::AuditTarget;
use crate::audit::types::AuditResult;
use crate::config::CacheConfig;

pub use store::ExpiringLru;

/// Canonical target → last successful audit.
pub type ResultCache = ExpiringLru<AuditTarget, Arc<AuditResult>>;

/// Build the result cache described by `config`.
pub fn from_config(config: &CacheConfig) -> ResultCache {
    ExpiringLru::new(config.capacity, Duration::from_secs(config.ttl_secs))
}

/// Periodically drop expired results until shutdown is signalled.
pub fn spawn_sweeper(
    cache: Arc<ResultCache>,
    interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let purged = cache.purge_expired();
                    if purged > 0 {
                        tracing::debug!(purged, remaining = cache.len(), "Purged expired audit results");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Cache sweeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::types::{AxeSummary, Grade, SubScores};

    fn result(url: &str) -> Arc<AuditResult> {
        Arc::new(AuditResult {
            url: AuditTarget::parse(url).unwrap(),
            timestamp: chrono::Utc::now(),
            scores: SubScores::default(),
            header_checks: Vec::new(),
            axe: AxeSummary {
                violations: "0".into(),
                details: Vec::new(),
            },
            smart_score: 0,
            grade: Grade::D,
            label: "Poor".into(),
            penalties: 0,
            suggestions: Vec::new(),
            radar: Vec::new(),
        })
    }

    #[tokio::test]
    async fn test_sweeper_purges_and_stops() {
        let cache = Arc::new(ExpiringLru::new(10, Duration::from_millis(20)));
        let target = AuditTarget::parse("example.com").unwrap();
        cache.set(target, result("example.com"));

        let (tx, rx) = broadcast::channel(1);
        let handle = spawn_sweeper(cache.clone(), Duration::from_millis(10), rx);

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(cache.len(), 0);

        tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[test]
    fn test_from_config_uses_capacity_and_ttl() {
        let cache = from_config(&CacheConfig::default());
        assert_eq!(cache.capacity(), 200);
        assert_eq!(cache.ttl(), Duration::from_secs(900));
    }
}
