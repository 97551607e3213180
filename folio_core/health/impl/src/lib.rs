use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use folio_core_health_contracts::{HealthFeatureService, HealthStatus};
use folio_di::Build;
use folio_email_contracts::EmailService;
use folio_shared_contracts::time::TimeService;
use folio_utils::trace_instrument;
use tokio::sync::RwLock;
use tracing::error;

#[derive(Debug, Clone, Build)]
pub struct HealthFeatureServiceImpl<Time, Email> {
    time: Time,
    email: Email,
    config: HealthFeatureConfig,
    #[state]
    state: Arc<State>,
}

#[derive(Debug, Clone)]
pub struct HealthFeatureConfig {
    /// How long a computed status is reused before the transport is pinged
    /// again.
    pub cache_ttl: Duration,
    /// Upper bound for a single ping. Other callers wait on the cache lock
    /// while it runs.
    pub ping_timeout: Duration,
}

#[derive(Debug, Default)]
struct State {
    cache: RwLock<Option<CachedStatus>>,
}

#[derive(Debug)]
struct CachedStatus {
    status: HealthStatus,
    timestamp: DateTime<Utc>,
}

impl CachedStatus {
    fn fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now < self.timestamp + ttl
    }
}

impl<Time, Email> HealthFeatureService for HealthFeatureServiceImpl<Time, Email>
where
    Time: TimeService,
    Email: EmailService,
{
    #[trace_instrument(skip(self))]
    async fn get_status(&self) -> HealthStatus {
        let now = self.time.now();
        let ttl = self.config.cache_ttl;

        let cache_guard = self.state.cache.read().await;
        if let Some(cached) = cache_guard.as_ref().filter(|c| c.fresh(now, ttl)) {
            return cached.status;
        }
        drop(cache_guard);

        let mut cache_guard = self.state.cache.write().await;
        if let Some(cached) = cache_guard.as_ref().filter(|c| c.fresh(now, ttl)) {
            return cached.status;
        }

        let timeout = self.config.ping_timeout;
        let email = match tokio::time::timeout(timeout, self.email.ping()).await {
            Ok(result) => result
                .inspect_err(|err| error!("Failed to ping smtp server: {err}"))
                .is_ok(),
            Err(_) => {
                error!(?timeout, "Timed out pinging smtp server");
                false
            }
        };

        cache_guard
            .insert(CachedStatus {
                status: HealthStatus { email },
                timestamp: now,
            })
            .status
    }
}
