//! In-memory cache for the aggregate health summary.
//!
//! Single well-known key with a short TTL. The engine invalidates the
//! entry after every sweep so reads reflect new results immediately
//! instead of waiting out the TTL.

use std::time::Duration;

use moka::future::Cache;

use crate::health::types::HealthSummary;

/// Key under which the aggregate summary lives
const SUMMARY_KEY: &str = "health:status";

/// How long a computed summary stays fresh without a sweep
pub const SUMMARY_TTL: Duration = Duration::from_secs(60);

/// TTL cache holding the most recently computed [`HealthSummary`]
pub struct SummaryCache {
    inner: Cache<String, HealthSummary>,
}

impl SummaryCache {
    /// Create a cache whose entry expires after `ttl`
    pub fn new(ttl: Duration) -> Self {
        let inner = Cache::builder().max_capacity(2).time_to_live(ttl).build();

        Self { inner }
    }

    /// Get the cached summary, if still fresh
    pub async fn get(&self) -> Option<HealthSummary> {
        self.inner.get(SUMMARY_KEY).await
    }

    /// Replace the cached summary
    pub async fn set(&self, summary: HealthSummary) {
        self.inner.insert(SUMMARY_KEY.to_string(), summary).await;
    }

    /// Drop the cached summary so the next read recomputes it
    pub async fn invalidate(&self) {
        self.inner.invalidate(SUMMARY_KEY).await;
    }
}

impl Default for SummaryCache {
    fn default() -> Self {
        Self::new(SUMMARY_TTL)
    }
}
