//! Sweep orchestration.
//!
//! One engine instance drives everything: probe every enabled check,
//! persist results, raise alerts on status transitions, roll statuses
//! up to linked projects, and keep the summary cache coherent.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::alerting::transitions::{self, Transition};
use crate::cache::{SummaryCache, SUMMARY_TTL};
use crate::health::probe::ProbeExecutor;
use crate::health::types::{CheckResult, HealthCheck, HealthSummary};
use crate::health::{runner, summary};
use crate::store::Store;

/// Health check engine
pub struct HealthEngine {
    store: Arc<dyn Store>,
    probes: ProbeExecutor,
    cache: SummaryCache,
}

impl HealthEngine {
    /// Create a new engine over a store and a probe executor
    pub fn new(store: Arc<dyn Store>, probes: ProbeExecutor) -> Self {
        Self {
            store,
            probes,
            cache: SummaryCache::new(SUMMARY_TTL),
        }
    }

    /// Run one full sweep over every enabled check
    ///
    /// A failing check never aborts the sweep. Only a failure before the
    /// per-check loop starts (listing checks, snapshotting prior results)
    /// aborts it, and that raises a single system alert.
    pub async fn run_batch(&self) -> Result<Vec<CheckResult>> {
        match self.run_batch_inner().await {
            Ok(results) => Ok(results),
            Err(error) => {
                let alert = transitions::system_alert(&error);
                if let Err(alert_error) = self.store.create_alert(&alert).await {
                    error!("Failed to record system alert: {:#}", alert_error);
                }
                Err(error)
            }
        }
    }

    async fn run_batch_inner(&self) -> Result<Vec<CheckResult>> {
        let checks = self.store.list_enabled_checks().await?;
        if checks.is_empty() {
            info!("No enabled health checks found");
            return Ok(Vec::new());
        }

        info!("Executing {} health checks", checks.len());
        let results = runner::run_all(&self.probes, &checks).await;

        // One snapshot of the previous latest result per check, taken
        // before any of this sweep's rows are saved. Every transition in
        // this sweep is detected against the same snapshot.
        let previous = self.store.latest_results().await?;

        let by_id: HashMap<Uuid, &HealthCheck> =
            checks.iter().map(|check| (check.id, check)).collect();

        for result in &results {
            let Some(check) = by_id.get(&result.check_id) else {
                continue;
            };

            if let Err(error) = self
                .process_result(check, result, previous.get(&result.check_id))
                .await
            {
                warn!(
                    "Failed to process result for check '{}': {:#}",
                    check.name, error
                );
            }
        }

        self.cache.invalidate().await;

        let totals = summary::summarize(&results);
        info!(
            "Health check complete: {} healthy, {} degraded, {} down",
            totals.healthy, totals.degraded, totals.down
        );

        Ok(results)
    }

    async fn process_result(
        &self,
        check: &HealthCheck,
        result: &CheckResult,
        previous: Option<&CheckResult>,
    ) -> Result<()> {
        // The result row is written whether or not alerting succeeds
        self.store.save_result(result).await?;

        match transitions::detect(previous, result) {
            Transition::Failed => {
                let alert = transitions::failure_alert(check, result);
                self.store.create_alert(&alert).await?;
                info!("Alert created: {} is {}", check.name, result.status);
            }
            Transition::Recovered => {
                let alert = transitions::recovery_alert(check, result);
                self.store.create_alert(&alert).await?;
                info!("Alert created: {} has recovered", check.name);
            }
            Transition::None => {}
        }

        if let Some(project_id) = check.project_id {
            self.store
                .update_project_status(project_id, result.status.into())
                .await?;
        }

        Ok(())
    }

    /// Probe a single check immediately, outside the scheduled sweep
    ///
    /// The result is persisted, but no alerting or project rollup runs;
    /// the next sweep picks those up.
    pub async fn trigger_check(&self, check: &HealthCheck) -> Result<CheckResult> {
        let result = self.probes.execute(check).await;
        self.store.save_result(&result).await?;
        self.cache.invalidate().await;

        Ok(result)
    }

    /// Aggregate summary over the latest result per check
    ///
    /// Served from cache when fresh; recomputed from the store otherwise.
    pub async fn status_summary(&self) -> Result<HealthSummary> {
        if let Some(cached) = self.cache.get().await {
            return Ok(cached);
        }

        let latest = self.store.latest_results().await?;
        let results: Vec<CheckResult> = latest.into_values().collect();
        let totals = summary::summarize(&results);
        self.cache.set(totals.clone()).await;

        Ok(totals)
    }
}
