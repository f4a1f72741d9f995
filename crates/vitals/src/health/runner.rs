use futures::future::join_all;

use super::probe::ProbeExecutor;
use super::types::{CheckResult, HealthCheck};

/// Probe every enabled check concurrently and collect all results
///
/// Fan-out is unbounded; each probe is bounded by its own timeout, so the
/// batch settles within the slowest individual deadline. Results come
/// back in input order, though consumers correlate by `check_id`.
pub async fn run_all(probes: &ProbeExecutor, checks: &[HealthCheck]) -> Vec<CheckResult> {
    let futures = checks.iter().filter(|check| check.enabled).map(|check| probes.execute(check));

    join_all(futures).await
}
