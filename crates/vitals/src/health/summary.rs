use chrono::Utc;

use super::types::{CheckResult, HealthStatus, HealthSummary};

/// Count results per status
///
/// Pure reduction over any result set, typically the latest result per
/// check. Stamped with the computation time.
pub fn summarize(results: &[CheckResult]) -> HealthSummary {
    let mut summary = HealthSummary {
        total_checks: results.len(),
        healthy: 0,
        degraded: 0,
        down: 0,
        unknown: 0,
        last_updated: Utc::now(),
    };

    for result in results {
        match result.status {
            HealthStatus::Healthy => summary.healthy += 1,
            HealthStatus::Degraded => summary.degraded += 1,
            HealthStatus::Down => summary.down += 1,
            HealthStatus::Unknown => summary.unknown += 1,
        }
    }

    summary
}

/// Uptime percentage over a result history, one decimal place
///
/// Healthy and degraded both count as reachable. An empty history reads as
/// fully up.
pub fn uptime_percentage(history: &[CheckResult]) -> f64 {
    if history.is_empty() {
        return 100.0;
    }

    let reachable = history
        .iter()
        .filter(|r| matches!(r.status, HealthStatus::Healthy | HealthStatus::Degraded))
        .count();

    ((reachable as f64 / history.len() as f64) * 100.0 * 10.0).round() / 10.0
}

/// Mean response time over the samples that have one, rounded to whole
/// milliseconds; zero when there are no samples
pub fn average_response_time(history: &[CheckResult]) -> u64 {
    let times: Vec<u64> = history.iter().filter_map(|r| r.response_time_ms).collect();
    if times.is_empty() {
        return 0;
    }

    (times.iter().sum::<u64>() as f64 / times.len() as f64).round() as u64
}
