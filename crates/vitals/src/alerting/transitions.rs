use serde_json::json;

use super::types::{AlertKind, AlertSeverity, NewAlert};
use crate::health::types::{CheckResult, HealthCheck, HealthStatus};

/// Change in healthy/unhealthy classification between two consecutive
/// results for the same check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Was healthy (or at the healthy baseline), now unhealthy
    Failed,
    /// Was unhealthy, now healthy
    Recovered,
    /// No change in classification, even if the specific status moved
    /// (degraded to down and back stays silent)
    None,
}

/// Classify the transition between the previous latest result and the new
/// one
///
/// A check with no history yet establishes its baseline without alerting
/// in either direction; the first stored result makes the next run's
/// comparison meaningful.
pub fn detect(previous: Option<&CheckResult>, current: &CheckResult) -> Transition {
    let Some(previous) = previous else {
        return Transition::None;
    };

    let was_healthy = previous.status == HealthStatus::Healthy;
    let is_healthy = current.status == HealthStatus::Healthy;

    match (was_healthy, is_healthy) {
        (true, false) => Transition::Failed,
        (false, true) => Transition::Recovered,
        _ => Transition::None,
    }
}

/// Alert for a check that left the healthy state
///
/// Critical when the endpoint is down, warning for degraded or unknown.
pub fn failure_alert(check: &HealthCheck, result: &CheckResult) -> NewAlert {
    let severity = if result.status == HealthStatus::Down {
        AlertSeverity::Critical
    } else {
        AlertSeverity::Warning
    };

    let message = match &result.error {
        Some(error) => error.clone(),
        None => format!(
            "Status code: {}, Response time: {}ms",
            fmt_opt(result.status_code),
            fmt_opt(result.response_time_ms)
        ),
    };

    NewAlert {
        kind: AlertKind::HealthCheckFailed,
        severity,
        title: format!("{} is {}", check.name, result.status),
        message,
        source: check.url.clone(),
        metadata: Some(json!({
            "checkId": check.id,
            "status": result.status,
            "responseTime": result.response_time_ms,
            "statusCode": result.status_code,
        })),
    }
}

/// Alert for a check that returned to the healthy state
pub fn recovery_alert(check: &HealthCheck, result: &CheckResult) -> NewAlert {
    NewAlert {
        kind: AlertKind::HealthCheckRecovered,
        severity: AlertSeverity::Info,
        title: format!("{} has recovered", check.name),
        message: format!("Response time: {}ms", fmt_opt(result.response_time_ms)),
        source: check.url.clone(),
        metadata: Some(json!({
            "checkId": check.id,
            "status": result.status,
            "responseTime": result.response_time_ms,
        })),
    }
}

/// Single critical alert for a sweep that failed before per-check
/// processing
pub fn system_alert(error: &anyhow::Error) -> NewAlert {
    NewAlert {
        kind: AlertKind::System,
        severity: AlertSeverity::Critical,
        title: "Health check system error".to_string(),
        message: format!("{error:#}"),
        source: "scheduler/health-sweep".to_string(),
        metadata: None,
    }
}

fn fmt_opt<T: std::fmt::Display>(value: Option<T>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "none".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn result_with(status: HealthStatus) -> CheckResult {
        let mut result = CheckResult::new(Uuid::new_v4());
        result.status = status;
        result
    }

    #[test]
    fn test_healthy_to_down_fails() {
        let previous = result_with(HealthStatus::Healthy);
        let current = result_with(HealthStatus::Down);
        assert_eq!(detect(Some(&previous), &current), Transition::Failed);
    }

    #[test]
    fn test_healthy_to_degraded_fails() {
        let previous = result_with(HealthStatus::Healthy);
        let current = result_with(HealthStatus::Degraded);
        assert_eq!(detect(Some(&previous), &current), Transition::Failed);
    }

    #[test]
    fn test_down_to_healthy_recovers() {
        let previous = result_with(HealthStatus::Down);
        let current = result_with(HealthStatus::Healthy);
        assert_eq!(detect(Some(&previous), &current), Transition::Recovered);
    }

    #[test]
    fn test_healthy_to_healthy_is_silent() {
        let previous = result_with(HealthStatus::Healthy);
        let current = result_with(HealthStatus::Healthy);
        assert_eq!(detect(Some(&previous), &current), Transition::None);
    }

    #[test]
    fn test_unhealthy_flapping_is_silent() {
        // degraded -> down and down -> degraded both stay within the
        // unhealthy classification
        let degraded = result_with(HealthStatus::Degraded);
        let down = result_with(HealthStatus::Down);
        assert_eq!(detect(Some(&degraded), &down), Transition::None);
        assert_eq!(detect(Some(&down), &degraded), Transition::None);
    }

    #[test]
    fn test_first_result_never_alerts() {
        assert_eq!(detect(None, &result_with(HealthStatus::Down)), Transition::None);
        assert_eq!(detect(None, &result_with(HealthStatus::Healthy)), Transition::None);
        assert_eq!(detect(None, &result_with(HealthStatus::Degraded)), Transition::None);
    }

    #[test]
    fn test_unknown_previous_counts_as_unhealthy() {
        let previous = result_with(HealthStatus::Unknown);
        let current = result_with(HealthStatus::Healthy);
        assert_eq!(detect(Some(&previous), &current), Transition::Recovered);
    }

    #[test]
    fn test_failure_alert_for_down_is_critical() {
        let check = HealthCheck::new("api", "https://api.example.com/health");
        let result = CheckResult::new(check.id).failure(5000, "connection refused".to_string());

        let alert = failure_alert(&check, &result);
        assert_eq!(alert.kind, AlertKind::HealthCheckFailed);
        assert_eq!(alert.severity, AlertSeverity::Critical);
        assert_eq!(alert.title, "api is down");
        assert_eq!(alert.message, "connection refused");
        assert_eq!(alert.source, "https://api.example.com/health");

        let metadata = alert.metadata.unwrap();
        assert_eq!(metadata["checkId"], check.id.to_string());
        assert_eq!(metadata["status"], "down");
        assert!(metadata["statusCode"].is_null());
    }

    #[test]
    fn test_failure_alert_for_degraded_is_warning() {
        let check = HealthCheck::new("api", "https://api.example.com/health");
        let result = CheckResult::new(check.id).degraded(2300, 200);

        let alert = failure_alert(&check, &result);
        assert_eq!(alert.severity, AlertSeverity::Warning);
        assert_eq!(alert.title, "api is degraded");
        assert_eq!(alert.message, "Status code: 200, Response time: 2300ms");
    }

    #[test]
    fn test_recovery_alert() {
        let check = HealthCheck::new("api", "https://api.example.com/health");
        let result = CheckResult::new(check.id).healthy(180, 200);

        let alert = recovery_alert(&check, &result);
        assert_eq!(alert.kind, AlertKind::HealthCheckRecovered);
        assert_eq!(alert.severity, AlertSeverity::Info);
        assert_eq!(alert.title, "api has recovered");
        assert_eq!(alert.message, "Response time: 180ms");

        let metadata = alert.metadata.unwrap();
        assert_eq!(metadata["responseTime"], 180);
        assert!(metadata.get("statusCode").is_none());
    }

    #[test]
    fn test_system_alert() {
        let error = anyhow::anyhow!("store unreachable");
        let alert = system_alert(&error);
        assert_eq!(alert.kind, AlertKind::System);
        assert_eq!(alert.severity, AlertSeverity::Critical);
        assert_eq!(alert.title, "Health check system error");
        assert_eq!(alert.message, "store unreachable");
        assert!(alert.metadata.is_none());
    }
}
