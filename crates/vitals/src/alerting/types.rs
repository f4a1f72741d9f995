use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Cause tag of an alert
///
/// Health kinds are emitted by the transition detector; deploy and GitHub
/// kinds come from external collaborators writing into the same table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    HealthCheckFailed,
    HealthCheckRecovered,
    DeployTriggered,
    DeploySuccess,
    DeployFailure,
    GithubCiFailed,
    GithubIssueCreated,
    System,
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            AlertKind::HealthCheckFailed => "health_check_failed",
            AlertKind::HealthCheckRecovered => "health_check_recovered",
            AlertKind::DeployTriggered => "deploy_triggered",
            AlertKind::DeploySuccess => "deploy_success",
            AlertKind::DeployFailure => "deploy_failure",
            AlertKind::GithubCiFailed => "github_ci_failed",
            AlertKind::GithubIssueCreated => "github_issue_created",
            AlertKind::System => "system",
        };
        write!(f, "{tag}")
    }
}

impl AlertKind {
    /// Map a stored kind string back to the enum; anything unrecognized
    /// counts as a system alert
    pub fn parse(value: &str) -> Self {
        match value {
            "health_check_failed" => AlertKind::HealthCheckFailed,
            "health_check_recovered" => AlertKind::HealthCheckRecovered,
            "deploy_triggered" => AlertKind::DeployTriggered,
            "deploy_success" => AlertKind::DeploySuccess,
            "deploy_failure" => AlertKind::DeployFailure,
            "github_ci_failed" => AlertKind::GithubCiFailed,
            "github_issue_created" => AlertKind::GithubIssueCreated,
            _ => AlertKind::System,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertSeverity::Info => write!(f, "info"),
            AlertSeverity::Warning => write!(f, "warning"),
            AlertSeverity::Critical => write!(f, "critical"),
        }
    }
}

impl AlertSeverity {
    pub fn parse(value: &str) -> Self {
        match value {
            "warning" => AlertSeverity::Warning,
            "critical" => AlertSeverity::Critical,
            _ => AlertSeverity::Info,
        }
    }
}

/// A stored notification record
///
/// Creation is append-only; acknowledgement is the only permitted
/// mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,

    /// Free-form origin, typically the probed URL
    pub source: String,

    /// Opaque JSON payload attached by the emitter
    pub metadata: Option<serde_json::Value>,

    pub acknowledged: bool,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an alert; id and timestamps are assigned by the
/// store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAlert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
    pub source: String,
    pub metadata: Option<serde_json::Value>,
}
