use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Health classification of a monitored endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Down,
    Unknown,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Degraded => write!(f, "degraded"),
            HealthStatus::Down => write!(f, "down"),
            HealthStatus::Unknown => write!(f, "unknown"),
        }
    }
}

impl HealthStatus {
    /// Map a stored status string back to the enum; anything unrecognized
    /// counts as unknown
    pub fn parse(value: &str) -> Self {
        match value {
            "healthy" => HealthStatus::Healthy,
            "degraded" => HealthStatus::Degraded,
            "down" => HealthStatus::Down,
            _ => HealthStatus::Unknown,
        }
    }
}

/// HTTP method a check probes with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Head,
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
            HttpMethod::Head => write!(f, "HEAD"),
        }
    }
}

impl HttpMethod {
    pub fn parse(value: &str) -> Self {
        match value {
            "POST" => HttpMethod::Post,
            "HEAD" => HttpMethod::Head,
            _ => HttpMethod::Get,
        }
    }
}

/// A monitored endpoint definition
///
/// The engine only reads these; creation and mutation happen through the
/// API layer. `interval_seconds` is advisory - the actual polling cadence
/// is the scheduler's.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheck {
    pub id: Uuid,
    pub project_id: Option<Uuid>,
    pub name: String,
    pub url: String,
    pub method: HttpMethod,
    pub expected_status: u16,
    #[serde(rename = "timeout")]
    pub timeout_ms: u64,
    #[serde(rename = "interval")]
    pub interval_seconds: u64,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HealthCheck {
    /// Create a check with the default probe settings
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            project_id: None,
            name: name.into(),
            url: url.into(),
            method: HttpMethod::Get,
            expected_status: 200,
            timeout_ms: 10_000,
            interval_seconds: 300,
            enabled: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Outcome of one probe execution, append-only
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub id: Uuid,

    /// Check this result belongs to
    pub check_id: Uuid,

    pub status: HealthStatus,

    /// Wall-clock duration of the request in milliseconds
    #[serde(rename = "responseTime")]
    pub response_time_ms: Option<u64>,

    /// HTTP status code, absent when the request never completed
    pub status_code: Option<u16>,

    /// Failure description, absent when a response came back
    pub error: Option<String>,

    pub checked_at: DateTime<Utc>,
}

impl CheckResult {
    /// Create a new, unclassified result
    pub fn new(check_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            check_id,
            status: HealthStatus::Unknown,
            response_time_ms: None,
            status_code: None,
            error: None,
            checked_at: Utc::now(),
        }
    }

    /// Expected status code within the latency threshold
    pub fn healthy(mut self, response_time_ms: u64, status_code: u16) -> Self {
        self.status = HealthStatus::Healthy;
        self.response_time_ms = Some(response_time_ms);
        self.status_code = Some(status_code);
        self
    }

    /// Expected status code, but slow
    pub fn degraded(mut self, response_time_ms: u64, status_code: u16) -> Self {
        self.status = HealthStatus::Degraded;
        self.response_time_ms = Some(response_time_ms);
        self.status_code = Some(status_code);
        self
    }

    /// A response arrived with the wrong status code
    pub fn unexpected_status(mut self, response_time_ms: u64, status_code: u16) -> Self {
        self.status = HealthStatus::Down;
        self.response_time_ms = Some(response_time_ms);
        self.status_code = Some(status_code);
        self
    }

    /// The request failed or timed out before a response arrived
    pub fn failure(mut self, response_time_ms: u64, error: String) -> Self {
        self.status = HealthStatus::Down;
        self.response_time_ms = Some(response_time_ms);
        self.error = Some(error);
        self
    }
}

/// Aggregate counts over the latest result per check
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSummary {
    pub total_checks: usize,
    pub healthy: usize,
    pub degraded: usize,
    pub down: usize,
    pub unknown: usize,
    pub last_updated: DateTime<Utc>,
}

/// Dashboard project a check may be linked to
///
/// The engine only ever touches `status`; everything else belongs to the
/// API layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub url: Option<String>,
    pub health_url: Option<String>,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            kind: kind.into(),
            url: None,
            health_url: None,
            status: ProjectStatus::Unknown,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Project availability derived from its linked checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Online,
    Degraded,
    Offline,
    Unknown,
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectStatus::Online => write!(f, "online"),
            ProjectStatus::Degraded => write!(f, "degraded"),
            ProjectStatus::Offline => write!(f, "offline"),
            ProjectStatus::Unknown => write!(f, "unknown"),
        }
    }
}

impl ProjectStatus {
    pub fn parse(value: &str) -> Self {
        match value {
            "online" => ProjectStatus::Online,
            "degraded" => ProjectStatus::Degraded,
            "offline" => ProjectStatus::Offline,
            _ => ProjectStatus::Unknown,
        }
    }
}

impl From<HealthStatus> for ProjectStatus {
    fn from(status: HealthStatus) -> Self {
        match status {
            HealthStatus::Healthy => ProjectStatus::Online,
            HealthStatus::Degraded => ProjectStatus::Degraded,
            HealthStatus::Down | HealthStatus::Unknown => ProjectStatus::Offline,
        }
    }
}
