//! Vitals - health-check execution and alerting engine for Pharos
//!
//! This library runs bounded-timeout HTTP probes against a registry of
//! monitored endpoints, classifies the outcomes, detects healthy/unhealthy
//! transitions against previously stored results, and records alerts and
//! project status updates through a pluggable store.

pub mod alerting;
pub mod cache;
pub mod engine;
pub mod health;
pub mod store;
pub mod validate;

// Re-export main types
pub use alerting::types::{Alert, AlertKind, AlertSeverity, NewAlert};
pub use cache::SummaryCache;
pub use engine::HealthEngine;
pub use health::probe::ProbeExecutor;
pub use health::types::{
    CheckResult, HealthCheck, HealthStatus, HealthSummary, HttpMethod, Project, ProjectStatus,
};
pub use store::{LibsqlStore, Store};

/// Re-export common error types
pub use anyhow;

/// Vitals result type using anyhow for error handling
pub type Result<T> = anyhow::Result<T>;

/// User agent sent with every probe request
pub const DEFAULT_USER_AGENT: &str = "Pharos-Dashboard-Health-Check";

/// Default scheduler cadence for the batch sweep, in seconds
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;
