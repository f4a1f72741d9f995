//! Probe execution and status classification
//!
//! This module owns the health-check domain types, the single-probe
//! executor, the concurrent batch runner, and the pure summary reductions
//! consumed by the read APIs.

pub mod probe;
pub mod runner;
pub mod summary;
pub mod types;

pub use probe::ProbeExecutor;
pub use types::{CheckResult, HealthCheck, HealthStatus, HealthSummary, HttpMethod};
