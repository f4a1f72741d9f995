//! Persistence layer
//!
//! The engine talks to a `Store` trait; the shipped implementation is
//! libsql over a deadpool connection pool.

pub mod migrations;
pub mod pool;
pub mod repository;

pub use pool::{open_pool, LibsqlManager, LibsqlPool};
pub use repository::LibsqlStore;

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::alerting::types::{Alert, NewAlert};
use crate::health::types::{CheckResult, HealthCheck, Project, ProjectStatus};

/// Initialize database with schema
pub async fn initialize_database(conn: &libsql::Connection) -> Result<()> {
    migrations::run_migrations(conn).await
}

/// Store trait for abstracting persistence operations
#[async_trait]
pub trait Store: Send + Sync {
    /// Get all checks, ordered by name
    async fn list_checks(&self) -> Result<Vec<HealthCheck>>;

    /// Get the checks the scheduler should probe
    async fn list_enabled_checks(&self) -> Result<Vec<HealthCheck>>;

    /// Get a check by id
    async fn get_check(&self, id: Uuid) -> Result<Option<HealthCheck>>;

    /// Insert a new check
    async fn create_check(&self, check: &HealthCheck) -> Result<()>;

    /// Replace a check's definition
    async fn update_check(&self, check: &HealthCheck) -> Result<()>;

    /// Delete a check; its results go with it
    async fn delete_check(&self, id: Uuid) -> Result<()>;

    /// Append a probe result (never updated or deleted)
    async fn save_result(&self, result: &CheckResult) -> Result<()>;

    /// The most recent result per check, keyed by check id
    async fn latest_results(&self) -> Result<HashMap<Uuid, CheckResult>>;

    /// Recent results for one check, newest first
    async fn result_history(&self, check_id: Uuid, limit: usize) -> Result<Vec<CheckResult>>;

    /// Insert an alert and return the stored record
    async fn create_alert(&self, alert: &NewAlert) -> Result<Alert>;

    /// Get an alert by id
    async fn get_alert(&self, id: Uuid) -> Result<Option<Alert>>;

    /// Recent alerts, newest first
    async fn list_alerts(&self, limit: usize, unacknowledged_only: bool) -> Result<Vec<Alert>>;

    /// Mark one alert acknowledged; returns the updated record if it
    /// exists
    async fn acknowledge_alert(&self, id: Uuid) -> Result<Option<Alert>>;

    /// Mark every open alert acknowledged; returns how many were affected
    async fn acknowledge_all_alerts(&self) -> Result<usize>;

    /// Get all projects, ordered by name
    async fn list_projects(&self) -> Result<Vec<Project>>;

    /// Get a project by id
    async fn get_project(&self, id: Uuid) -> Result<Option<Project>>;

    /// Insert a new project
    async fn create_project(&self, project: &Project) -> Result<()>;

    /// Set a project's availability status
    async fn update_project_status(&self, id: Uuid, status: ProjectStatus) -> Result<()>;
}
