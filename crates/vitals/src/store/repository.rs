use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use libsql::params;
use uuid::Uuid;

use crate::alerting::types::{Alert, AlertKind, AlertSeverity, NewAlert};
use crate::health::types::{
    CheckResult, HealthCheck, HealthStatus, HttpMethod, Project, ProjectStatus,
};
use crate::store::pool::{LibsqlManager, LibsqlPool};
use crate::store::Store;

/// LibSQL store implementation
pub struct LibsqlStore {
    pool: LibsqlPool,
}

impl LibsqlStore {
    /// Create a new store instance from a pool
    pub fn new_from_pool(pool: LibsqlPool) -> Self {
        Self { pool }
    }

    /// Get a connection from the pool
    async fn get_conn(&self) -> Result<deadpool::managed::Object<LibsqlManager>> {
        Ok(self.pool.get().await?)
    }
}

/// Timestamps are stored as RFC 3339 UTC strings with fixed millisecond
/// precision, so lexicographic comparison in SQL matches chronological
/// order. `MAX(checked_at)` depends on this.
fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_ts(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}

fn check_from_row(row: &libsql::Row) -> Result<HealthCheck> {
    let id: String = row.get(0)?;
    let project_id: Option<String> = row.get(1)?;
    let method: String = row.get(4)?;
    let created_at: String = row.get(9)?;
    let updated_at: String = row.get(10)?;

    Ok(HealthCheck {
        id: Uuid::parse_str(&id)?,
        project_id: project_id.map(|p| Uuid::parse_str(&p)).transpose()?,
        name: row.get(2)?,
        url: row.get(3)?,
        method: HttpMethod::parse(&method),
        expected_status: row.get::<i64>(5)? as u16,
        timeout_ms: row.get::<i64>(6)? as u64,
        interval_seconds: row.get::<i64>(7)? as u64,
        enabled: row.get::<i64>(8)? != 0,
        created_at: parse_ts(&created_at)?,
        updated_at: parse_ts(&updated_at)?,
    })
}

fn result_from_row(row: &libsql::Row) -> Result<CheckResult> {
    let id: String = row.get(0)?;
    let check_id: String = row.get(1)?;
    let status: String = row.get(2)?;
    let checked_at: String = row.get(6)?;

    Ok(CheckResult {
        id: Uuid::parse_str(&id)?,
        check_id: Uuid::parse_str(&check_id)?,
        status: HealthStatus::parse(&status),
        response_time_ms: row.get::<Option<i64>>(3)?.map(|v| v as u64),
        status_code: row.get::<Option<i64>>(4)?.map(|v| v as u16),
        error: row.get(5)?,
        checked_at: parse_ts(&checked_at)?,
    })
}

fn alert_from_row(row: &libsql::Row) -> Result<Alert> {
    let id: String = row.get(0)?;
    let kind: String = row.get(1)?;
    let severity: String = row.get(2)?;
    let metadata: Option<String> = row.get(6)?;
    let acknowledged_at: Option<String> = row.get(8)?;
    let created_at: String = row.get(9)?;

    Ok(Alert {
        id: Uuid::parse_str(&id)?,
        kind: AlertKind::parse(&kind),
        severity: AlertSeverity::parse(&severity),
        title: row.get(3)?,
        message: row.get(4)?,
        source: row.get(5)?,
        metadata: metadata.and_then(|m| serde_json::from_str(&m).ok()),
        acknowledged: row.get::<i64>(7)? != 0,
        acknowledged_at: acknowledged_at.map(|t| parse_ts(&t)).transpose()?,
        created_at: parse_ts(&created_at)?,
    })
}

fn project_from_row(row: &libsql::Row) -> Result<Project> {
    let id: String = row.get(0)?;
    let status: String = row.get(6)?;
    let created_at: String = row.get(7)?;
    let updated_at: String = row.get(8)?;

    Ok(Project {
        id: Uuid::parse_str(&id)?,
        name: row.get(1)?,
        description: row.get(2)?,
        kind: row.get(3)?,
        url: row.get(4)?,
        health_url: row.get(5)?,
        status: ProjectStatus::parse(&status),
        created_at: parse_ts(&created_at)?,
        updated_at: parse_ts(&updated_at)?,
    })
}

#[async_trait::async_trait]
impl Store for LibsqlStore {
    async fn list_checks(&self) -> Result<Vec<HealthCheck>> {
        let conn = self.get_conn().await?;
        let mut stmt = conn
            .prepare("SELECT id, project_id, name, url, method, expected_status, timeout, interval, enabled, created_at, updated_at FROM health_checks ORDER BY name")
            .await?;

        let mut rows = stmt.query(()).await?;
        let mut checks = Vec::new();

        while let Some(row) = rows.next().await? {
            checks.push(check_from_row(&row)?);
        }

        Ok(checks)
    }

    async fn list_enabled_checks(&self) -> Result<Vec<HealthCheck>> {
        let conn = self.get_conn().await?;
        let mut stmt = conn
            .prepare("SELECT id, project_id, name, url, method, expected_status, timeout, interval, enabled, created_at, updated_at FROM health_checks WHERE enabled = 1 ORDER BY name")
            .await?;

        let mut rows = stmt.query(()).await?;
        let mut checks = Vec::new();

        while let Some(row) = rows.next().await? {
            checks.push(check_from_row(&row)?);
        }

        Ok(checks)
    }

    async fn get_check(&self, id: Uuid) -> Result<Option<HealthCheck>> {
        let conn = self.get_conn().await?;
        let mut stmt = conn
            .prepare("SELECT id, project_id, name, url, method, expected_status, timeout, interval, enabled, created_at, updated_at FROM health_checks WHERE id = ?")
            .await?;

        let mut rows = stmt.query(params![id.to_string()]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(check_from_row(&row)?))
        } else {
            Ok(None)
        }
    }

    async fn create_check(&self, check: &HealthCheck) -> Result<()> {
        let conn = self.get_conn().await?;
        conn.execute(
            "INSERT INTO health_checks (id, project_id, name, url, method, expected_status, timeout, interval, enabled, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                check.id.to_string(),
                check.project_id.map(|p| p.to_string()),
                check.name.clone(),
                check.url.clone(),
                check.method.to_string(),
                check.expected_status as i64,
                check.timeout_ms as i64,
                check.interval_seconds as i64,
                if check.enabled { 1 } else { 0 },
                format_ts(check.created_at),
                format_ts(check.updated_at)
            ],
        )
        .await?;

        Ok(())
    }

    async fn update_check(&self, check: &HealthCheck) -> Result<()> {
        let conn = self.get_conn().await?;
        conn.execute(
            "UPDATE health_checks SET project_id = ?, name = ?, url = ?, method = ?, expected_status = ?, timeout = ?, interval = ?, enabled = ?, updated_at = ? WHERE id = ?",
            params![
                check.project_id.map(|p| p.to_string()),
                check.name.clone(),
                check.url.clone(),
                check.method.to_string(),
                check.expected_status as i64,
                check.timeout_ms as i64,
                check.interval_seconds as i64,
                if check.enabled { 1 } else { 0 },
                format_ts(check.updated_at),
                check.id.to_string()
            ],
        )
        .await?;

        Ok(())
    }

    async fn delete_check(&self, id: Uuid) -> Result<()> {
        let conn = self.get_conn().await?;

        // Results go with the check via ON DELETE CASCADE
        conn.execute(
            "DELETE FROM health_checks WHERE id = ?",
            params![id.to_string()],
        )
        .await?;

        Ok(())
    }

    async fn save_result(&self, result: &CheckResult) -> Result<()> {
        let conn = self.get_conn().await?;
        conn.execute(
            "INSERT INTO health_results (id, check_id, status, response_time, status_code, error, checked_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                result.id.to_string(),
                result.check_id.to_string(),
                result.status.to_string(),
                result.response_time_ms.map(|v| v as i64),
                result.status_code.map(|v| v as i64),
                result.error.clone(),
                format_ts(result.checked_at)
            ],
        )
        .await?;

        Ok(())
    }

    async fn latest_results(&self) -> Result<HashMap<Uuid, CheckResult>> {
        let conn = self.get_conn().await?;
        let mut stmt = conn
            .prepare(
                "SELECT r.id, r.check_id, r.status, r.response_time, r.status_code, r.error, r.checked_at \
                 FROM health_results r \
                 INNER JOIN (SELECT check_id, MAX(checked_at) AS max_checked_at FROM health_results GROUP BY check_id) latest \
                 ON r.check_id = latest.check_id AND r.checked_at = latest.max_checked_at",
            )
            .await?;

        let mut rows = stmt.query(()).await?;
        let mut latest = HashMap::new();

        while let Some(row) = rows.next().await? {
            let result = result_from_row(&row)?;
            latest.insert(result.check_id, result);
        }

        Ok(latest)
    }

    async fn result_history(&self, check_id: Uuid, limit: usize) -> Result<Vec<CheckResult>> {
        let conn = self.get_conn().await?;
        let mut stmt = conn
            .prepare("SELECT id, check_id, status, response_time, status_code, error, checked_at FROM health_results WHERE check_id = ? ORDER BY checked_at DESC LIMIT ?")
            .await?;

        let mut rows = stmt
            .query(params![check_id.to_string(), limit as i64])
            .await?;
        let mut results = Vec::new();

        while let Some(row) = rows.next().await? {
            results.push(result_from_row(&row)?);
        }

        Ok(results)
    }

    async fn create_alert(&self, alert: &NewAlert) -> Result<Alert> {
        let conn = self.get_conn().await?;
        let stored = Alert {
            id: Uuid::new_v4(),
            kind: alert.kind,
            severity: alert.severity,
            title: alert.title.clone(),
            message: alert.message.clone(),
            source: alert.source.clone(),
            metadata: alert.metadata.clone(),
            acknowledged: false,
            acknowledged_at: None,
            created_at: Utc::now(),
        };

        conn.execute(
            "INSERT INTO alerts (id, type, severity, title, message, source, metadata, acknowledged, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                stored.id.to_string(),
                stored.kind.to_string(),
                stored.severity.to_string(),
                stored.title.clone(),
                stored.message.clone(),
                stored.source.clone(),
                stored.metadata.as_ref().map(|m| m.to_string()),
                0,
                format_ts(stored.created_at)
            ],
        )
        .await?;

        Ok(stored)
    }

    async fn get_alert(&self, id: Uuid) -> Result<Option<Alert>> {
        let conn = self.get_conn().await?;
        let mut stmt = conn
            .prepare("SELECT id, type, severity, title, message, source, metadata, acknowledged, acknowledged_at, created_at FROM alerts WHERE id = ?")
            .await?;

        let mut rows = stmt.query(params![id.to_string()]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(alert_from_row(&row)?))
        } else {
            Ok(None)
        }
    }

    async fn list_alerts(&self, limit: usize, unacknowledged_only: bool) -> Result<Vec<Alert>> {
        let conn = self.get_conn().await?;
        let sql = if unacknowledged_only {
            "SELECT id, type, severity, title, message, source, metadata, acknowledged, acknowledged_at, created_at FROM alerts WHERE acknowledged = 0 ORDER BY created_at DESC LIMIT ?"
        } else {
            "SELECT id, type, severity, title, message, source, metadata, acknowledged, acknowledged_at, created_at FROM alerts ORDER BY created_at DESC LIMIT ?"
        };

        let mut stmt = conn.prepare(sql).await?;
        let mut rows = stmt.query(params![limit as i64]).await?;
        let mut alerts = Vec::new();

        while let Some(row) = rows.next().await? {
            alerts.push(alert_from_row(&row)?);
        }

        Ok(alerts)
    }

    async fn acknowledge_alert(&self, id: Uuid) -> Result<Option<Alert>> {
        let conn = self.get_conn().await?;
        let affected = conn
            .execute(
                "UPDATE alerts SET acknowledged = 1, acknowledged_at = ? WHERE id = ?",
                params![format_ts(Utc::now()), id.to_string()],
            )
            .await?;

        if affected == 0 {
            return Ok(None);
        }

        self.get_alert(id).await
    }

    async fn acknowledge_all_alerts(&self) -> Result<usize> {
        let conn = self.get_conn().await?;
        let affected = conn
            .execute(
                "UPDATE alerts SET acknowledged = 1, acknowledged_at = ? WHERE acknowledged = 0",
                params![format_ts(Utc::now())],
            )
            .await?;

        Ok(affected as usize)
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        let conn = self.get_conn().await?;
        let mut stmt = conn
            .prepare("SELECT id, name, description, type, url, health_url, status, created_at, updated_at FROM projects ORDER BY name")
            .await?;

        let mut rows = stmt.query(()).await?;
        let mut projects = Vec::new();

        while let Some(row) = rows.next().await? {
            projects.push(project_from_row(&row)?);
        }

        Ok(projects)
    }

    async fn get_project(&self, id: Uuid) -> Result<Option<Project>> {
        let conn = self.get_conn().await?;
        let mut stmt = conn
            .prepare("SELECT id, name, description, type, url, health_url, status, created_at, updated_at FROM projects WHERE id = ?")
            .await?;

        let mut rows = stmt.query(params![id.to_string()]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(project_from_row(&row)?))
        } else {
            Ok(None)
        }
    }

    async fn create_project(&self, project: &Project) -> Result<()> {
        let conn = self.get_conn().await?;
        conn.execute(
            "INSERT INTO projects (id, name, description, type, url, health_url, status, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                project.id.to_string(),
                project.name.clone(),
                project.description.clone(),
                project.kind.clone(),
                project.url.clone(),
                project.health_url.clone(),
                project.status.to_string(),
                format_ts(project.created_at),
                format_ts(project.updated_at)
            ],
        )
        .await?;

        Ok(())
    }

    async fn update_project_status(&self, id: Uuid, status: ProjectStatus) -> Result<()> {
        let conn = self.get_conn().await?;
        conn.execute(
            "UPDATE projects SET status = ?, updated_at = ? WHERE id = ?",
            params![
                status.to_string(),
                format_ts(Utc::now()),
                id.to_string()
            ],
        )
        .await?;

        Ok(())
    }
}
