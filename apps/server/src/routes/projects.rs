//! Project routes. List and detail views fold in the latest health
//! results so the dashboard shows live status, not the last rollup.

use std::collections::HashMap;

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vitals::{CheckResult, HealthCheck, HealthStatus, Project, ProjectStatus};

use super::health::CheckWithLatest;
use crate::error::ApiError;
use crate::response;
use crate::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(list_projects))
        .route("", web::post().to(create_project))
        .route("/{id}", web::get().to(get_project));
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectOverview {
    #[serde(flatten)]
    project: Project,
    health_checks: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectDetail {
    #[serde(flatten)]
    project: Project,
    checks: Vec<CheckWithLatest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateProjectRequest {
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    description: Option<String>,
    url: Option<String>,
    health_url: Option<String>,
}

async fn list_projects(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let projects = state.store.list_projects().await?;
    let checks = state.store.list_checks().await?;
    let latest = state.store.latest_results().await?;

    let mut by_project: HashMap<Uuid, Vec<&HealthCheck>> = HashMap::new();
    for check in &checks {
        if let Some(project_id) = check.project_id {
            by_project.entry(project_id).or_default().push(check);
        }
    }

    let items: Vec<ProjectOverview> = projects
        .into_iter()
        .map(|mut project| {
            let project_checks = by_project
                .get(&project.id)
                .map(Vec::as_slice)
                .unwrap_or_default();
            // Stored status stands until at least one check has a result
            if let Some(live) = live_status(project_checks, &latest) {
                project.status = live;
            }
            ProjectOverview {
                health_checks: project_checks.len(),
                project,
            }
        })
        .collect();

    Ok(response::ok(items))
}

/// Worst-of aggregation over the latest results of a project's checks.
/// None when no check has produced a result yet.
fn live_status(
    checks: &[&HealthCheck],
    latest: &HashMap<Uuid, CheckResult>,
) -> Option<ProjectStatus> {
    let mut status = None;
    for check in checks {
        match latest.get(&check.id).map(|result| result.status) {
            Some(HealthStatus::Down | HealthStatus::Unknown) => return Some(ProjectStatus::Offline),
            Some(HealthStatus::Degraded) => status = Some(ProjectStatus::Degraded),
            Some(HealthStatus::Healthy) => {
                if status.is_none() {
                    status = Some(ProjectStatus::Online);
                }
            }
            None => {}
        }
    }

    status
}

async fn get_project(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let project = state
        .store
        .get_project(id)
        .await?
        .ok_or(ApiError::NotFound("Project"))?;

    let checks = state.store.list_checks().await?;
    let mut latest = state.store.latest_results().await?;

    let checks: Vec<CheckWithLatest> = checks
        .into_iter()
        .filter(|check| check.project_id == Some(id))
        .map(|check| {
            let latest_result = latest.remove(&check.id);
            CheckWithLatest {
                check,
                latest_result,
            }
        })
        .collect();

    Ok(response::ok(ProjectDetail { project, checks }))
}

async fn create_project(
    state: web::Data<AppState>,
    body: web::Json<CreateProjectRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let (Some(name), Some(kind)) = (body.name, body.kind) else {
        return Err(ApiError::Validation("Name and type are required".to_string()));
    };

    let mut project = Project::new(name, kind);
    project.description = body.description;
    project.url = body.url;
    project.health_url = body.health_url;

    state.store.create_project(&project).await?;
    Ok(response::created(project))
}
