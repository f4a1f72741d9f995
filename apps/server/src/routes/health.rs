//! Health check routes: the status summary, check CRUD, result
//! history and manual probes.

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use vitals::health::summary;
use vitals::validate::validate_check;
use vitals::{CheckResult, HealthCheck, HttpMethod};

use crate::error::ApiError;
use crate::response;
use crate::AppState;

/// History rows folded into a check detail response.
const DETAIL_HISTORY_LIMIT: usize = 50;
/// Default page size for the history endpoint.
const HISTORY_LIMIT: usize = 100;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/status", web::get().to(status))
        .route("/checks", web::get().to(list_checks))
        .route("/checks", web::post().to(create_check))
        .route("/checks/{id}", web::get().to(get_check))
        .route("/checks/{id}", web::put().to(update_check))
        .route("/checks/{id}", web::delete().to(delete_check))
        .route("/checks/{id}/history", web::get().to(check_history))
        .route("/checks/{id}/trigger", web::post().to(trigger_check));
}

/// A check joined with its most recent result, if any.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CheckWithLatest {
    #[serde(flatten)]
    pub check: HealthCheck,
    pub latest_result: Option<CheckResult>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckDetail {
    #[serde(flatten)]
    check: HealthCheck,
    history: Vec<CheckResult>,
    uptime: f64,
    average_response_time: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCheckRequest {
    name: Option<String>,
    url: Option<String>,
    project_id: Option<Uuid>,
    method: Option<HttpMethod>,
    expected_status: Option<u16>,
    timeout: Option<u64>,
    interval: Option<u64>,
    enabled: Option<bool>,
}

/// Partial update. `projectId` is double-wrapped so an explicit null
/// unlinks the project while an absent field leaves it alone.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateCheckRequest {
    name: Option<String>,
    url: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    project_id: Option<Option<Uuid>>,
    method: Option<HttpMethod>,
    expected_status: Option<u16>,
    timeout: Option<u64>,
    interval: Option<u64>,
    enabled: Option<bool>,
}

/// Maps an explicit JSON `null` to `Some(None)`, which a plain
/// `Option<Option<_>>` field cannot represent — serde's outer option
/// consumes the null first.
fn double_option<'de, D>(de: D) -> Result<Option<Option<Uuid>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Uuid>::deserialize(de).map(Some)
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    limit: Option<usize>,
}

async fn status(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let summary = state.engine.status_summary().await?;
    Ok(response::ok(summary))
}

async fn list_checks(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let checks = state.store.list_checks().await?;
    let mut latest = state.store.latest_results().await?;

    let items: Vec<CheckWithLatest> = checks
        .into_iter()
        .map(|check| {
            let latest_result = latest.remove(&check.id);
            CheckWithLatest {
                check,
                latest_result,
            }
        })
        .collect();

    Ok(response::ok(items))
}

async fn get_check(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let check = state
        .store
        .get_check(id)
        .await?
        .ok_or(ApiError::NotFound("Health check"))?;
    let history = state.store.result_history(id, DETAIL_HISTORY_LIMIT).await?;

    Ok(response::ok(CheckDetail {
        uptime: summary::uptime_percentage(&history),
        average_response_time: summary::average_response_time(&history),
        check,
        history,
    }))
}

async fn create_check(
    state: web::Data<AppState>,
    body: web::Json<CreateCheckRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let (Some(name), Some(url)) = (body.name, body.url) else {
        return Err(ApiError::Validation("Name and URL are required".to_string()));
    };

    let mut check = HealthCheck::new(name, url);
    check.project_id = body.project_id;
    if let Some(method) = body.method {
        check.method = method;
    }
    if let Some(expected_status) = body.expected_status {
        check.expected_status = expected_status;
    }
    if let Some(timeout) = body.timeout {
        check.timeout_ms = timeout;
    }
    if let Some(interval) = body.interval {
        check.interval_seconds = interval;
    }
    if let Some(enabled) = body.enabled {
        check.enabled = enabled;
    }

    validate_check(&check).map_err(|e| ApiError::Validation(e.to_string()))?;
    ensure_project_exists(&state, check.project_id).await?;

    state.store.create_check(&check).await?;
    Ok(response::created(check))
}

async fn update_check(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateCheckRequest>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let mut check = state
        .store
        .get_check(id)
        .await?
        .ok_or(ApiError::NotFound("Health check"))?;

    let body = body.into_inner();
    if let Some(name) = body.name {
        check.name = name;
    }
    if let Some(url) = body.url {
        check.url = url;
    }
    if let Some(project_id) = body.project_id {
        check.project_id = project_id;
    }
    if let Some(method) = body.method {
        check.method = method;
    }
    if let Some(expected_status) = body.expected_status {
        check.expected_status = expected_status;
    }
    if let Some(timeout) = body.timeout {
        check.timeout_ms = timeout;
    }
    if let Some(interval) = body.interval {
        check.interval_seconds = interval;
    }
    if let Some(enabled) = body.enabled {
        check.enabled = enabled;
    }
    check.updated_at = Utc::now();

    validate_check(&check).map_err(|e| ApiError::Validation(e.to_string()))?;
    ensure_project_exists(&state, check.project_id).await?;

    state.store.update_check(&check).await?;
    Ok(response::ok(check))
}

async fn delete_check(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    if state.store.get_check(id).await?.is_none() {
        return Err(ApiError::NotFound("Health check"));
    }

    state.store.delete_check(id).await?;
    Ok(response::ok(serde_json::json!({ "deleted": true })))
}

async fn check_history(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<HistoryQuery>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    if state.store.get_check(id).await?.is_none() {
        return Err(ApiError::NotFound("Health check"));
    }

    let limit = query.limit.unwrap_or(HISTORY_LIMIT);
    let history = state.store.result_history(id, limit).await?;
    Ok(response::ok(history))
}

/// Runs the probe right away and stores the outcome. Alerting stays
/// with the scheduled sweep.
async fn trigger_check(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let check = state
        .store
        .get_check(id)
        .await?
        .ok_or(ApiError::NotFound("Health check"))?;

    let result = state.engine.trigger_check(&check).await?;
    Ok(response::ok(result))
}

async fn ensure_project_exists(
    state: &web::Data<AppState>,
    project_id: Option<Uuid>,
) -> Result<(), ApiError> {
    if let Some(project_id) = project_id {
        if state.store.get_project(project_id).await?.is_none() {
            return Err(ApiError::Validation("Unknown project".to_string()));
        }
    }

    Ok(())
}
