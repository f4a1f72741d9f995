//! Alert routes: listing, acknowledgement and the unacknowledged
//! severity counts the dashboard badge polls.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;
use vitals::AlertSeverity;

use crate::error::ApiError;
use crate::response;
use crate::AppState;

/// Default page size for the alert list.
const LIST_LIMIT: usize = 50;
/// Upper bound when tallying unacknowledged alerts.
const COUNT_SCAN_LIMIT: usize = 1000;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(list_alerts))
        .route("/unacknowledged/count", web::get().to(unacknowledged_count))
        .route("/acknowledge-all", web::post().to(acknowledge_all))
        .route("/{id}", web::get().to(get_alert))
        .route("/{id}/acknowledge", web::post().to(acknowledge_alert));
}

#[derive(Debug, Deserialize)]
struct ListAlertsQuery {
    limit: Option<usize>,
    unacknowledged: Option<bool>,
}

async fn list_alerts(
    state: web::Data<AppState>,
    query: web::Query<ListAlertsQuery>,
) -> Result<HttpResponse, ApiError> {
    let limit = query.limit.unwrap_or(LIST_LIMIT);
    let unacknowledged_only = query.unacknowledged.unwrap_or(false);

    let alerts = state.store.list_alerts(limit, unacknowledged_only).await?;
    Ok(response::ok(alerts))
}

async fn unacknowledged_count(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let alerts = state.store.list_alerts(COUNT_SCAN_LIMIT, true).await?;

    let count_severity = |severity: AlertSeverity| {
        alerts
            .iter()
            .filter(|alert| alert.severity == severity)
            .count()
    };

    Ok(response::ok(serde_json::json!({
        "count": alerts.len(),
        "critical": count_severity(AlertSeverity::Critical),
        "warning": count_severity(AlertSeverity::Warning),
        "info": count_severity(AlertSeverity::Info),
    })))
}

async fn get_alert(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let alert = state
        .store
        .get_alert(path.into_inner())
        .await?
        .ok_or(ApiError::NotFound("Alert"))?;

    Ok(response::ok(alert))
}

async fn acknowledge_alert(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let alert = state
        .store
        .acknowledge_alert(path.into_inner())
        .await?
        .ok_or(ApiError::NotFound("Alert"))?;

    Ok(response::ok(alert))
}

async fn acknowledge_all(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let acknowledged = state.store.acknowledge_all_alerts().await?;
    Ok(response::ok(serde_json::json!({ "acknowledged": acknowledged })))
}
