use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use chrono::{SecondsFormat, Utc};

use crate::response;

pub mod alerts;
pub mod health;
pub mod projects;

/// Wires every route and the extractor error handlers into the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .app_data(query_config())
        .route("/", web::get().to(index))
        .service(web::scope("/api/health").configure(health::configure))
        .service(web::scope("/api/alerts").configure(alerts::configure))
        .service(web::scope("/api/projects").configure(projects::configure))
        .default_service(web::route().to(not_found));
}

/// Service metadata, also doubles as a liveness probe for the API itself.
async fn index() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "name": "Pharos API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

async fn not_found() -> HttpResponse {
    response::fail(StatusCode::NOT_FOUND, "Not found")
}

// Extractor failures bypass ResponseError, so each config maps them
// back into the envelope by hand.

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        actix_web::error::InternalError::from_response(
            err,
            response::fail(StatusCode::BAD_REQUEST, &message),
        )
        .into()
    })
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        actix_web::error::InternalError::from_response(
            err,
            response::fail(StatusCode::BAD_REQUEST, &message),
        )
        .into()
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        actix_web::error::InternalError::from_response(
            err,
            response::fail(StatusCode::BAD_REQUEST, &message),
        )
        .into()
    })
}
