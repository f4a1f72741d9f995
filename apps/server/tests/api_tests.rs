//! End-to-end API tests running the full route tree against a
//! temporary database, with probe traffic served by wiremock.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};
use uuid::Uuid;
use vitals::store::{initialize_database, open_pool};
use vitals::{
    AlertKind, AlertSeverity, HealthEngine, LibsqlStore, NewAlert, ProbeExecutor, Store,
    DEFAULT_USER_AGENT,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pharos_server::{routes, AppState};

/// Fresh state over a temp-dir database. The TempDir is returned so the
/// database file outlives the test body.
async fn test_state() -> (web::Data<AppState>, Arc<LibsqlStore>, TempDir) {
    let temp_dir = tempdir().unwrap();
    let db_path = temp_dir.path().join("test.db");

    let pool = open_pool(&db_path.to_string_lossy()).await.unwrap();
    let conn = pool.get().await.unwrap();
    initialize_database(&*conn).await.unwrap();
    drop(conn);

    let store = Arc::new(LibsqlStore::new_from_pool(pool));
    let engine = Arc::new(HealthEngine::new(
        store.clone(),
        ProbeExecutor::new(DEFAULT_USER_AGENT).unwrap(),
    ));
    let state = web::Data::new(AppState {
        store: store.clone(),
        engine,
    });

    (state, store, temp_dir)
}

async fn healthy_endpoint() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    server
}

#[actix_web::test]
async fn test_index_reports_service_metadata() {
    let (state, _store, _dir) = test_state().await;
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(routes::configure)).await;

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["name"], "Pharos API");
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].as_str().is_some());
}

#[actix_web::test]
async fn test_unknown_route_returns_envelope_404() {
    let (state, _store, _dir) = test_state().await;
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(routes::configure)).await;

    let req = test::TestRequest::get().uri("/api/nothing-here").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Not found");
}

#[actix_web::test]
async fn test_create_check_applies_defaults() {
    let (state, _store, _dir) = test_state().await;
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(routes::configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/health/checks")
        .set_json(json!({ "name": "api", "url": "http://api.internal/health" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    let data = &body["data"];
    assert_eq!(data["name"], "api");
    assert_eq!(data["method"], "GET");
    assert_eq!(data["expectedStatus"], 200);
    assert_eq!(data["timeout"], 10_000);
    assert_eq!(data["interval"], 300);
    assert_eq!(data["enabled"], true);
    assert!(data["projectId"].is_null());
    assert!(Uuid::parse_str(data["id"].as_str().unwrap()).is_ok());
}

#[actix_web::test]
async fn test_create_check_requires_name_and_url() {
    let (state, _store, _dir) = test_state().await;
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(routes::configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/health/checks")
        .set_json(json!({ "name": "api" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Name and URL are required");
}

#[actix_web::test]
async fn test_create_check_rejects_invalid_url() {
    let (state, _store, _dir) = test_state().await;
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(routes::configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/health/checks")
        .set_json(json!({ "name": "api", "url": "ftp://api.internal/health" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("Invalid scheme"));
}

#[actix_web::test]
async fn test_check_detail_includes_history_and_uptime() {
    let (state, _store, _dir) = test_state().await;
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(routes::configure)).await;
    let server = healthy_endpoint().await;

    let req = test::TestRequest::post()
        .uri("/api/health/checks")
        .set_json(json!({ "name": "api", "url": format!("{}/health", server.uri()) }))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/api/health/checks/{id}/trigger"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/health/checks/{id}"))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let data = &body["data"];
    assert_eq!(data["name"], "api");
    assert_eq!(data["history"].as_array().unwrap().len(), 1);
    assert_eq!(data["uptime"], 100.0);
    assert!(data["averageResponseTime"].as_u64().is_some());
}

#[actix_web::test]
async fn test_missing_check_returns_404() {
    let (state, _store, _dir) = test_state().await;
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(routes::configure)).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/health/checks/{}", Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Health check not found");
}

#[actix_web::test]
async fn test_update_check_changes_only_given_fields() {
    let (state, _store, _dir) = test_state().await;
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(routes::configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/projects")
        .set_json(json!({ "name": "pharos", "type": "service" }))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let project_id = body["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/api/health/checks")
        .set_json(json!({
            "name": "api",
            "url": "http://api.internal/health",
            "projectId": project_id,
        }))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["projectId"], project_id.as_str());

    // Rename only, everything else untouched
    let req = test::TestRequest::put()
        .uri(&format!("/api/health/checks/{id}"))
        .set_json(json!({ "name": "api v2" }))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["data"]["name"], "api v2");
    assert_eq!(body["data"]["url"], "http://api.internal/health");
    assert_eq!(body["data"]["projectId"], project_id.as_str());

    // Explicit null unlinks the project
    let req = test::TestRequest::put()
        .uri(&format!("/api/health/checks/{id}"))
        .set_json(json!({ "projectId": null }))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert!(body["data"]["projectId"].is_null());
    assert_eq!(body["data"]["name"], "api v2");
}

#[actix_web::test]
async fn test_check_rejects_unknown_project() {
    let (state, _store, _dir) = test_state().await;
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(routes::configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/health/checks")
        .set_json(json!({
            "name": "api",
            "url": "http://api.internal/health",
            "projectId": Uuid::new_v4(),
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Unknown project");
}

#[actix_web::test]
async fn test_delete_check_then_404() {
    let (state, _store, _dir) = test_state().await;
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(routes::configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/health/checks")
        .set_json(json!({ "name": "api", "url": "http://api.internal/health" }))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::delete()
        .uri(&format!("/api/health/checks/{id}"))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["data"]["deleted"], true);

    let req = test::TestRequest::get()
        .uri(&format!("/api/health/checks/{id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/health/checks/{id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_trigger_records_result_without_alerting() {
    let (state, store, _dir) = test_state().await;
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(routes::configure)).await;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let req = test::TestRequest::post()
        .uri("/api/health/checks")
        .set_json(json!({ "name": "api", "url": format!("{}/health", server.uri()) }))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/api/health/checks/{id}/trigger"))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["data"]["status"], "down");
    assert_eq!(body["data"]["statusCode"], 500);

    let alerts = store.list_alerts(10, false).await.unwrap();
    assert!(alerts.is_empty());
}

#[actix_web::test]
async fn test_history_endpoint_respects_limit() {
    let (state, _store, _dir) = test_state().await;
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(routes::configure)).await;
    let server = healthy_endpoint().await;

    let req = test::TestRequest::post()
        .uri("/api/health/checks")
        .set_json(json!({ "name": "api", "url": format!("{}/health", server.uri()) }))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    for _ in 0..3 {
        let req = test::TestRequest::post()
            .uri(&format!("/api/health/checks/{id}/trigger"))
            .to_request();
        test::call_service(&app, req).await;
    }

    let req = test::TestRequest::get()
        .uri(&format!("/api/health/checks/{id}/history?limit=2"))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn test_status_summary_counts_latest_results() {
    let (state, _store, _dir) = test_state().await;
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(routes::configure)).await;
    let server = healthy_endpoint().await;

    let req = test::TestRequest::post()
        .uri("/api/health/checks")
        .set_json(json!({ "name": "api", "url": format!("{}/health", server.uri()) }))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/api/health/checks/{id}/trigger"))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get().uri("/api/health/status").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let data = &body["data"];
    assert_eq!(data["totalChecks"], 1);
    assert_eq!(data["healthy"], 1);
    assert_eq!(data["down"], 0);
}

#[actix_web::test]
async fn test_alert_acknowledge_flow() {
    let (state, store, _dir) = test_state().await;
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(routes::configure)).await;

    let first = store
        .create_alert(&NewAlert {
            kind: AlertKind::System,
            severity: AlertSeverity::Warning,
            title: "disk filling up".to_string(),
            message: "83% used".to_string(),
            source: "tests".to_string(),
            metadata: None,
        })
        .await
        .unwrap();
    store
        .create_alert(&NewAlert {
            kind: AlertKind::System,
            severity: AlertSeverity::Warning,
            title: "cert expiring".to_string(),
            message: "12 days left".to_string(),
            source: "tests".to_string(),
            metadata: None,
        })
        .await
        .unwrap();

    let req = test::TestRequest::get().uri("/api/alerts").to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let req = test::TestRequest::get()
        .uri("/api/alerts/unacknowledged/count")
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["data"]["count"], 2);
    assert_eq!(body["data"]["warning"], 2);
    assert_eq!(body["data"]["critical"], 0);

    let req = test::TestRequest::post()
        .uri(&format!("/api/alerts/{}/acknowledge", first.id))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["data"]["acknowledged"], true);

    let req = test::TestRequest::get()
        .uri("/api/alerts/unacknowledged/count")
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["data"]["count"], 1);

    let req = test::TestRequest::post()
        .uri("/api/alerts/acknowledge-all")
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["data"]["acknowledged"], 1);

    let req = test::TestRequest::get()
        .uri("/api/alerts?unacknowledged=true")
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_missing_alert_returns_404() {
    let (state, _store, _dir) = test_state().await;
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(routes::configure)).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/alerts/{}", Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Alert not found");
}

#[actix_web::test]
async fn test_project_live_status_aggregation() {
    let (state, _store, _dir) = test_state().await;
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(routes::configure)).await;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/good"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/bad"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let req = test::TestRequest::post()
        .uri("/api/projects")
        .set_json(json!({ "name": "pharos", "type": "service" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let project_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["status"], "unknown");

    for (name, endpoint) in [("good", "/good"), ("bad", "/bad")] {
        let req = test::TestRequest::post()
            .uri("/api/health/checks")
            .set_json(json!({
                "name": name,
                "url": format!("{}{}", server.uri(), endpoint),
                "projectId": project_id,
            }))
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri(&format!("/api/health/checks/{id}/trigger"))
            .to_request();
        test::call_service(&app, req).await;
    }

    // One check down drags the whole project offline
    let req = test::TestRequest::get().uri("/api/projects").to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["status"], "offline");
    assert_eq!(items[0]["healthChecks"], 2);

    let req = test::TestRequest::get()
        .uri(&format!("/api/projects/{project_id}"))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let checks = body["data"]["checks"].as_array().unwrap();
    assert_eq!(checks.len(), 2);
    assert!(checks.iter().all(|check| !check["latestResult"].is_null()));
}

#[actix_web::test]
async fn test_project_with_unrun_checks_keeps_stored_status() {
    let (state, _store, _dir) = test_state().await;
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(routes::configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/projects")
        .set_json(json!({ "name": "pharos", "type": "service" }))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let project_id = body["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/api/health/checks")
        .set_json(json!({
            "name": "api",
            "url": "http://api.internal/health",
            "projectId": project_id,
        }))
        .to_request();
    test::call_service(&app, req).await;

    // The check exists but has never run, so no live override applies
    let req = test::TestRequest::get().uri("/api/projects").to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["status"], "unknown");
    assert_eq!(items[0]["healthChecks"], 1);
}

#[actix_web::test]
async fn test_create_project_requires_name_and_type() {
    let (state, _store, _dir) = test_state().await;
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(routes::configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/projects")
        .set_json(json!({ "name": "pharos" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Name and type are required");
}

#[actix_web::test]
async fn test_malformed_json_gets_envelope_400() {
    let (state, _store, _dir) = test_state().await;
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(routes::configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/health/checks")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"name\":")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().is_some());
}

#[actix_web::test]
async fn test_invalid_uuid_path_gets_envelope_400() {
    let (state, _store, _dir) = test_state().await;
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(routes::configure)).await;

    let req = test::TestRequest::get()
        .uri("/api/health/checks/not-a-uuid")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
}
