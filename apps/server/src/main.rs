#![warn(clippy::all, clippy::pedantic)]

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt, Layer};
use vitals::store::{initialize_database, open_pool};
use vitals::{HealthEngine, LibsqlStore, ProbeExecutor, Store, DEFAULT_USER_AGENT};

use pharos_server::error::AppError;
use pharos_server::{routes, AppState};

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let listen = std::env::var("PHAROS_LISTEN").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let addr: SocketAddr = listen.parse()?;

    let state = build_state().await?;
    info!("Pharos API listening on {addr}");
    run_server(addr, state).await
}

async fn build_state() -> anyhow::Result<web::Data<AppState>> {
    let db_path = std::env::var("PHAROS_DB").unwrap_or_else(|_| "pharos.db".to_string());
    info!("Opening database at {db_path}");

    let pool = open_pool(&db_path).await?;
    let conn = pool.get().await?;
    initialize_database(&*conn).await?;
    drop(conn);

    let store: Arc<dyn Store> = Arc::new(LibsqlStore::new_from_pool(pool));
    let probes = ProbeExecutor::new(DEFAULT_USER_AGENT)?;
    let engine = Arc::new(HealthEngine::new(store.clone(), probes));

    Ok(web::Data::new(AppState { store, engine }))
}

async fn run_server(addr: SocketAddr, state: web::Data<AppState>) -> Result<(), AppError> {
    HttpServer::new(move || App::new().app_data(state.clone()).configure(routes::configure))
        .bind(addr)?
        .run()
        .await?;

    Ok(())
}

/// Initialize the tracing subscriber
///
/// RUST_LOG controls filtering; RUST_LOG_FORMAT=json switches to JSON
/// output.
fn init_tracing() {
    let env_filter =
        EnvFilter::builder().with_default_directive(LevelFilter::INFO.into()).from_env_lossy();

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_default();

    let log_layer = match log_format.as_str() {
        "json" => tracing_subscriber::fmt::layer().json().with_filter(env_filter).boxed(),
        _ => tracing_subscriber::fmt::layer()
            .compact()
            .without_time()
            .with_filter(env_filter)
            .boxed(),
    };

    tracing_subscriber::registry().with(log_layer).init();
}
