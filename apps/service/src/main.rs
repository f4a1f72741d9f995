use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt, Layer};
use vitals::store::{initialize_database, open_pool, LibsqlStore};
use vitals::{HealthEngine, ProbeExecutor};

mod config;
mod scheduler;

use config::Config;
use scheduler::Scheduler;

#[derive(Parser, Debug)]
#[command(version, about = "Health-check sweep service for the Pharos dashboard")]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run a single sweep and exit
    #[arg(long)]
    once: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    show_config: bool,
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

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_config(cli.config.as_deref())?;

    if cli.show_config {
        println!("{config}");
        return Ok(());
    }

    info!("Opening database at {}", config.database.path);
    let pool = open_pool(&config.database.path).await?;
    let conn = pool.get().await?;
    initialize_database(&*conn).await.context("database migration failed")?;
    drop(conn);

    let store = Arc::new(LibsqlStore::new_from_pool(pool));
    let probes = ProbeExecutor::new(&config.probe.user_agent)?;
    let engine = Arc::new(HealthEngine::new(store, probes));

    if cli.once {
        engine.run_batch().await?;
        return Ok(());
    }

    info!("Starting sweep scheduler, interval {}s", config.scheduler.interval_seconds);
    let scheduler = Scheduler::new(engine, Duration::from_secs(config.scheduler.interval_seconds));
    let handle = scheduler.start();

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    handle.abort();

    Ok(())
}
