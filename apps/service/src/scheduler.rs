use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::error;
use vitals::HealthEngine;

/// Periodic driver for the batch sweep
pub struct Scheduler {
    engine: Arc<HealthEngine>,
    interval: Duration,
}

impl Scheduler {
    /// Create a new scheduler over an engine
    pub fn new(engine: Arc<HealthEngine>, interval: Duration) -> Self {
        Self { engine, interval }
    }

    /// Start the sweep loop; the first sweep runs immediately
    pub fn start(&self) -> JoinHandle<()> {
        let engine = self.engine.clone();
        let period = self.interval;

        tokio::spawn(async move {
            let mut timer = interval(period);

            loop {
                timer.tick().await;

                // A failed sweep is logged and already recorded as a
                // system alert; the loop keeps going
                if let Err(e) = engine.run_batch().await {
                    error!("Health sweep failed: {:#}", e);
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use vitals::store::{initialize_database, open_pool, LibsqlStore, Store};
    use vitals::{HealthCheck, ProbeExecutor, DEFAULT_USER_AGENT};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_scheduler_sweeps_immediately_and_repeats() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let pool = open_pool(&db_path.to_string_lossy()).await.unwrap();
        let conn = pool.get().await.unwrap();
        initialize_database(&*conn).await.unwrap();
        drop(conn);
        let store = Arc::new(LibsqlStore::new_from_pool(pool));

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let check = HealthCheck::new("api", format!("{}/health", server.uri()));
        store.create_check(&check).await.unwrap();

        let engine = Arc::new(HealthEngine::new(
            store.clone(),
            ProbeExecutor::new(DEFAULT_USER_AGENT).unwrap(),
        ));
        let scheduler = Scheduler::new(engine, Duration::from_millis(50));
        let handle = scheduler.start();

        tokio::time::sleep(Duration::from_millis(180)).await;
        handle.abort();

        let history = store.result_history(check.id, 50).await.unwrap();
        assert!(
            history.len() >= 2,
            "expected repeated sweeps, got {}",
            history.len()
        );
    }
}
