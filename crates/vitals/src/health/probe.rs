use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::time::timeout;
use tracing::debug;

use super::types::{CheckResult, HealthCheck, HttpMethod};

/// Responses at or above this latency are classified as degraded
pub const DEGRADED_THRESHOLD_MS: u64 = 1000;

/// Executes individual health-check probes
///
/// One bounded HTTP request per check. Classification is deterministic and
/// never retries; every failure path is captured into the returned result
/// rather than surfaced as an error.
pub struct ProbeExecutor {
    client: reqwest::Client,
}

impl ProbeExecutor {
    /// Create a probe executor with the given identifying user agent
    ///
    /// The client carries no timeout of its own; each probe is bounded by
    /// the check's `timeout_ms`.
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }

    /// Execute one probe and classify the outcome
    ///
    /// - request error or timeout: down, with the error message and no
    ///   status code
    /// - status code other than `expected_status`: down, with the code and
    ///   no error
    /// - expected status code: healthy under the latency threshold,
    ///   degraded at or above it (latency alone never yields down)
    pub async fn execute(&self, check: &HealthCheck) -> CheckResult {
        debug!("Probing {} {}", check.method, check.url);

        let request = match check.method {
            HttpMethod::Get => self.client.get(&check.url),
            HttpMethod::Post => self.client.post(&check.url),
            HttpMethod::Head => self.client.head(&check.url),
        };

        let start = Instant::now();
        let outcome = timeout(Duration::from_millis(check.timeout_ms), request.send()).await;
        let elapsed = start.elapsed().as_millis() as u64;

        let result = CheckResult::new(check.id);
        match outcome {
            Ok(Ok(response)) => {
                let status_code = response.status().as_u16();
                if status_code != check.expected_status {
                    result.unexpected_status(elapsed, status_code)
                } else if elapsed < DEGRADED_THRESHOLD_MS {
                    result.healthy(elapsed, status_code)
                } else {
                    result.degraded(elapsed, status_code)
                }
            }
            Ok(Err(error)) => result.failure(elapsed, error.to_string()),
            Err(_) => {
                result.failure(elapsed, format!("Request timed out after {}ms", check.timeout_ms))
            }
        }
    }
}
