//! Validation for check definitions supplied through the API.
//!
//! Targets are internal services, so loopback and private addresses are
//! legitimate and deliberately not rejected.

use anyhow::{anyhow, Result};
use url::Url;

use crate::health::types::HealthCheck;

/// Validate a probe URL
pub fn validate_url(target: &str) -> Result<()> {
    let url = Url::parse(target).map_err(|e| anyhow!("Invalid URL: {}", e))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(anyhow!("Invalid scheme for health check: {}", other)),
    }

    if url.host_str().is_none() {
        return Err(anyhow!("URL has no host: {}", target));
    }

    Ok(())
}

/// Validate the expected HTTP status code
pub fn validate_expected_status(status: u16) -> Result<()> {
    if !(100..=599).contains(&status) {
        return Err(anyhow!(
            "Expected status out of range: {} (must be 100-599)",
            status
        ));
    }

    Ok(())
}

/// Validate a probe timeout
pub fn validate_timeout_ms(timeout_ms: u64) -> Result<()> {
    const MIN_TIMEOUT_MS: u64 = 1;
    const MAX_TIMEOUT_MS: u64 = 300_000; // 5 minutes

    if timeout_ms < MIN_TIMEOUT_MS {
        return Err(anyhow!(
            "Timeout too short: {}ms (minimum: {}ms)",
            timeout_ms,
            MIN_TIMEOUT_MS
        ));
    }

    if timeout_ms > MAX_TIMEOUT_MS {
        return Err(anyhow!(
            "Timeout too long: {}ms (maximum: {}ms)",
            timeout_ms,
            MAX_TIMEOUT_MS
        ));
    }

    Ok(())
}

/// Validate a check interval
pub fn validate_interval_seconds(interval_seconds: u64) -> Result<()> {
    const MIN_INTERVAL: u64 = 10; // 10 seconds
    const MAX_INTERVAL: u64 = 86400; // 24 hours

    if interval_seconds < MIN_INTERVAL {
        return Err(anyhow!(
            "Check interval too short: {} seconds (minimum: {})",
            interval_seconds,
            MIN_INTERVAL
        ));
    }

    if interval_seconds > MAX_INTERVAL {
        return Err(anyhow!(
            "Check interval too long: {} seconds (maximum: {})",
            interval_seconds,
            MAX_INTERVAL
        ));
    }

    Ok(())
}

/// Validate a full check definition
pub fn validate_check(check: &HealthCheck) -> Result<()> {
    if check.name.trim().is_empty() {
        return Err(anyhow!("Check name must not be empty"));
    }

    validate_url(&check.url)?;
    validate_expected_status(check.expected_status)?;
    validate_timeout_ms(check.timeout_ms)?;
    validate_interval_seconds(check.interval_seconds)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        // Valid, including internal addresses
        assert!(validate_url("https://example.com/health").is_ok());
        assert!(validate_url("http://10.0.3.17:8080/status").is_ok());
        assert!(validate_url("http://localhost:3000").is_ok());

        // Invalid
        assert!(validate_url("ftp://example.com").is_err());
        assert!(validate_url("not a url").is_err());
        assert!(validate_url("").is_err());
    }

    #[test]
    fn test_validate_expected_status() {
        assert!(validate_expected_status(200).is_ok());
        assert!(validate_expected_status(100).is_ok()); // Min
        assert!(validate_expected_status(599).is_ok()); // Max

        assert!(validate_expected_status(99).is_err());
        assert!(validate_expected_status(600).is_err());
        assert!(validate_expected_status(0).is_err());
    }

    #[test]
    fn test_validate_timeout_ms() {
        assert!(validate_timeout_ms(1).is_ok()); // Min
        assert!(validate_timeout_ms(10_000).is_ok()); // Normal
        assert!(validate_timeout_ms(300_000).is_ok()); // Max

        assert!(validate_timeout_ms(0).is_err());
        assert!(validate_timeout_ms(300_001).is_err());
    }

    #[test]
    fn test_validate_interval_seconds() {
        assert!(validate_interval_seconds(10).is_ok()); // Min
        assert!(validate_interval_seconds(300).is_ok()); // Normal
        assert!(validate_interval_seconds(86400).is_ok()); // Max

        assert!(validate_interval_seconds(5).is_err());
        assert!(validate_interval_seconds(100_000).is_err());
    }

    #[test]
    fn test_validate_check() {
        let mut check = HealthCheck::new("api", "https://api.internal/health");
        assert!(validate_check(&check).is_ok());

        check.name = "   ".to_string();
        assert!(validate_check(&check).is_err());

        check.name = "api".to_string();
        check.url = "gopher://api.internal".to_string();
        assert!(validate_check(&check).is_err());

        check.url = "https://api.internal/health".to_string();
        check.timeout_ms = 0;
        assert!(validate_check(&check).is_err());
    }
}
