//! HTTP API for the Pharos dashboard.
//!
//! Exposes the health check, alert and project state kept in [`vitals`]
//! over a JSON API. Every payload is wrapped in the same response
//! envelope, see [`response::ApiResponse`].

use std::sync::Arc;

use vitals::{HealthEngine, Store};

pub mod error;
pub mod response;
pub mod routes;

/// State shared by every request handler.
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub engine: Arc<HealthEngine>,
}
