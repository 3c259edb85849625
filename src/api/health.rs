//! Health check endpoint.

use axum::Json;
use chrono::Utc;
use serde::Serialize;

pub const SERVICE_NAME: &str = "Network Backend API";

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: String,
    pub service: &'static str,
}

/// GET /health - Liveness check.
pub async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        timestamp: Utc::now().to_rfc3339(),
        service: SERVICE_NAME,
    })
}
