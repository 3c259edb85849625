//! REST API module.
//!
//! Submission routes hand the raw body to the submission handler and return
//! its envelope as the HTTP response.

mod health;
mod submissions;

pub use health::*;
pub use submissions::*;

use axum::{http::StatusCode, Json};

use crate::errors::ErrorResponse;

/// Fallback for unknown routes.
pub async fn not_found() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("Endpoint not found")),
    )
}
