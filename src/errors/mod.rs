//! Error handling module for the intake backend.
//!
//! Every failure inside the submission pipeline collapses into a single
//! `AppError`; its description becomes the `{"error": "..."}` body.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Inbound payload could not be parsed
    Parse(String),
    /// Record store rejected the write or could not be reached
    Storage(String),
    /// Invalid startup configuration
    Config(String),
    /// Any other internal fault
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    ///
    /// Callers cannot act differently on parse and storage failures, so every
    /// pipeline error is reported as a 500.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Parse(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::Parse(msg) => msg.clone(),
            AppError::Storage(msg) => msg.clone(),
            AppError::Config(msg) => msg.clone(),
            AppError::Internal(msg) => msg.clone(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        AppError::Storage(format!("Database error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        AppError::Parse(err.to_string())
    }
}

/// Error body returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            error: description.into(),
        }
    }
}
