//! Submission handler.
//!
//! Runs one classify-and-store pass per invocation. Every failure inside the
//! pipeline is caught at a single boundary and turned into a 500 envelope, so
//! callers always receive a well-formed response.

use axum::http::StatusCode;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::db::Stores;
use crate::errors::AppError;
use crate::models::{Payload, ResponseEnvelope, SubmissionKind, SubmissionRecord};

/// Result of running the pipeline once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Success { request_id: String },
    Failure {
        status: StatusCode,
        description: String,
    },
}

impl From<SubmissionOutcome> for ResponseEnvelope {
    fn from(outcome: SubmissionOutcome) -> Self {
        match outcome {
            SubmissionOutcome::Success { request_id } => ResponseEnvelope::success(&request_id),
            SubmissionOutcome::Failure {
                status,
                description,
            } => ResponseEnvelope::failure(status, &description),
        }
    }
}

/// Stateless handler holding the injected store handles.
pub struct SubmissionHandler {
    stores: Stores,
}

impl SubmissionHandler {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    /// Handle one invocation event given as raw JSON.
    pub async fn handle(&self, event: &[u8]) -> ResponseEnvelope {
        self.submit(event, None).await.into()
    }

    /// Handle an event whose submission type is pinned to `kind`, regardless
    /// of the payload's `type` field.
    pub async fn handle_as(&self, event: &[u8], kind: SubmissionKind) -> ResponseEnvelope {
        self.submit(event, Some(kind)).await.into()
    }

    /// Run the pipeline and fold any failure into `SubmissionOutcome::Failure`.
    pub async fn submit(&self, event: &[u8], kind: Option<SubmissionKind>) -> SubmissionOutcome {
        match self.process(event, kind).await {
            Ok(request_id) => SubmissionOutcome::Success { request_id },
            Err(err) => {
                tracing::error!("Error: {}", err);
                SubmissionOutcome::Failure {
                    status: err.status_code(),
                    description: err.to_string(),
                }
            }
        }
    }

    async fn process(
        &self,
        event: &[u8],
        kind: Option<SubmissionKind>,
    ) -> Result<String, AppError> {
        tracing::info!("Received event: {}", String::from_utf8_lossy(event));
        let event: Value = serde_json::from_slice(event)?;

        let mut payload = Payload::from_event(event)?;
        if let Some(kind) = kind {
            payload.set_kind(kind);
        }

        let request_id = Uuid::new_v4().to_string();
        let timestamp = Utc::now().timestamp();
        let record = SubmissionRecord::build(&payload, request_id, timestamp);

        let store = self.stores.for_kind(record.kind());
        store.put_item(record.to_item()?).await?;

        tracing::info!(
            request_id = record.request_id(),
            store = store.name(),
            "Stored {} submission",
            record.kind()
        );

        Ok(record.request_id().to_string())
    }
}
