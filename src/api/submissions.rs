//! Submission API endpoints.

use axum::{body::Bytes, extract::State, http::StatusCode, Json};

use crate::models::{ResponseEnvelope, SubmissionKind};
use crate::AppState;

/// POST /api/submit - Classify by `type` and store the submission.
pub async fn submit(State(state): State<AppState>, body: Bytes) -> ResponseEnvelope {
    state.handler.handle(&body).await
}

/// POST /api/waitlist - Store a waitlist signup.
pub async fn submit_waitlist(State(state): State<AppState>, body: Bytes) -> ResponseEnvelope {
    state
        .handler
        .handle_as(&body, SubmissionKind::Waitlist)
        .await
}

/// POST /api/partner - Store a partner request.
pub async fn submit_partner(State(state): State<AppState>, body: Bytes) -> ResponseEnvelope {
    state
        .handler
        .handle_as(&body, SubmissionKind::Partner)
        .await
}

/// POST /api/invoke - Direct invocation returning the envelope itself.
pub async fn invoke(
    State(state): State<AppState>,
    body: Bytes,
) -> (StatusCode, Json<ResponseEnvelope>) {
    let envelope = state.handler.handle(&body).await;
    (StatusCode::OK, Json(envelope))
}
