//! Per-client sliding window rate limiting for submission routes.
//!
//! Client windows live in a Moka cache, so idle clients are evicted
//! automatically once a full window passes without a request.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use moka::sync::Cache;
use serde::Serialize;

use crate::config::RateLimitConfig;

/// Client key used when the peer address is unknown.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Upper bound on tracked clients.
const MAX_TRACKED_CLIENTS: u64 = 100_000;

/// Outcome of checking one request against the limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Limited { retry_after_secs: u64 },
}

/// In-process sliding window limiter keyed by client address.
pub struct RateLimiter {
    config: RateLimitConfig,
    /// Accepted request times per client, oldest first
    clients: Cache<Arc<str>, Arc<Mutex<VecDeque<Instant>>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        let clients = Cache::builder()
            .max_capacity(MAX_TRACKED_CLIENTS)
            .time_to_idle(config.window.max(Duration::from_secs(1)))
            .build();

        Self { config, clients }
    }

    pub fn check(&self, client: &str) -> Decision {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: &str, now: Instant) -> Decision {
        if self.config.max_requests == 0 {
            return Decision::Allowed;
        }

        let window = self.config.window;
        let requests = self
            .clients
            .get_with(Arc::from(client), || Arc::new(Mutex::new(VecDeque::new())));
        let mut requests = requests.lock().unwrap_or_else(|e| e.into_inner());

        while requests
            .front()
            .is_some_and(|oldest| now.saturating_duration_since(*oldest) >= window)
        {
            requests.pop_front();
        }

        if requests.len() >= self.config.max_requests {
            let remaining = requests
                .front()
                .map(|oldest| (*oldest + window).saturating_duration_since(now))
                .unwrap_or_default();
            let retry_after_secs = remaining.as_millis().div_ceil(1000) as u64;
            return Decision::Limited { retry_after_secs };
        }

        requests.push_back(now);
        Decision::Allowed
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> u64 {
        self.clients.run_pending_tasks();
        self.clients.entry_count()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LimitedResponse {
    error: String,
    retry_after: u64,
}

/// Rate limit layer function that takes the shared limiter as a parameter.
pub async fn rate_limit_layer(limiter: Arc<RateLimiter>, request: Request, next: Next) -> Response {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string());

    match limiter.check(&client) {
        Decision::Allowed => next.run(request).await,
        Decision::Limited { retry_after_secs } => {
            tracing::warn!("Rate limit exceeded for {}", client);
            too_many_requests(retry_after_secs)
        }
    }
}

fn too_many_requests(retry_after_secs: u64) -> Response {
    let body = LimitedResponse {
        error: format!(
            "Too many requests. Please try again in {} seconds.",
            retry_after_secs
        ),
        retry_after: retry_after_secs,
    };

    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
    response
}
