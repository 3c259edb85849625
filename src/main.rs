//! Network Partner Intake Backend
//!
//! Accepts partner requests and waitlist signups and persists each into its
//! own SQLite-backed record store.

mod api;
mod config;
mod db;
mod errors;
mod handler;
mod models;
mod ratelimit;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Stores;
use handler::SubmissionHandler;
use ratelimit::RateLimiter;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<SubmissionHandler>,
    pub limiter: Arc<RateLimiter>,
    pub partner_limiter: Arc<RateLimiter>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(stores: Stores, config: Config) -> Self {
        Self {
            handler: Arc::new(SubmissionHandler::new(stores)),
            limiter: Arc::new(RateLimiter::new(config.rate_limit)),
            partner_limiter: Arc::new(RateLimiter::new(config.partner_rate_limit)),
            config: Arc::new(config),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Network Partner Intake Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Partner store: {}", config.partner_table);
    tracing::info!("Waitlist store: {}", config.waitlist_table);
    tracing::info!("Bind address: {}", config.bind_addr);
    tracing::info!(
        "Rate limits per {:?}: {} submissions, {} partner requests",
        config.rate_limit.window,
        config.rate_limit.max_requests,
        config.partner_rate_limit.max_requests
    );

    if config.cors_origin.is_none() {
        tracing::warn!("No CORS origin configured (INTAKE_CORS_ORIGIN). Allowing any origin");
    }

    // Initialize stores once; handles are shared read-only from here on
    let pool = db::init_database(&config.db_path).await?;
    let stores = Stores::open(pool, &config).await?;

    let bind_addr = config.bind_addr;
    let state = AppState::new(stores, config);

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(allowed_origin(state.config.cors_origin.as_deref()))
        .allow_methods(Any)
        .allow_headers(Any);

    let limiter = state.limiter.clone();
    let partner_limiter = state.partner_limiter.clone();

    // Submission routes
    let submission_routes = Router::new()
        .route("/", post(api::submit))
        .route("/api/submit", post(api::submit))
        .route("/api/waitlist", post(api::submit_waitlist))
        .route("/api/invoke", post(api::invoke))
        .layer(middleware::from_fn(move |req, next| {
            ratelimit::rate_limit_layer(limiter.clone(), req, next)
        }));

    // Partner requests carry their own, stricter limit
    let partner_routes = Router::new()
        .route("/api/partner", post(api::submit_partner))
        .layer(middleware::from_fn(move |req, next| {
            ratelimit::rate_limit_layer(partner_limiter.clone(), req, next)
        }));

    // Health check (not rate limited)
    let health_routes = Router::new()
        .route("/health", get(api::health_check))
        .route("/api/health", get(api::health_check));

    Router::new()
        .merge(submission_routes)
        .merge(partner_routes)
        .merge(health_routes)
        .fallback(api::not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn allowed_origin(origin: Option<&str>) -> AllowOrigin {
    match origin.map(HeaderValue::from_str) {
        Some(Ok(value)) => AllowOrigin::exact(value),
        Some(Err(_)) => {
            tracing::warn!("Invalid CORS origin {:?}, allowing any origin", origin);
            AllowOrigin::any()
        }
        None => AllowOrigin::any(),
    }
}
