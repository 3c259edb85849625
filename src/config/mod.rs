//! Configuration module for the intake backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.
//! Store names are resolved once here and never change for the life of the process.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::AppError;

/// Default name of the partner request store.
pub const DEFAULT_PARTNER_TABLE: &str = "NetworkPartnerRequests";
/// Default name of the waitlist store.
pub const DEFAULT_WAITLIST_TABLE: &str = "wishlist";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file backing both stores
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Name of the store receiving partner requests
    pub partner_table: String,
    /// Name of the store receiving waitlist entries
    pub waitlist_table: String,
    /// Allowed CORS origin; any origin when unset
    pub cors_origin: Option<String>,
    /// Submission rate limit per client
    pub rate_limit: RateLimitConfig,
    /// Stricter per-client limit for `/api/partner`
    pub partner_rate_limit: RateLimitConfig,
}

/// Sliding window rate limit settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Accepted requests per window; zero disables limiting
    pub max_requests: usize,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(60),
        }
    }
}

/// Default accepted partner requests per window.
pub const DEFAULT_PARTNER_RATE_LIMIT_MAX: usize = 5;

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = lookup("INTAKE_DB_PATH")
            .unwrap_or_else(|| "./data/intake.sqlite".to_string())
            .into();

        let bind_addr_raw =
            lookup("INTAKE_BIND_ADDR").unwrap_or_else(|| "127.0.0.1:3001".to_string());
        let bind_addr = bind_addr_raw.parse().map_err(|_| {
            AppError::Config(format!("Invalid INTAKE_BIND_ADDR format: {}", bind_addr_raw))
        })?;

        let log_level = lookup("INTAKE_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let partner_table = lookup("INTAKE_PARTNER_TABLE")
            .unwrap_or_else(|| DEFAULT_PARTNER_TABLE.to_string());
        validate_store_name("INTAKE_PARTNER_TABLE", &partner_table)?;

        let waitlist_table = lookup("INTAKE_WAITLIST_TABLE")
            .unwrap_or_else(|| DEFAULT_WAITLIST_TABLE.to_string());
        validate_store_name("INTAKE_WAITLIST_TABLE", &waitlist_table)?;

        if partner_table == waitlist_table {
            return Err(AppError::Config(format!(
                "Partner and waitlist stores must differ (both are '{}')",
                partner_table
            )));
        }

        let cors_origin = lookup("INTAKE_CORS_ORIGIN").filter(|s| !s.trim().is_empty());

        let defaults = RateLimitConfig::default();
        let max_requests = match lookup("INTAKE_RATE_LIMIT_MAX") {
            Some(raw) => parse_number("INTAKE_RATE_LIMIT_MAX", &raw)?,
            None => defaults.max_requests,
        };
        let window = match lookup("INTAKE_RATE_LIMIT_WINDOW_SECS") {
            Some(raw) => Duration::from_secs(parse_number("INTAKE_RATE_LIMIT_WINDOW_SECS", &raw)?),
            None => defaults.window,
        };
        let partner_max_requests = match lookup("INTAKE_PARTNER_RATE_LIMIT_MAX") {
            Some(raw) => parse_number("INTAKE_PARTNER_RATE_LIMIT_MAX", &raw)?,
            None => DEFAULT_PARTNER_RATE_LIMIT_MAX,
        };

        Ok(Self {
            db_path,
            bind_addr,
            log_level,
            partner_table,
            waitlist_table,
            cors_origin,
            rate_limit: RateLimitConfig {
                max_requests,
                window,
            },
            partner_rate_limit: RateLimitConfig {
                max_requests: partner_max_requests,
                window,
            },
        })
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::Config(format!("Invalid {} value: {}", key, raw)))
}

/// Store names end up as SQLite identifiers, so only a conservative charset is allowed.
fn validate_store_name(key: &str, name: &str) -> Result<(), AppError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));

    if valid {
        Ok(())
    } else {
        Err(AppError::Config(format!("Invalid {} value: {:?}", key, name)))
    }
}
