//! Database module for record store persistence.
//!
//! Each named record store is a SQLite table holding JSON items keyed by `requestId`.

#[cfg(test)]
mod memory;
mod store;

#[cfg(test)]
pub use memory::*;
pub use store::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use crate::config::Config;
use crate::errors::AppError;
use crate::models::SubmissionKind;

/// Initialize the database connection pool.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}

/// The two store handles, created once at startup and shared read-only.
#[derive(Clone)]
pub struct Stores {
    pub partner: Arc<dyn RecordStore>,
    pub waitlist: Arc<dyn RecordStore>,
}

impl Stores {
    pub fn new(partner: Arc<dyn RecordStore>, waitlist: Arc<dyn RecordStore>) -> Self {
        Self { partner, waitlist }
    }

    /// Open both SQLite-backed stores named in the configuration.
    pub async fn open(pool: SqlitePool, config: &Config) -> Result<Self, AppError> {
        let partner = SqliteRecordStore::open(pool.clone(), &config.partner_table).await?;
        let waitlist = SqliteRecordStore::open(pool, &config.waitlist_table).await?;
        Ok(Self::new(Arc::new(partner), Arc::new(waitlist)))
    }

    /// Select the store a submission of the given kind is written to.
    pub fn for_kind(&self, kind: SubmissionKind) -> &Arc<dyn RecordStore> {
        match kind {
            SubmissionKind::Partner => &self.partner,
            SubmissionKind::Waitlist => &self.waitlist,
        }
    }
}
