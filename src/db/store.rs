//! Record store interface and its SQLite implementation.
//!
//! A store exposes a single unconditional put. Records are never read back,
//! updated or deleted by the intake pipeline.

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::SqlitePool;

use crate::errors::AppError;

/// Attribute every item is keyed by.
pub const KEY_ATTRIBUTE: &str = "requestId";

/// A JSON-like attribute mapping written as one record.
pub type Item = Map<String, Value>;

/// A named key-value record store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Name the store is addressed by.
    fn name(&self) -> &str;

    /// Insert or replace the item under its key attribute.
    async fn put_item(&self, item: Item) -> Result<(), AppError>;
}

/// Record store backed by one SQLite table.
#[derive(Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
    name: String,
    insert_sql: String,
}

impl SqliteRecordStore {
    /// Open the store, creating its table if it does not exist yet.
    pub async fn open(pool: SqlitePool, name: &str) -> Result<Self, AppError> {
        let table = quote_ident(name);

        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                request_id TEXT PRIMARY KEY,
                item TEXT NOT NULL
            );
            "#
        ))
        .execute(&pool)
        .await?;

        tracing::debug!("Record store {} ready", name);

        Ok(Self {
            pool,
            name: name.to_string(),
            insert_sql: format!("INSERT OR REPLACE INTO {table} (request_id, item) VALUES (?, ?)"),
        })
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn put_item(&self, item: Item) -> Result<(), AppError> {
        let key = item_key(&item)?.to_string();
        let body = serde_json::to_string(&item)
            .map_err(|e| AppError::Internal(format!("Failed to encode item: {}", e)))?;

        sqlx::query(&self.insert_sql)
            .bind(&key)
            .bind(&body)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
impl SqliteRecordStore {
    /// Load an item back by key.
    pub async fn get_item(&self, request_id: &str) -> Result<Option<Item>, AppError> {
        use sqlx::Row;

        let row = sqlx::query(&format!(
            "SELECT item FROM {} WHERE request_id = ?",
            quote_ident(&self.name)
        ))
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let body: String = row.get("item");
                Ok(Some(serde_json::from_str(&body)?))
            }
            None => Ok(None),
        }
    }

    /// Count the items in the store.
    pub async fn count(&self) -> Result<i64, AppError> {
        use sqlx::Row;

        let row = sqlx::query(&format!("SELECT COUNT(*) AS n FROM {}", quote_ident(&self.name)))
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }
}

/// Extract the key attribute of an item.
pub fn item_key(item: &Item) -> Result<&str, AppError> {
    item.get(KEY_ATTRIBUTE)
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::Storage(format!("Item is missing key attribute {}", KEY_ATTRIBUTE)))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use serde_json::json;
    use tempfile::TempDir;

    fn item(value: Value) -> Item {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    async fn open_store(name: &str) -> (SqliteRecordStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("store.sqlite"))
            .await
            .unwrap();
        let store = SqliteRecordStore::open(pool, name).await.unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let (store, _dir) = open_store("wishlist").await;
        assert_eq!(store.name(), "wishlist");

        let record = item(json!({ "requestId": "r1", "email": null, "type": "waitlist" }));
        store.put_item(record.clone()).await.unwrap();

        assert_eq!(store.get_item("r1").await.unwrap(), Some(record));
        assert_eq!(store.get_item("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_replaces_existing_key() {
        let (store, _dir) = open_store("NetworkPartnerRequests").await;

        store
            .put_item(item(json!({ "requestId": "r1", "status": "PENDING" })))
            .await
            .unwrap();
        store
            .put_item(item(json!({ "requestId": "r1", "status": "REVIEWED" })))
            .await
            .unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        let stored = store.get_item("r1").await.unwrap().unwrap();
        assert_eq!(stored["status"], "REVIEWED");
    }

    #[tokio::test]
    async fn test_missing_key_rejected() {
        let (store, _dir) = open_store("wishlist").await;

        let err = store
            .put_item(item(json!({ "email": "a@b.com" })))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_closed_pool_surfaces_storage_error() {
        let (store, _dir) = open_store("wishlist").await;
        store.pool.close().await;

        let err = store
            .put_item(item(json!({ "requestId": "r1" })))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
    }
}
