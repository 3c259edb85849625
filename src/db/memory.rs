//! In-memory record store used as a test double.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{item_key, Item, RecordStore};
use crate::errors::AppError;

/// Keeps every put in order; optionally rejects all writes.
pub struct MemoryRecordStore {
    name: String,
    items: Mutex<Vec<Item>>,
    reject_with: Option<String>,
}

impl MemoryRecordStore {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            items: Mutex::new(Vec::new()),
            reject_with: None,
        }
    }

    /// A store whose every write fails with the given backend description.
    pub fn rejecting(name: &str, description: &str) -> Self {
        Self {
            reject_with: Some(description.to_string()),
            ..Self::new(name)
        }
    }

    pub fn items(&self) -> Vec<Item> {
        self.items.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn put_item(&self, item: Item) -> Result<(), AppError> {
        if let Some(description) = &self.reject_with {
            return Err(AppError::Storage(description.clone()));
        }

        let key = item_key(&item)?.to_string();
        let mut items = self.items.lock().unwrap();
        items.retain(|existing| item_key(existing).ok() != Some(key.as_str()));
        items.push(item);
        Ok(())
    }
}
