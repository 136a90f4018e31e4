//! In-memory storage backend.
//!
//! Holds session fields in a HashMap with no persistence across restarts.
//! Clones share the same underlying map, which is how tests simulate a
//! reload against the same storage.

use crate::{SessionError, StorageInterface};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory storage implementation.
#[derive(Clone)]
pub struct MemoryStorage {
	/// The in-memory store protected by a read-write lock.
	store: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStorage {
	/// Creates a new MemoryStorage instance.
	pub fn new() -> Self {
		Self {
			store: Arc::new(RwLock::new(HashMap::new())),
		}
	}
}

impl Default for MemoryStorage {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl StorageInterface for MemoryStorage {
	async fn get(&self, key: &str) -> Result<String, SessionError> {
		let store = self.store.read().await;
		store.get(key).cloned().ok_or(SessionError::NotFound)
	}

	async fn set(&self, key: &str, value: String) -> Result<(), SessionError> {
		let mut store = self.store.write().await;
		store.insert(key.to_string(), value);
		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<(), SessionError> {
		let mut store = self.store.write().await;
		store.remove(key);
		Ok(())
	}

	async fn exists(&self, key: &str) -> Result<bool, SessionError> {
		let store = self.store.read().await;
		Ok(store.contains_key(key))
	}
}
