//! Session persistence for the FID recovery tool.
//!
//! The session record must survive restarts: a user who produced a
//! signature yesterday can come back and submit it today without re-signing.
//! This crate provides the storage backend abstraction (in-memory and
//! file-based implementations) and the typed [`SessionStore`] that owns the
//! in-process session record and its persistence.

use async_trait::async_trait;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
}
/// The typed session store.
pub mod store;

pub use implementations::file::FileStorage;
pub use implementations::memory::MemoryStorage;
pub use store::{
	SessionStore, KEY_FID, KEY_SIGNATURE, KEY_SIGNED_FOR, KEY_TIMESTAMP, KEY_TO_ADDRESS, KEY_USER,
};

/// Errors that can occur during session storage operations.
#[derive(Debug, Error)]
pub enum SessionError {
	/// Error that occurs when a requested item is not found.
	#[error("Not found")]
	NotFound,
	/// Error that occurs during serialization/deserialization.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Error that occurs in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
	/// A signature was recorded before a target address was set.
	#[error("No target address set for this session")]
	MissingTarget,
}

/// Trait defining the low-level interface for session storage backends.
///
/// Values are strings: structured values are JSON-encoded and numbers are
/// written as decimal strings before they reach the backend.
#[async_trait]
pub trait StorageInterface: Send + Sync {
	/// Retrieves the value for the given key.
	async fn get(&self, key: &str) -> Result<String, SessionError>;

	/// Stores a value under the given key.
	async fn set(&self, key: &str, value: String) -> Result<(), SessionError>;

	/// Deletes the value associated with the given key.
	async fn delete(&self, key: &str) -> Result<(), SessionError>;

	/// Checks if a key exists in storage.
	async fn exists(&self, key: &str) -> Result<bool, SessionError>;
}
