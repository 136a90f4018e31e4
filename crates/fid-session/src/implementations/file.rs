//! File-based storage backend.
//!
//! Stores each session field as its own file under a base directory,
//! providing simple persistence without external dependencies. Writes go
//! through a temp file and a rename so a crash mid-write never leaves a
//! half-written field behind.

use crate::{SessionError, StorageInterface};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;

/// File-based storage implementation.
pub struct FileStorage {
	/// Base directory path for storing field files.
	base_path: PathBuf,
}

impl FileStorage {
	/// Creates a new FileStorage instance rooted at the given directory.
	pub fn new(base_path: PathBuf) -> Self {
		Self { base_path }
	}

	/// Converts a storage key to a filesystem-safe file path.
	fn get_file_path(&self, key: &str) -> PathBuf {
		let safe_key = key.replace(['/', ':'], "_");
		self.base_path.join(format!("{}.dat", safe_key))
	}
}

#[async_trait]
impl StorageInterface for FileStorage {
	async fn get(&self, key: &str) -> Result<String, SessionError> {
		let path = self.get_file_path(key);

		match fs::read_to_string(&path).await {
			Ok(value) => Ok(value),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(SessionError::NotFound),
			Err(e) => Err(SessionError::Backend(e.to_string())),
		}
	}

	async fn set(&self, key: &str, value: String) -> Result<(), SessionError> {
		let path = self.get_file_path(key);

		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)
				.await
				.map_err(|e| SessionError::Backend(e.to_string()))?;
		}

		// Write atomically by writing to a temp file then renaming.
		let temp_path = path.with_extension("tmp");
		fs::write(&temp_path, value)
			.await
			.map_err(|e| SessionError::Backend(e.to_string()))?;

		fs::rename(&temp_path, &path)
			.await
			.map_err(|e| SessionError::Backend(e.to_string()))?;

		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<(), SessionError> {
		let path = self.get_file_path(key);

		match fs::remove_file(&path).await {
			Ok(_) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(SessionError::Backend(e.to_string())),
		}
	}

	async fn exists(&self, key: &str) -> Result<bool, SessionError> {
		let path = self.get_file_path(key);
		Ok(path.exists())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn survives_a_new_instance_over_the_same_directory() {
		let dir = tempfile::tempdir().unwrap();

		let storage = FileStorage::new(dir.path().to_path_buf());
		storage
			.set("signature", "0xdeadbeef".to_string())
			.await
			.unwrap();

		let reopened = FileStorage::new(dir.path().to_path_buf());
		assert_eq!(reopened.get("signature").await.unwrap(), "0xdeadbeef");
	}

	#[tokio::test]
	async fn delete_is_idempotent() {
		let dir = tempfile::tempdir().unwrap();
		let storage = FileStorage::new(dir.path().to_path_buf());

		storage.set("fid", "1".to_string()).await.unwrap();
		storage.delete("fid").await.unwrap();
		storage.delete("fid").await.unwrap();
		assert!(!storage.exists("fid").await.unwrap());
	}
}
