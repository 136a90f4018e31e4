//! The typed session store.
//!
//! Owns the in-process [`Session`] record and mirrors every field write to
//! the storage backend. Each field has exactly one writer path: the profile
//! lookup writes `user` and `fid`, the signing flow writes `signature`,
//! `timestamp` and `signedFor` together, and the user writes `toAddress`.

use crate::{SessionError, StorageInterface};
use fid_types::{FarcasterUser, Session, Signature};
use tokio::sync::RwLock;

pub const KEY_USER: &str = "user";
pub const KEY_FID: &str = "fid";
pub const KEY_SIGNATURE: &str = "signature";
pub const KEY_TIMESTAMP: &str = "timestamp";
pub const KEY_TO_ADDRESS: &str = "toAddress";
pub const KEY_SIGNED_FOR: &str = "signedFor";

const ALL_KEYS: [&str; 6] = [
	KEY_USER,
	KEY_FID,
	KEY_SIGNATURE,
	KEY_TIMESTAMP,
	KEY_TO_ADDRESS,
	KEY_SIGNED_FOR,
];

/// Process-wide session state, durable across restarts.
pub struct SessionStore {
	backend: Box<dyn StorageInterface>,
	session: RwLock<Session>,
}

impl SessionStore {
	/// Creates an empty store over the given backend. Call [`hydrate`]
	/// before first use to pick up a persisted session.
	///
	/// [`hydrate`]: SessionStore::hydrate
	pub fn new(backend: Box<dyn StorageInterface>) -> Self {
		Self {
			backend,
			session: RwLock::new(Session::default()),
		}
	}

	/// Loads the persisted session, if any.
	///
	/// An absent or malformed field means that slot starts empty; a bad
	/// persisted record must never prevent startup.
	pub async fn hydrate(&self) -> Session {
		let mut session = Session::default();

		if let Some(raw) = self.read_field(KEY_USER).await {
			match serde_json::from_str::<FarcasterUser>(&raw) {
				Ok(user) => session.user = Some(user),
				Err(e) => tracing::warn!(error = %e, "Ignoring malformed persisted user"),
			}
		}
		if let Some(raw) = self.read_field(KEY_FID).await {
			match raw.parse::<u64>() {
				Ok(fid) => session.fid = Some(fid),
				Err(e) => tracing::warn!(error = %e, "Ignoring malformed persisted fid"),
			}
		}
		if let Some(raw) = self.read_field(KEY_SIGNATURE).await {
			match Signature::from_hex(&raw) {
				Ok(sig) => session.signature = Some(sig),
				Err(e) => tracing::warn!(error = %e, "Ignoring malformed persisted signature"),
			}
		}
		if let Some(raw) = self.read_field(KEY_TIMESTAMP).await {
			match raw.parse::<u64>() {
				Ok(ts) => session.timestamp = Some(ts),
				Err(e) => tracing::warn!(error = %e, "Ignoring malformed persisted timestamp"),
			}
		}
		session.to_address = self.read_field(KEY_TO_ADDRESS).await;
		session.signed_for = self.read_field(KEY_SIGNED_FOR).await;

		let mut current = self.session.write().await;
		*current = session.clone();
		session
	}

	/// Returns a snapshot of the current session.
	pub async fn snapshot(&self) -> Session {
		self.session.read().await.clone()
	}

	/// Writes the user profile (and its fid) into the session.
	pub async fn set_user(&self, user: FarcasterUser) -> Result<(), SessionError> {
		let mut session = self.session.write().await;
		let encoded =
			serde_json::to_string(&user).map_err(|e| SessionError::Serialization(e.to_string()))?;
		session.fid = Some(user.fid);
		session.user = Some(user);
		self.backend.set(KEY_USER, encoded).await?;
		self.persist_fid(&session).await
	}

	/// Writes the fid directly, for flows that skip the profile lookup.
	pub async fn set_fid(&self, fid: u64) -> Result<(), SessionError> {
		let mut session = self.session.write().await;
		session.fid = Some(fid);
		self.persist_fid(&session).await
	}

	/// Writes the target address.
	///
	/// Deliberately leaves any stored signature and its `signedFor` marker
	/// in place: the mismatch between the two is what downstream freshness
	/// checks detect, so the signature cannot be submitted for the new
	/// target until the user re-signs.
	pub async fn set_to_address(&self, to_address: &str) -> Result<(), SessionError> {
		let mut session = self.session.write().await;
		session.to_address = Some(to_address.to_string());
		self.backend
			.set(KEY_TO_ADDRESS, to_address.to_string())
			.await
	}

	/// Records a freshly produced signature with its deadline, bound to the
	/// session's current target address. The three fields are written
	/// together; none of them has another writer.
	pub async fn record_signature(
		&self,
		signature: Signature,
		deadline: u64,
	) -> Result<(), SessionError> {
		let mut session = self.session.write().await;
		let target = session
			.to_address
			.clone()
			.ok_or(SessionError::MissingTarget)?;

		session.signature = Some(signature.clone());
		session.timestamp = Some(deadline);
		session.signed_for = Some(target.clone());

		self.backend.set(KEY_SIGNATURE, signature.to_hex()).await?;
		self.backend
			.set(KEY_TIMESTAMP, deadline.to_string())
			.await?;
		self.backend.set(KEY_SIGNED_FOR, target).await
	}

	/// Clears the session, in memory and in storage.
	pub async fn clear(&self) -> Result<(), SessionError> {
		let mut session = self.session.write().await;
		*session = Session::default();
		for key in ALL_KEYS {
			self.backend.delete(key).await?;
		}
		Ok(())
	}

	async fn persist_fid(&self, session: &Session) -> Result<(), SessionError> {
		match session.fid {
			// Decimal string, so a large identifier never loses precision
			// in a JSON number.
			Some(fid) => self.backend.set(KEY_FID, fid.to_string()).await,
			None => Ok(()),
		}
	}

	async fn read_field(&self, key: &str) -> Option<String> {
		match self.backend.get(key).await {
			Ok(value) => Some(value),
			Err(SessionError::NotFound) => None,
			Err(e) => {
				tracing::warn!(key, error = %e, "Ignoring unreadable session field");
				None
			}
		}
	}
}
