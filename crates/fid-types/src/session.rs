//! The client-side session record.

use crate::{FarcasterUser, Signature};
use serde::{Deserialize, Serialize};

/// The authoritative client-side record of an in-progress recovery or
/// transfer.
///
/// Populated incrementally: the profile lookup writes `user` and `fid`, the
/// caller of the signature producer writes `signature`, `timestamp` and
/// `signed_for` together, and the user writes `to_address`. Each field is
/// persisted on write and survives restarts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
	/// Profile of the account being operated on, when a lookup has run.
	pub user: Option<FarcasterUser>,
	/// The account identifier being operated on.
	pub fid: Option<u64>,
	/// Destination of a transfer, or the address performing a recovery.
	pub to_address: Option<String>,
	/// Signature over a Transfer/Recover message, if one has been produced.
	pub signature: Option<Signature>,
	/// The deadline embedded in the signed message.
	pub timestamp: Option<u64>,
	/// The target address that was active when `signature` was produced.
	/// A later change to `to_address` leaves this behind, which is how a
	/// stale signature is detected before submission.
	pub signed_for: Option<String>,
}

impl Session {
	/// True when the stored signature was produced for the session's current
	/// target address. Case-insensitive, since addresses may be entered with
	/// or without EIP-55 checksum casing.
	pub fn signature_matches_target(&self) -> bool {
		match (&self.signed_for, &self.to_address) {
			(Some(signed), Some(target)) => signed.eq_ignore_ascii_case(target),
			_ => false,
		}
	}

	/// True when no field has been populated.
	pub fn is_empty(&self) -> bool {
		self.user.is_none()
			&& self.fid.is_none()
			&& self.to_address.is_none()
			&& self.signature.is_none()
			&& self.timestamp.is_none()
			&& self.signed_for.is_none()
	}
}
