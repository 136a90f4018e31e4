//! Flow-level error taxonomy.

use fid_signer::SignerError;
use thiserror::Error;

/// Errors surfaced by the signing and submission pipeline.
///
/// Every protocol-step failure is one of these kinds; unexpected errors from
/// external calls are normalized at the component boundary that observed
/// them. None of them is fatal to the process; the session record survives
/// a failed step, so the user retries without re-entering anything.
#[derive(Debug, Error)]
pub enum FlowError {
	/// Malformed address input, caught before any network call.
	#[error("Invalid address")]
	InvalidAddress,
	/// A chain read or write failed or timed out; retryable.
	#[error("RPC error: {0}")]
	Rpc(String),
	/// The signer declined to sign or broadcast. A normal outcome of an
	/// interactive signer, to be rendered without alarming language.
	#[error("Signing request was declined")]
	UserRejected,
	/// The signer failed for a reason other than rejection.
	#[error("Signing failed: {0}")]
	Signer(String),
	/// The stored signature was produced for a different target address or
	/// deadline than the session currently holds; re-sign before
	/// submitting.
	#[error("Stored signature no longer matches the session target")]
	StaleSignature,
	/// Submission was requested before a signature was produced.
	#[error("No signature available for this session")]
	MissingSignature,
	/// A submission attempt is already in flight.
	#[error("A submission is already in progress")]
	AlreadySubmitting,
	/// The attempt was superseded by cancellation.
	#[error("Operation cancelled")]
	Cancelled,
	/// The broadcast transaction reverted or was rejected by the chain.
	#[error("Confirmation failed: {0}")]
	ConfirmationFailed(String),
	/// The session store failed to read or write.
	#[error("Session error: {0}")]
	Session(String),
}

impl From<SignerError> for FlowError {
	fn from(err: SignerError) -> Self {
		match err {
			SignerError::Rejected(_) => FlowError::UserRejected,
			other => FlowError::Signer(other.to_string()),
		}
	}
}
