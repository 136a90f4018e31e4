//! Nonce and deadline resolution.
//!
//! Resolves the two chain-dependent inputs of a typed message in one step:
//! the counterparty's current registry nonce and the signature deadline.
//! Within one signing attempt this always runs before message construction,
//! which always runs before the signature request; the nonce must reflect
//! chain state at signing time.

use crate::FlowError;
use alloy_primitives::{Address, U256};
use fid_registry::RegistryService;
use fid_types::{current_timestamp, parse_address};
use std::time::Duration;

/// Validity window of a produced signature: 365 days.
pub const SIGNATURE_VALIDITY_SECS: u64 = 31_536_000;

/// Upper bound on the nonce read; past it the error is retryable.
pub const NONCE_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// A single on-chain nonce read.
///
/// Valid only for the address it was fetched for; a changed target address
/// always means a fresh read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonceSnapshot {
	/// The account the nonce belongs to.
	pub address: Address,
	/// The registry nonce at fetch time.
	pub nonce: U256,
	/// UNIX seconds when the read completed.
	pub fetched_at: u64,
}

/// Result of a resolution: the nonce snapshot and the deadline to embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
	pub snapshot: NonceSnapshot,
	pub deadline: u64,
}

/// Resolves `{nonce, deadline}` for a signing attempt.
///
/// The address is checked for well-formedness before any RPC so a typo is
/// rejected synchronously. The deadline is sticky: when the session already
/// carries one (`existing_deadline`), it is returned unchanged even as time
/// advances; recomputing it after a signature exists would desynchronize
/// signature and message. This is the only place the stickiness rule lives.
pub async fn resolve(
	registry: &RegistryService,
	address: &str,
	existing_deadline: Option<u64>,
) -> Result<Resolved, FlowError> {
	let account = parse_address(address).ok_or(FlowError::InvalidAddress)?;

	let nonce = tokio::time::timeout(NONCE_READ_TIMEOUT, registry.nonce_of(account))
		.await
		.map_err(|_| {
			FlowError::Rpc(format!(
				"Nonce read timed out after {} seconds",
				NONCE_READ_TIMEOUT.as_secs()
			))
		})?
		.map_err(|e| FlowError::Rpc(e.to_string()))?;

	let deadline = existing_deadline
		.unwrap_or_else(|| current_timestamp().saturating_add(SIGNATURE_VALIDITY_SECS));

	Ok(Resolved {
		snapshot: NonceSnapshot {
			address: account,
			nonce,
			fetched_at: current_timestamp(),
		},
		deadline,
	})
}
