//! Identity registry chain client.
//!
//! This crate owns every interaction with the on-chain identity registry:
//! the `nonces`/`custodyOf`/`recoveryOf` views, the `transfer`/`recover`/
//! `changeRecoveryAddress` writes, and receipt tracking for submitted
//! transactions. The [`RegistryInterface`] trait is the seam the rest of
//! the pipeline depends on; [`AlloyRegistry`] is the production
//! implementation.

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use fid_types::{Signature, TransactionHash, TransactionReceipt};
use std::time::Duration;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod alloy;
}

pub use implementations::alloy::AlloyRegistry;

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
	/// Error that occurs during network communication with the RPC node.
	#[error("Network error: {0}")]
	Network(String),
	/// Error that occurs when a transaction submission fails up front
	/// (rejected by the node, simulation revert, signer refusal).
	#[error("Transaction failed: {0}")]
	TransactionFailed(String),
	/// The transaction's receipt is not yet available. This is the normal
	/// state of a freshly broadcast transaction, not a failure.
	#[error("Transaction receipt not yet available")]
	ReceiptUnavailable,
}

/// Trait defining the interface to an identity registry deployment.
///
/// Implementations must report a not-yet-mined transaction as
/// [`RegistryError::ReceiptUnavailable`] from `get_receipt` so callers can
/// distinguish a polling artifact from a chain-level failure.
#[async_trait]
pub trait RegistryInterface: Send + Sync {
	/// Reads the registry nonce for an account (`nonces(address)`).
	async fn nonce_of(&self, account: Address) -> Result<U256, RegistryError>;

	/// Reads the custody address of an FID (`custodyOf(uint256)`).
	async fn custody_of(&self, fid: u64) -> Result<Address, RegistryError>;

	/// Reads the recovery address of an FID (`recoveryOf(uint256)`).
	async fn recovery_of(&self, fid: u64) -> Result<Address, RegistryError>;

	/// Broadcasts `transfer(to, deadline, sig)`, returning the tx hash.
	async fn submit_transfer(
		&self,
		to: Address,
		deadline: u64,
		sig: &Signature,
	) -> Result<TransactionHash, RegistryError>;

	/// Broadcasts `recover(from, to, deadline, sig)`, returning the tx hash.
	async fn submit_recover(
		&self,
		from: Address,
		to: Address,
		deadline: u64,
		sig: &Signature,
	) -> Result<TransactionHash, RegistryError>;

	/// Broadcasts `changeRecoveryAddress(recovery)`, returning the tx hash.
	async fn submit_change_recovery(
		&self,
		recovery: Address,
	) -> Result<TransactionHash, RegistryError>;

	/// Retrieves the receipt for a transaction if available.
	async fn get_receipt(&self, hash: &TransactionHash)
		-> Result<TransactionReceipt, RegistryError>;

	/// Gets the current block number.
	async fn block_number(&self) -> Result<u64, RegistryError>;
}

/// How long and how eagerly to wait for a transaction to confirm.
#[derive(Debug, Clone)]
pub struct ConfirmationPolicy {
	/// Blocks on top of the inclusion block required before a transaction
	/// counts as confirmed (1 = included in any block).
	pub confirmations: u64,
	/// Interval between receipt polls.
	pub poll_interval: Duration,
	/// Upper bound on the whole wait; exceeding it surfaces a retryable
	/// network error, not a chain-level failure.
	pub timeout: Duration,
}

impl Default for ConfirmationPolicy {
	fn default() -> Self {
		Self {
			confirmations: 1,
			poll_interval: Duration::from_secs(7),
			timeout: Duration::from_secs(600),
		}
	}
}

/// Service wrapping a registry implementation with a confirmation policy.
///
/// Delegates reads and writes to the underlying implementation and adds the
/// bounded receipt-polling loop used after a broadcast.
pub struct RegistryService {
	inner: Box<dyn RegistryInterface>,
	policy: ConfirmationPolicy,
}

impl RegistryService {
	/// Creates a new RegistryService with the given implementation and
	/// confirmation policy.
	pub fn new(inner: Box<dyn RegistryInterface>, policy: ConfirmationPolicy) -> Self {
		Self { inner, policy }
	}

	pub async fn nonce_of(&self, account: Address) -> Result<U256, RegistryError> {
		self.inner.nonce_of(account).await
	}

	pub async fn custody_of(&self, fid: u64) -> Result<Address, RegistryError> {
		self.inner.custody_of(fid).await
	}

	pub async fn recovery_of(&self, fid: u64) -> Result<Address, RegistryError> {
		self.inner.recovery_of(fid).await
	}

	pub async fn submit_transfer(
		&self,
		to: Address,
		deadline: u64,
		sig: &Signature,
	) -> Result<TransactionHash, RegistryError> {
		self.inner.submit_transfer(to, deadline, sig).await
	}

	pub async fn submit_recover(
		&self,
		from: Address,
		to: Address,
		deadline: u64,
		sig: &Signature,
	) -> Result<TransactionHash, RegistryError> {
		self.inner.submit_recover(from, to, deadline, sig).await
	}

	pub async fn submit_change_recovery(
		&self,
		recovery: Address,
	) -> Result<TransactionHash, RegistryError> {
		self.inner.submit_change_recovery(recovery).await
	}

	pub async fn get_receipt(
		&self,
		hash: &TransactionHash,
	) -> Result<TransactionReceipt, RegistryError> {
		self.inner.get_receipt(hash).await
	}

	/// Polls until the transaction has the required confirmations or the
	/// policy timeout elapses.
	///
	/// A missing receipt is a polling artifact while the transaction is
	/// still propagating, so it keeps the loop going rather than failing.
	/// The returned receipt may still carry `success == false`; judging
	/// that is the caller's job.
	pub async fn wait_for_confirmation(
		&self,
		hash: &TransactionHash,
	) -> Result<TransactionReceipt, RegistryError> {
		let start = tokio::time::Instant::now();

		loop {
			if start.elapsed() > self.policy.timeout {
				return Err(RegistryError::Network(format!(
					"Timeout waiting for confirmation of {} after {} seconds",
					hash,
					self.policy.timeout.as_secs()
				)));
			}

			match self.inner.get_receipt(hash).await {
				Ok(receipt) => {
					let current_block = self.inner.block_number().await?;
					let confirmations =
						current_block.saturating_sub(receipt.block_number) + 1;
					if confirmations >= self.policy.confirmations {
						return Ok(receipt);
					}
					tracing::debug!(
						tx_hash = %hash,
						"Waiting for {} more confirmations",
						self.policy.confirmations - confirmations
					);
				}
				Err(RegistryError::ReceiptUnavailable) => {
					tracing::debug!(tx_hash = %hash, "Transaction not yet mined");
				}
				Err(e) => return Err(e),
			}

			tokio::time::sleep(self.policy.poll_interval).await;
		}
	}
}
