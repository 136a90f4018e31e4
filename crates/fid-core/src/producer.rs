//! The signature producer.
//!
//! Orchestrates one signing attempt end to end: validate the target, resolve
//! nonce and deadline, build the typed payload, and request the signature
//! from the active signer. Produces the signature and its deadline as one
//! result; a signature is never exposed without the deadline it was signed
//! against. Storage writes are the caller's responsibility.

use crate::resolver;
use crate::FlowError;
use alloy_primitives::{Address, U256};
use fid_codec::{RegistryOperation, TypedPayload};
use fid_registry::RegistryService;
use fid_signer::{EphemeralWallet, SignerInterface};
use fid_types::Signature;
use std::sync::Arc;
use tokio::sync::oneshot;
use zeroize::Zeroizing;

/// A produced signature paired with the deadline embedded in the signed
/// message. The two only make sense together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedAuthorization {
	pub signature: Signature,
	pub deadline: u64,
}

/// Result of preparing a transfer to a brand-new custody address.
pub struct PreparedTransfer {
	/// The generated mnemonic. Shown once; it cannot be recovered if lost.
	pub mnemonic: Zeroizing<String>,
	/// The address derived from the mnemonic, destination of the transfer.
	pub new_custody_address: Address,
	/// Deadline embedded in the signed message.
	pub deadline: u64,
	/// Transfer authorization self-signed by the new custody address.
	pub signature: Signature,
}

/// Produces transfer and recovery authorizations for one registry
/// deployment.
pub struct SignatureProducer {
	registry: Arc<RegistryService>,
	chain_id: u64,
	contract: Address,
}

impl SignatureProducer {
	pub fn new(registry: Arc<RegistryService>, chain_id: u64, contract: Address) -> Self {
		Self {
			registry,
			chain_id,
			contract,
		}
	}

	/// Builds the typed payload for the given message fields.
	///
	/// Exposed so callers can display or re-derive the exact payload a
	/// stored signature was produced over.
	pub fn payload_for(
		&self,
		op: RegistryOperation,
		fid: u64,
		counterparty: Address,
		nonce: U256,
		deadline: u64,
	) -> TypedPayload {
		TypedPayload::build(
			op,
			fid,
			counterparty,
			nonce,
			deadline,
			self.chain_id,
			self.contract,
		)
	}

	/// Runs one signing attempt.
	///
	/// Steps are strictly ordered: target validation, nonce + deadline
	/// resolution, payload construction, signature request. The signer may
	/// wait on user interaction indefinitely; a decline surfaces as
	/// [`FlowError::UserRejected`] and is not a bug.
	pub async fn sign(
		&self,
		op: RegistryOperation,
		fid: u64,
		target: &str,
		signer: &dyn SignerInterface,
		existing_deadline: Option<u64>,
	) -> Result<SignedAuthorization, FlowError> {
		let resolved = resolver::resolve(&self.registry, target, existing_deadline).await?;

		let payload = self.payload_for(
			op,
			fid,
			resolved.snapshot.address,
			resolved.snapshot.nonce,
			resolved.deadline,
		);

		tracing::debug!(
			fid,
			target,
			nonce = %resolved.snapshot.nonce,
			deadline = resolved.deadline,
			"Requesting typed-data signature"
		);

		let signature = signer.sign_digest(payload.signing_digest()).await?;

		Ok(SignedAuthorization {
			signature,
			deadline: resolved.deadline,
		})
	}

	/// Like [`sign`], raced against a cancellation channel so a new attempt
	/// can supersede a stale pending one. The signer interaction itself has
	/// no timeout; cancellation is the only way to abandon it, and a late
	/// result from a cancelled attempt is discarded.
	///
	/// [`sign`]: SignatureProducer::sign
	pub async fn sign_with_cancel(
		&self,
		op: RegistryOperation,
		fid: u64,
		target: &str,
		signer: &dyn SignerInterface,
		existing_deadline: Option<u64>,
		cancel: oneshot::Receiver<()>,
	) -> Result<SignedAuthorization, FlowError> {
		tokio::select! {
			_ = cancel => Err(FlowError::Cancelled),
			result = self.sign(op, fid, target, signer, existing_deadline) => result,
		}
	}

	/// Prepares a transfer to a brand-new custody address: generates a
	/// fresh wallet, reads its nonce, and self-signs the transfer
	/// authorization with the new key.
	///
	/// The mnemonic is returned, never stored; the caller decides how to
	/// disclose it.
	pub async fn prepare_ephemeral_transfer(
		&self,
		fid: u64,
	) -> Result<PreparedTransfer, FlowError> {
		let wallet = EphemeralWallet::generate()?;
		let target = wallet.address().to_checksum(None);

		let resolved = resolver::resolve(&self.registry, &target, None).await?;

		let payload = self.payload_for(
			RegistryOperation::Transfer,
			fid,
			wallet.address(),
			resolved.snapshot.nonce,
			resolved.deadline,
		);

		let signer = wallet.signer()?;
		let signature = signer.sign_digest(payload.signing_digest()).await?;

		let new_custody_address = wallet.address();
		Ok(PreparedTransfer {
			mnemonic: wallet.into_mnemonic(),
			new_custody_address,
			deadline: resolved.deadline,
			signature,
		})
	}
}
