//! Signer abstractions for the FID recovery tool.
//!
//! The pipeline never owns the signing key directly; it talks to a
//! [`SignerInterface`], which a wallet integration supplies. This crate
//! provides that seam, a local implementation backed by a raw private key or
//! a BIP-39 mnemonic, and the ephemeral wallet generator used when
//! transferring custody to a brand-new address.

use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use fid_types::Signature;
use thiserror::Error;

/// The ephemeral wallet generator.
pub mod ephemeral;
/// Local key-based signer implementation.
pub mod local;

pub use ephemeral::EphemeralWallet;
pub use local::LocalWallet;

/// Errors that can occur during signing operations.
#[derive(Debug, Error)]
pub enum SignerError {
	/// The signer declined to sign. This is a normal outcome of an
	/// interactive signer, not an application failure.
	#[error("Signing rejected: {0}")]
	Rejected(String),
	/// Error that occurs when signing operations fail.
	#[error("Signing failed: {0}")]
	SigningFailed(String),
	/// Error that occurs when a cryptographic key is invalid or malformed.
	#[error("Invalid key: {0}")]
	InvalidKey(String),
	/// Error that occurs inside the signer implementation.
	#[error("Implementation error: {0}")]
	Implementation(String),
}

/// Trait defining the interface for signers.
///
/// Implementations may require user interaction before resolving; callers
/// must treat [`SignerError::Rejected`] as a normal, recoverable outcome and
/// must not assume any bound on how long a sign request is pending.
#[async_trait]
pub trait SignerInterface: Send + Sync {
	/// Retrieves the address associated with this signer.
	async fn address(&self) -> Result<Address, SignerError>;

	/// Signs a prehashed 32-byte digest (an EIP-712 signing digest).
	///
	/// Returns the 65-byte r || s || v signature.
	async fn sign_digest(&self, digest: B256) -> Result<Signature, SignerError>;
}
