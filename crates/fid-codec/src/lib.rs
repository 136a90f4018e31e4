//! Typed-data codec for the Farcaster identity registry.
//!
//! This crate builds the canonical EIP-712 domain/types/message triple for a
//! Transfer or Recover operation and derives the digest the signer must sign.
//! It also encodes ABI call data for the registry's view and write functions.
//! Everything here is pure: no I/O, no clocks, and equal inputs always
//! produce bit-identical output.

/// ABI word encoding and call-data construction.
pub mod abi;
/// EIP-712 domain, struct hashing, and the typed payload.
pub mod eip712;

pub use abi::{
	change_recovery_address_calldata, custody_of_calldata, nonces_calldata, recover_calldata,
	recovery_of_calldata, selector, transfer_calldata, AbiWords,
};
pub use eip712::{
	domain_separator, RegistryOperation, TypedPayload, DOMAIN_NAME, DOMAIN_TYPE, DOMAIN_VERSION,
	RECOVER_TYPE, TRANSFER_TYPE,
};
