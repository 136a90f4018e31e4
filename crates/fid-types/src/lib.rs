//! Common types for the FID recovery tool.
//!
//! This crate defines the core data types shared by every component of the
//! recovery pipeline: signatures, transaction hashes and receipts, the
//! Farcaster profile DTO, the client-side session record, and small helpers
//! for address validation and timestamps.

/// Signature types shared between the signer and submission layers.
pub mod account;
/// Transaction hash and receipt types for chain interactions.
pub mod delivery;
/// The client-side session record.
pub mod session;
/// The normalized Farcaster profile DTO.
pub mod user;
/// Validation and formatting helpers.
pub mod utils;

// Re-export all types for convenient access
pub use account::*;
pub use delivery::*;
pub use session::*;
pub use user::*;
pub use utils::{
	current_timestamp, is_valid_address, parse_address, with_0x_prefix, without_0x_prefix,
};
