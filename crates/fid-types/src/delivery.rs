//! Transaction hash and receipt types for chain interactions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Blockchain transaction hash representation.
///
/// Stored as raw bytes; displayed with a 0x prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionHash(pub Vec<u8>);

impl TransactionHash {
	/// Returns the 0x-prefixed hex encoding.
	pub fn to_hex(&self) -> String {
		format!("0x{}", hex::encode(&self.0))
	}
}

impl fmt::Display for TransactionHash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.to_hex())
	}
}

/// Transaction receipt containing execution details.
///
/// Provides information about a transaction after it has been included in a
/// block, including its success status and block number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
	/// The hash of the transaction.
	pub hash: TransactionHash,
	/// The block number where the transaction was included.
	pub block_number: u64,
	/// Whether the transaction executed successfully.
	pub success: bool,
}
