//! Signature types shared between the signer and submission layers.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Length in bytes of an encoded secp256k1 signature (r || s || v).
pub const SIGNATURE_LENGTH: usize = 65;

/// Errors that can occur when parsing a signature from its hex encoding.
#[derive(Debug, Error)]
pub enum SignatureParseError {
	/// The string was not valid hex.
	#[error("Invalid hex: {0}")]
	Hex(String),
	/// The decoded bytes were not signature-sized.
	#[error("Invalid signature length: expected {SIGNATURE_LENGTH} bytes, got {0}")]
	Length(usize),
}

/// An EIP-712 signature as raw bytes (r || s || v).
///
/// Serialized as a 0x-prefixed hex string, which is also the encoding used
/// for the persisted session record and for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(pub Vec<u8>);

impl Signature {
	/// Parses a signature from a 0x-prefixed (or bare) hex string.
	pub fn from_hex(s: &str) -> Result<Self, SignatureParseError> {
		let stripped = s.strip_prefix("0x").unwrap_or(s);
		let bytes = hex::decode(stripped).map_err(|e| SignatureParseError::Hex(e.to_string()))?;
		if bytes.len() != SIGNATURE_LENGTH {
			return Err(SignatureParseError::Length(bytes.len()));
		}
		Ok(Self(bytes))
	}

	/// Returns the raw signature bytes.
	pub fn as_bytes(&self) -> &[u8] {
		&self.0
	}

	/// Returns the 0x-prefixed hex encoding.
	pub fn to_hex(&self) -> String {
		format!("0x{}", hex::encode(&self.0))
	}
}

impl fmt::Display for Signature {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.to_hex())
	}
}

impl Serialize for Signature {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&self.to_hex())
	}
}

impl<'de> Deserialize<'de> for Signature {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let s = String::deserialize(deserializer)?;
		Signature::from_hex(&s).map_err(serde::de::Error::custom)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hex_round_trip() {
		let raw = vec![0x1b; SIGNATURE_LENGTH];
		let sig = Signature(raw.clone());
		let parsed = Signature::from_hex(&sig.to_hex()).unwrap();
		assert_eq!(parsed.as_bytes(), &raw[..]);
	}

	#[test]
	fn rejects_wrong_length() {
		let err = Signature::from_hex("0xdeadbeef").unwrap_err();
		assert!(matches!(err, SignatureParseError::Length(4)));
	}

	#[test]
	fn rejects_bad_hex() {
		let err = Signature::from_hex("0xzz").unwrap_err();
		assert!(matches!(err, SignatureParseError::Hex(_)));
	}
}
