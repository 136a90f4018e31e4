//! Validation and formatting helpers.

use alloy_primitives::Address;

/// Helper function to get the current UNIX timestamp in seconds, returning 0
/// if the system time is somehow before the epoch.
pub fn current_timestamp() -> u64 {
	std::time::SystemTime::now()
		.duration_since(std::time::UNIX_EPOCH)
		.map(|d| d.as_secs())
		.unwrap_or(0)
}

/// Checks that a string is a well-formed 20-byte hex address
/// (`0x` followed by exactly 40 hex digits, any casing).
///
/// Run before any contract read so a typo never turns into an RPC round
/// trip or an ambiguous on-chain error.
pub fn is_valid_address(s: &str) -> bool {
	match s.strip_prefix("0x") {
		Some(digits) => digits.len() == 40 && digits.bytes().all(|b| b.is_ascii_hexdigit()),
		None => false,
	}
}

/// Parses a string into an [`Address`], accepting any hex casing.
///
/// Returns `None` for anything [`is_valid_address`] rejects.
pub fn parse_address(s: &str) -> Option<Address> {
	if !is_valid_address(s) {
		return None;
	}
	// Lowercase first: mixed-case input is accepted here even when it does
	// not form a valid EIP-55 checksum.
	s.to_ascii_lowercase().parse().ok()
}

/// Ensures a hex string carries a 0x prefix.
pub fn with_0x_prefix(s: &str) -> String {
	if s.starts_with("0x") {
		s.to_string()
	} else {
		format!("0x{}", s)
	}
}

/// Strips a leading 0x prefix if present.
pub fn without_0x_prefix(s: &str) -> &str {
	s.strip_prefix("0x").unwrap_or(s)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn accepts_well_formed_addresses() {
		assert!(is_valid_address(
			"0x00000000Fc6c5F01Fc30151999387Bb99A9F489b"
		));
		assert!(is_valid_address(
			"0xda107a1caf36d198b12c16c7b6a1d1c795978c42"
		));
	}

	#[test]
	fn rejects_malformed_addresses() {
		assert!(!is_valid_address("not-an-address"));
		assert!(!is_valid_address("0x1234"));
		assert!(!is_valid_address("da107a1caf36d198b12c16c7b6a1d1c795978c42"));
		assert!(!is_valid_address(
			"0xzz107a1caf36d198b12c16c7b6a1d1c795978c42"
		));
		assert!(!is_valid_address(
			"0xda107a1caf36d198b12c16c7b6a1d1c795978c421"
		));
	}

	#[test]
	fn parses_any_casing() {
		let lower = parse_address("0xda107a1caf36d198b12c16c7b6a1d1c795978c42").unwrap();
		let upper = parse_address("0xDA107A1CAF36D198B12C16C7B6A1D1C795978C42").unwrap();
		assert_eq!(lower, upper);
	}

	#[test]
	fn prefix_helpers() {
		assert_eq!(with_0x_prefix("abcd"), "0xabcd");
		assert_eq!(with_0x_prefix("0xabcd"), "0xabcd");
		assert_eq!(without_0x_prefix("0xabcd"), "abcd");
		assert_eq!(without_0x_prefix("abcd"), "abcd");
	}
}
