//! ABI word encoding and call-data construction.
//!
//! A minimal encoder for the static types used in EIP-712 struct hashing,
//! plus builders for the registry's view and write call data. Selectors are
//! computed from the Solidity signature string rather than hard-coded, so
//! the encoded call can never drift from the declared signature.

use alloy_primitives::{keccak256, Address, B256, U256};

/// Computes the 4-byte function selector for a Solidity signature string,
/// e.g. `nonces(address)`.
pub fn selector(signature: &str) -> [u8; 4] {
	let hash = keccak256(signature.as_bytes());
	[hash[0], hash[1], hash[2], hash[3]]
}

/// Minimal ABI encoder for 32-byte words.
///
/// Covers the static head of a call (or an EIP-712 struct encoding); dynamic
/// `bytes` tails are appended by the call builders below.
pub struct AbiWords {
	buf: Vec<u8>,
}

impl Default for AbiWords {
	fn default() -> Self {
		Self::new()
	}
}

impl AbiWords {
	pub fn new() -> Self {
		Self { buf: Vec::new() }
	}

	pub fn push_b256(&mut self, v: &B256) {
		self.buf.extend_from_slice(v.as_slice());
	}

	pub fn push_address(&mut self, addr: &Address) {
		let mut word = [0u8; 32];
		word[12..].copy_from_slice(addr.as_slice());
		self.buf.extend_from_slice(&word);
	}

	pub fn push_u256(&mut self, v: U256) {
		let word: [u8; 32] = v.to_be_bytes::<32>();
		self.buf.extend_from_slice(&word);
	}

	pub fn push_u64(&mut self, v: u64) {
		self.push_u256(U256::from(v));
	}

	pub fn finish(self) -> Vec<u8> {
		self.buf
	}
}

/// Appends a dynamic `bytes` tail: the length word followed by the payload
/// right-padded to a word boundary.
fn append_bytes_tail(out: &mut Vec<u8>, data: &[u8]) {
	let mut len = AbiWords::new();
	len.push_u64(data.len() as u64);
	out.extend_from_slice(&len.finish());
	out.extend_from_slice(data);
	let remainder = data.len() % 32;
	if remainder != 0 {
		out.extend(std::iter::repeat(0u8).take(32 - remainder));
	}
}

/// Call data for the `nonces(address)` view.
pub fn nonces_calldata(account: Address) -> Vec<u8> {
	let mut enc = AbiWords::new();
	enc.push_address(&account);
	let mut data = selector("nonces(address)").to_vec();
	data.extend_from_slice(&enc.finish());
	data
}

/// Call data for the `custodyOf(uint256)` view.
pub fn custody_of_calldata(fid: u64) -> Vec<u8> {
	let mut enc = AbiWords::new();
	enc.push_u64(fid);
	let mut data = selector("custodyOf(uint256)").to_vec();
	data.extend_from_slice(&enc.finish());
	data
}

/// Call data for the `recoveryOf(uint256)` view.
pub fn recovery_of_calldata(fid: u64) -> Vec<u8> {
	let mut enc = AbiWords::new();
	enc.push_u64(fid);
	let mut data = selector("recoveryOf(uint256)").to_vec();
	data.extend_from_slice(&enc.finish());
	data
}

/// Call data for `transfer(address to, uint256 deadline, bytes sig)`.
///
/// The argument order and types must match the fields that went into the
/// signed message; the contract re-derives the digest from them.
pub fn transfer_calldata(to: Address, deadline: u64, sig: &[u8]) -> Vec<u8> {
	let mut head = AbiWords::new();
	head.push_address(&to);
	head.push_u64(deadline);
	// Offset of the bytes payload: three head words.
	head.push_u64(0x60);
	let mut data = selector("transfer(address,uint256,bytes)").to_vec();
	data.extend_from_slice(&head.finish());
	append_bytes_tail(&mut data, sig);
	data
}

/// Call data for `recover(address from, address to, uint256 deadline, bytes sig)`.
pub fn recover_calldata(from: Address, to: Address, deadline: u64, sig: &[u8]) -> Vec<u8> {
	let mut head = AbiWords::new();
	head.push_address(&from);
	head.push_address(&to);
	head.push_u64(deadline);
	// Offset of the bytes payload: four head words.
	head.push_u64(0x80);
	let mut data = selector("recover(address,address,uint256,bytes)").to_vec();
	data.extend_from_slice(&head.finish());
	append_bytes_tail(&mut data, sig);
	data
}

/// Call data for `changeRecoveryAddress(address recovery)`.
pub fn change_recovery_address_calldata(recovery: Address) -> Vec<u8> {
	let mut enc = AbiWords::new();
	enc.push_address(&recovery);
	let mut data = selector("changeRecoveryAddress(address)").to_vec();
	data.extend_from_slice(&enc.finish());
	data
}

#[cfg(test)]
mod tests {
	use super::*;

	fn addr(byte: u8) -> Address {
		Address::from([byte; 20])
	}

	#[test]
	fn nonces_selector_is_the_known_one() {
		// Shared with ERC-2612 permit, so the selector is well known.
		assert_eq!(selector("nonces(address)"), [0x7e, 0xce, 0xbe, 0x00]);
	}

	#[test]
	fn nonces_calldata_layout() {
		let data = nonces_calldata(addr(0x11));
		assert_eq!(data.len(), 4 + 32);
		assert_eq!(&data[..4], &[0x7e, 0xce, 0xbe, 0x00]);
		// Address is right-aligned in its word.
		assert_eq!(&data[4..16], &[0u8; 12]);
		assert_eq!(&data[16..36], addr(0x11).as_slice());
	}

	#[test]
	fn transfer_calldata_layout() {
		let sig = [0xab; 65];
		let data = transfer_calldata(addr(0x22), 1_700_000_000, &sig);
		// selector + 3 head words + length word + 65 bytes padded to 96.
		assert_eq!(data.len(), 4 + 32 * 3 + 32 + 96);
		// Offset word points at the bytes payload.
		assert_eq!(U256::from_be_slice(&data[4 + 64..4 + 96]), U256::from(0x60));
		// Length word holds the raw signature length.
		assert_eq!(U256::from_be_slice(&data[4 + 96..4 + 128]), U256::from(65));
		assert_eq!(&data[4 + 128..4 + 128 + 65], &sig[..]);
		// Padding is zeroed.
		assert!(data[4 + 128 + 65..].iter().all(|b| *b == 0));
	}

	#[test]
	fn recover_calldata_layout() {
		let sig = [0xcd; 65];
		let data = recover_calldata(addr(0x33), addr(0x44), 1_700_000_000, &sig);
		assert_eq!(data.len(), 4 + 32 * 4 + 32 + 96);
		assert_eq!(U256::from_be_slice(&data[4 + 96..4 + 128]), U256::from(0x80));
		assert_eq!(&data[16..36], addr(0x33).as_slice());
		assert_eq!(&data[48..68], addr(0x44).as_slice());
	}

	#[test]
	fn bytes_tail_pads_to_word_boundary() {
		let mut out = Vec::new();
		append_bytes_tail(&mut out, &[0x01, 0x02, 0x03]);
		assert_eq!(out.len(), 64);
		assert_eq!(U256::from_be_slice(&out[..32]), U256::from(3));
		assert_eq!(&out[32..35], &[0x01, 0x02, 0x03]);
		assert!(out[35..].iter().all(|b| *b == 0));
	}
}
