//! EIP-712 domain, struct hashing, and the typed payload.

use crate::abi::AbiWords;
use alloy_primitives::{keccak256, Address, B256, U256};
use serde_json::{json, Value};

/// EIP-712 domain name fixed by the registry deployment.
pub const DOMAIN_NAME: &str = "Farcaster IdRegistry";
/// EIP-712 domain version fixed by the registry deployment.
pub const DOMAIN_VERSION: &str = "1";

/// The domain type string, including the version field.
pub const DOMAIN_TYPE: &str =
	"EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";

/// Type string for a custody transfer authorization.
///
/// Field order is part of the signing contract: the on-chain verifier hashes
/// `fid, to, nonce, deadline` in exactly this order, and any reordering
/// produces a signature that fails verification.
pub const TRANSFER_TYPE: &str = "Transfer(uint256 fid,address to,uint256 nonce,uint256 deadline)";
/// Type string for a recovery authorization. Same field order as Transfer.
pub const RECOVER_TYPE: &str = "Recover(uint256 fid,address to,uint256 nonce,uint256 deadline)";

/// The two registry operations a signature can authorize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryOperation {
	/// Move custody of an FID to another address.
	Transfer,
	/// Recover an FID to a new custody address via the recovery key.
	Recover,
}

impl RegistryOperation {
	/// The EIP-712 primary type name.
	pub fn primary_type(&self) -> &'static str {
		match self {
			RegistryOperation::Transfer => "Transfer",
			RegistryOperation::Recover => "Recover",
		}
	}

	/// The full EIP-712 type string.
	pub fn type_string(&self) -> &'static str {
		match self {
			RegistryOperation::Transfer => TRANSFER_TYPE,
			RegistryOperation::Recover => RECOVER_TYPE,
		}
	}
}

/// Computes the EIP-712 domain separator for a registry deployment.
pub fn domain_separator(chain_id: u64, verifying_contract: Address) -> B256 {
	let mut enc = AbiWords::new();
	enc.push_b256(&keccak256(DOMAIN_TYPE.as_bytes()));
	enc.push_b256(&keccak256(DOMAIN_NAME.as_bytes()));
	enc.push_b256(&keccak256(DOMAIN_VERSION.as_bytes()));
	enc.push_u64(chain_id);
	enc.push_address(&verifying_contract);
	keccak256(enc.finish())
}

/// An immutable typed-data payload for one signing attempt.
///
/// Constructed fresh for every attempt and never mutated; a stored signature
/// can be re-verified by rebuilding the payload from the same inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedPayload {
	op: RegistryOperation,
	fid: u64,
	to: Address,
	nonce: U256,
	deadline: u64,
	chain_id: u64,
	verifying_contract: Address,
}

impl TypedPayload {
	/// Builds the payload for an operation.
	///
	/// `counterparty` is the destination of a transfer or the address
	/// performing a recovery; `nonce` must be the counterparty's current
	/// registry nonce at signing time.
	pub fn build(
		op: RegistryOperation,
		fid: u64,
		counterparty: Address,
		nonce: U256,
		deadline: u64,
		chain_id: u64,
		verifying_contract: Address,
	) -> Self {
		Self {
			op,
			fid,
			to: counterparty,
			nonce,
			deadline,
			chain_id,
			verifying_contract,
		}
	}

	pub fn operation(&self) -> RegistryOperation {
		self.op
	}

	pub fn deadline(&self) -> u64 {
		self.deadline
	}

	/// The domain hash for this payload's deployment.
	pub fn domain_hash(&self) -> B256 {
		domain_separator(self.chain_id, self.verifying_contract)
	}

	/// The struct hash: keccak256(typeHash || abi.encode(fid, to, nonce, deadline)).
	pub fn struct_hash(&self) -> B256 {
		let mut enc = AbiWords::new();
		enc.push_b256(&keccak256(self.op.type_string().as_bytes()));
		enc.push_u64(self.fid);
		enc.push_address(&self.to);
		enc.push_u256(self.nonce);
		enc.push_u64(self.deadline);
		keccak256(enc.finish())
	}

	/// The final digest to sign: keccak256(0x1901 || domainHash || structHash).
	pub fn signing_digest(&self) -> B256 {
		let domain_hash = self.domain_hash();
		let struct_hash = self.struct_hash();
		let mut out = Vec::with_capacity(2 + 32 + 32);
		out.push(0x19);
		out.push(0x01);
		out.extend_from_slice(domain_hash.as_slice());
		out.extend_from_slice(struct_hash.as_slice());
		keccak256(out)
	}

	/// Renders the domain/types/message triple as JSON for display or for
	/// pasting into external tooling. uint256 values are decimal strings.
	pub fn to_json(&self) -> Value {
		json!({
			"domain": {
				"name": DOMAIN_NAME,
				"version": DOMAIN_VERSION,
				"chainId": self.chain_id,
				"verifyingContract": self.verifying_contract.to_checksum(None),
			},
			"types": {
				(self.op.primary_type()): [
					{ "name": "fid", "type": "uint256" },
					{ "name": "to", "type": "address" },
					{ "name": "nonce", "type": "uint256" },
					{ "name": "deadline", "type": "uint256" },
				],
			},
			"primaryType": self.op.primary_type(),
			"message": {
				"fid": self.fid.to_string(),
				"to": self.to.to_checksum(None),
				"nonce": self.nonce.to_string(),
				"deadline": self.deadline.to_string(),
			},
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn contract() -> Address {
		"0x00000000fc6c5f01fc30151999387bb99a9f489b"
			.parse()
			.unwrap()
	}

	fn payload(op: RegistryOperation) -> TypedPayload {
		TypedPayload::build(
			op,
			1000,
			Address::from([0x01; 20]),
			U256::ZERO,
			1_700_000_000,
			10,
			contract(),
		)
	}

	#[test]
	fn equal_inputs_produce_identical_output() {
		let a = payload(RegistryOperation::Transfer);
		let b = payload(RegistryOperation::Transfer);
		assert_eq!(a.signing_digest(), b.signing_digest());
		assert_eq!(a.to_json().to_string(), b.to_json().to_string());
	}

	#[test]
	fn transfer_field_order_is_fixed() {
		assert_eq!(
			TRANSFER_TYPE,
			"Transfer(uint256 fid,address to,uint256 nonce,uint256 deadline)"
		);
		let json = payload(RegistryOperation::Transfer).to_json();
		let fields: Vec<&str> = json["types"]["Transfer"]
			.as_array()
			.unwrap()
			.iter()
			.map(|f| f["name"].as_str().unwrap())
			.collect();
		assert_eq!(fields, ["fid", "to", "nonce", "deadline"]);
	}

	#[test]
	fn recover_field_order_matches_transfer() {
		assert_eq!(
			RECOVER_TYPE,
			"Recover(uint256 fid,address to,uint256 nonce,uint256 deadline)"
		);
	}

	#[test]
	fn operations_sign_different_digests() {
		let transfer = payload(RegistryOperation::Transfer);
		let recover = payload(RegistryOperation::Recover);
		assert_ne!(transfer.signing_digest(), recover.signing_digest());
	}

	#[test]
	fn domain_binds_chain_and_contract() {
		let mainnet = domain_separator(10, contract());
		let testnet = domain_separator(420, contract());
		assert_ne!(mainnet, testnet);
		let other_contract = domain_separator(10, Address::from([0x02; 20]));
		assert_ne!(mainnet, other_contract);
	}

	#[test]
	fn digest_changes_with_every_message_field() {
		let base = payload(RegistryOperation::Transfer);
		let bumped_nonce = TypedPayload::build(
			RegistryOperation::Transfer,
			1000,
			Address::from([0x01; 20]),
			U256::from(1),
			1_700_000_000,
			10,
			contract(),
		);
		assert_ne!(base.signing_digest(), bumped_nonce.signing_digest());
		let bumped_deadline = TypedPayload::build(
			RegistryOperation::Transfer,
			1000,
			Address::from([0x01; 20]),
			U256::ZERO,
			1_700_000_001,
			10,
			contract(),
		);
		assert_ne!(base.signing_digest(), bumped_deadline.signing_digest());
	}
}
