//! Local key-based signer implementation.

use crate::{SignerError, SignerInterface};
use alloy_primitives::{Address, B256};
use alloy_signer::Signer;
use alloy_signer_local::{coins_bip39::English, MnemonicBuilder, PrivateKeySigner};
use async_trait::async_trait;
use fid_types::Signature;

/// A signer holding its key in-process.
///
/// Built from a raw private key or a BIP-39 mnemonic. Signs immediately and
/// never rejects; interactive rejection only arises from wallet-backed
/// implementations of [`SignerInterface`].
#[derive(Debug)]
pub struct LocalWallet {
	inner: PrivateKeySigner,
}

impl LocalWallet {
	/// Creates a wallet from a hex-encoded private key (0x prefix optional).
	pub fn from_private_key(key: &str) -> Result<Self, SignerError> {
		let inner: PrivateKeySigner = key
			.trim()
			.parse()
			.map_err(|_| SignerError::InvalidKey("invalid private key format".to_string()))?;
		Ok(Self { inner })
	}

	/// Creates a wallet from a BIP-39 mnemonic phrase at the default
	/// Ethereum derivation path.
	pub fn from_mnemonic(phrase: &str) -> Result<Self, SignerError> {
		let inner = MnemonicBuilder::<English>::default()
			.phrase(phrase.trim())
			.build()
			.map_err(|e| SignerError::InvalidKey(e.to_string()))?;
		Ok(Self { inner })
	}

	/// The wallet's address.
	pub fn address(&self) -> Address {
		self.inner.address()
	}

	/// Clones the underlying key signer for provider-level transaction
	/// signing. Broadcast transactions are signed by the same key that
	/// signs typed data.
	pub fn provider_signer(&self) -> PrivateKeySigner {
		self.inner.clone()
	}
}

#[async_trait]
impl SignerInterface for LocalWallet {
	async fn address(&self) -> Result<Address, SignerError> {
		Ok(self.inner.address())
	}

	async fn sign_digest(&self, digest: B256) -> Result<Signature, SignerError> {
		let sig = self
			.inner
			.sign_hash(&digest)
			.await
			.map_err(|e| SignerError::SigningFailed(e.to_string()))?;
		Ok(Signature(sig.as_bytes().to_vec()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use fid_codec::{RegistryOperation, TypedPayload};

	// Well-known development key (anvil account #0).
	const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
	const DEV_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

	fn dev_digest() -> B256 {
		TypedPayload::build(
			RegistryOperation::Transfer,
			1000,
			Address::from([0x01; 20]),
			alloy_primitives::U256::ZERO,
			1_700_000_000,
			10,
			Address::from([0x02; 20]),
		)
		.signing_digest()
	}

	#[test]
	fn derives_known_address_from_private_key() {
		let wallet = LocalWallet::from_private_key(DEV_KEY).unwrap();
		assert_eq!(wallet.address(), DEV_ADDRESS.parse::<Address>().unwrap());
	}

	#[test]
	fn rejects_malformed_private_key() {
		let err = LocalWallet::from_private_key("0x1234").unwrap_err();
		assert!(matches!(err, SignerError::InvalidKey(_)));
	}

	#[test]
	fn rejects_malformed_mnemonic() {
		let err = LocalWallet::from_mnemonic("definitely not twelve valid words").unwrap_err();
		assert!(matches!(err, SignerError::InvalidKey(_)));
	}

	#[tokio::test]
	async fn signature_is_sixty_five_bytes_and_deterministic() {
		let wallet = LocalWallet::from_private_key(DEV_KEY).unwrap();
		let digest = dev_digest();
		let first = wallet.sign_digest(digest).await.unwrap();
		let second = wallet.sign_digest(digest).await.unwrap();
		assert_eq!(first.as_bytes().len(), 65);
		assert_eq!(first, second);
	}

	#[tokio::test]
	async fn signature_recovers_to_the_wallet_address() {
		let wallet = LocalWallet::from_private_key(DEV_KEY).unwrap();
		let digest = dev_digest();
		let sig = wallet.sign_digest(digest).await.unwrap();
		let parsed = alloy_primitives::Signature::try_from(sig.as_bytes()).unwrap();
		let recovered = parsed.recover_address_from_prehash(&digest).unwrap();
		assert_eq!(recovered, wallet.address());
	}
}
