//! The ephemeral wallet generator.
//!
//! Used when transferring custody to a brand-new address: a fresh mnemonic
//! is generated, its first account becomes the new custody address, and the
//! same account signs the transfer authorization.

use crate::{LocalWallet, SignerError};
use alloy_primitives::Address;
use alloy_signer_local::coins_bip39::{English, Mnemonic};
use std::fmt;
use zeroize::Zeroizing;

/// Number of words in a generated mnemonic.
pub const MNEMONIC_WORDS: usize = 12;

/// A freshly generated wallet: a BIP-39 English mnemonic and the address it
/// derives at the default Ethereum path.
///
/// The mnemonic is held in zeroizing memory and is never persisted or logged
/// here. Showing it to the user is the one irreversible disclosure in the
/// system; the display layer owns that decision and the accompanying
/// warning.
pub struct EphemeralWallet {
	mnemonic: Zeroizing<String>,
	address: Address,
}

impl EphemeralWallet {
	/// Generates a new wallet from the OS random source.
	///
	/// The mnemonic uses the standard English wordlist and checksum, so it
	/// is importable by standard wallet software.
	pub fn generate() -> Result<Self, SignerError> {
		let mut rng = rand::thread_rng();
		let mnemonic = Mnemonic::<English>::new_with_count(&mut rng, MNEMONIC_WORDS)
			.map_err(|e| SignerError::Implementation(e.to_string()))?;
		let phrase = Zeroizing::new(mnemonic.to_phrase());
		let wallet = LocalWallet::from_mnemonic(&phrase)?;
		let address = wallet.address();
		Ok(Self {
			mnemonic: phrase,
			address,
		})
	}

	/// The derived account address.
	pub fn address(&self) -> Address {
		self.address
	}

	/// The mnemonic phrase. Handle with care; callers decide whether and
	/// how to disclose it.
	pub fn mnemonic(&self) -> &str {
		&self.mnemonic
	}

	/// Consumes the wallet, returning the mnemonic in zeroizing memory.
	pub fn into_mnemonic(self) -> Zeroizing<String> {
		self.mnemonic
	}

	/// A signer for the derived account.
	pub fn signer(&self) -> Result<LocalWallet, SignerError> {
		LocalWallet::from_mnemonic(&self.mnemonic)
	}
}

impl fmt::Debug for EphemeralWallet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EphemeralWallet")
			.field("mnemonic", &"***REDACTED***")
			.field("address", &self.address)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn generates_twelve_importable_words() {
		let wallet = EphemeralWallet::generate().unwrap();
		assert_eq!(wallet.mnemonic().split_whitespace().count(), MNEMONIC_WORDS);
		// Re-deriving from the phrase lands on the same address.
		let rederived = LocalWallet::from_mnemonic(wallet.mnemonic()).unwrap();
		assert_eq!(rederived.address(), wallet.address());
	}

	#[test]
	fn generations_are_independent() {
		let a = EphemeralWallet::generate().unwrap();
		let b = EphemeralWallet::generate().unwrap();
		assert_ne!(a.mnemonic(), b.mnemonic());
		assert_ne!(a.address(), b.address());
	}

	#[test]
	fn debug_never_prints_the_mnemonic() {
		let wallet = EphemeralWallet::generate().unwrap();
		let rendered = format!("{:?}", wallet);
		assert!(!rendered.contains(wallet.mnemonic()));
	}
}
