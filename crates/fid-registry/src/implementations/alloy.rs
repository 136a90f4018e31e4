//! Alloy-backed registry implementation.
//!
//! Submits and monitors transactions on the registry's EVM chain using the
//! Alloy provider stack. View calls are encoded by hand through fid-codec;
//! write calls are signed by the provider's wallet filler.

use crate::{RegistryError, RegistryInterface};
use alloy_network::EthereumWallet;
use alloy_primitives::{Address, FixedBytes, U256};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use alloy_transport_http::Http;
use async_trait::async_trait;
use fid_codec::{
	change_recovery_address_calldata, custody_of_calldata, nonces_calldata, recover_calldata,
	recovery_of_calldata, transfer_calldata,
};
use fid_types::{with_0x_prefix, Signature, TransactionHash, TransactionReceipt};
use std::sync::Arc;

/// Alloy-based registry client for one deployment.
///
/// Holds a single provider for the configured chain; the wallet passed at
/// construction signs every write. Read-only use works with any wallet.
pub struct AlloyRegistry {
	provider: Arc<dyn Provider<Http<reqwest::Client>> + Send + Sync>,
	registry: Address,
	chain_id: u64,
}

impl AlloyRegistry {
	/// Connects to an RPC endpoint and binds the client to the registry
	/// contract on the given chain.
	pub fn connect(
		rpc_url: &str,
		chain_id: u64,
		registry: Address,
		signer: PrivateKeySigner,
	) -> Result<Self, RegistryError> {
		let url = rpc_url
			.parse()
			.map_err(|e| RegistryError::Network(format!("Invalid RPC URL: {}", e)))?;

		let chain_signer = signer.with_chain_id(Some(chain_id));
		let wallet = EthereumWallet::from(chain_signer);

		let provider = ProviderBuilder::new()
			.with_recommended_fillers()
			.wallet(wallet)
			.on_http(url);

		provider
			.client()
			.set_poll_interval(std::time::Duration::from_secs(7));

		Ok(Self {
			provider: Arc::new(provider) as Arc<dyn Provider<Http<reqwest::Client>> + Send + Sync>,
			registry,
			chain_id,
		})
	}

	/// Performs a read-only call against the registry contract, returning
	/// the raw return data.
	async fn view(&self, call_data: Vec<u8>) -> Result<Vec<u8>, RegistryError> {
		let request = TransactionRequest::default()
			.to(self.registry)
			.input(call_data.into());

		let result = self
			.provider
			.call(&request)
			.await
			.map_err(|e| RegistryError::Network(format!("View call failed: {}", e)))?;

		Ok(result.to_vec())
	}

	/// Broadcasts a state-mutating call against the registry contract.
	async fn send(&self, call_data: Vec<u8>) -> Result<TransactionHash, RegistryError> {
		let request = TransactionRequest::default()
			.to(self.registry)
			.input(call_data.into());

		// Surface the node's message verbatim: a simulation revert here is
		// the user's answer, not something to rephrase.
		let pending_tx = self
			.provider
			.send_transaction(request)
			.await
			.map_err(|e| RegistryError::TransactionFailed(e.to_string()))?;

		let tx_hash = *pending_tx.tx_hash();
		let hash_str = with_0x_prefix(&hex::encode(tx_hash.0));
		tracing::info!(tx_hash = %hash_str, chain_id = self.chain_id, "Submitted transaction");

		Ok(TransactionHash(tx_hash.0.to_vec()))
	}
}

#[async_trait]
impl RegistryInterface for AlloyRegistry {
	async fn nonce_of(&self, account: Address) -> Result<U256, RegistryError> {
		let result = self.view(nonces_calldata(account)).await?;
		if result.len() < 32 {
			return Err(RegistryError::Network("Invalid nonces response".to_string()));
		}
		Ok(U256::from_be_slice(&result[..32]))
	}

	async fn custody_of(&self, fid: u64) -> Result<Address, RegistryError> {
		let result = self.view(custody_of_calldata(fid)).await?;
		if result.len() < 32 {
			return Err(RegistryError::Network(
				"Invalid custodyOf response".to_string(),
			));
		}
		Ok(Address::from_slice(&result[12..32]))
	}

	async fn recovery_of(&self, fid: u64) -> Result<Address, RegistryError> {
		let result = self.view(recovery_of_calldata(fid)).await?;
		if result.len() < 32 {
			return Err(RegistryError::Network(
				"Invalid recoveryOf response".to_string(),
			));
		}
		Ok(Address::from_slice(&result[12..32]))
	}

	async fn submit_transfer(
		&self,
		to: Address,
		deadline: u64,
		sig: &Signature,
	) -> Result<TransactionHash, RegistryError> {
		self.send(transfer_calldata(to, deadline, sig.as_bytes()))
			.await
	}

	async fn submit_recover(
		&self,
		from: Address,
		to: Address,
		deadline: u64,
		sig: &Signature,
	) -> Result<TransactionHash, RegistryError> {
		self.send(recover_calldata(from, to, deadline, sig.as_bytes()))
			.await
	}

	async fn submit_change_recovery(
		&self,
		recovery: Address,
	) -> Result<TransactionHash, RegistryError> {
		self.send(change_recovery_address_calldata(recovery)).await
	}

	async fn get_receipt(
		&self,
		hash: &TransactionHash,
	) -> Result<TransactionReceipt, RegistryError> {
		let tx_hash = FixedBytes::<32>::from_slice(&hash.0);

		match self.provider.get_transaction_receipt(tx_hash).await {
			Ok(Some(receipt)) => Ok(TransactionReceipt {
				hash: TransactionHash(receipt.transaction_hash.0.to_vec()),
				block_number: receipt.block_number.unwrap_or(0),
				success: receipt.status(),
			}),
			// Not yet mined: a polling artifact, not a failure.
			Ok(None) => Err(RegistryError::ReceiptUnavailable),
			Err(e) => {
				let message = e.to_string();
				// Some nodes answer an early receipt query with a lookup
				// error ("block not found") instead of a null receipt.
				if message.contains("not found") {
					Err(RegistryError::ReceiptUnavailable)
				} else {
					Err(RegistryError::Network(format!(
						"Failed to get receipt: {}",
						message
					)))
				}
			}
		}
	}

	async fn block_number(&self) -> Result<u64, RegistryError> {
		self.provider
			.get_block_number()
			.await
			.map_err(|e| RegistryError::Network(format!("Failed to get block number: {}", e)))
	}
}
