//! Registry stub shared by the pipeline tests.

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use fid_registry::{
	ConfirmationPolicy, RegistryError, RegistryInterface, RegistryService,
};
use fid_types::{Signature, TransactionHash, TransactionReceipt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Call counters observable after the mock has been boxed away.
#[derive(Default)]
pub struct Counters {
	nonce_calls: AtomicUsize,
	submit_calls: AtomicUsize,
	receipt_polls: AtomicUsize,
}

impl Counters {
	pub fn nonce_calls(&self) -> usize {
		self.nonce_calls.load(Ordering::SeqCst)
	}

	pub fn submit_calls(&self) -> usize {
		self.submit_calls.load(Ordering::SeqCst)
	}

	pub fn receipt_polls(&self) -> usize {
		self.receipt_polls.load(Ordering::SeqCst)
	}
}

/// Configurable in-memory registry double.
pub struct MockRegistry {
	nonce: U256,
	fail_nonce: bool,
	submit_error: Option<String>,
	receipt_misses: usize,
	receipt_success: bool,
	counters: Arc<Counters>,
}

impl MockRegistry {
	pub fn new() -> Self {
		Self {
			nonce: U256::ZERO,
			fail_nonce: false,
			submit_error: None,
			receipt_misses: 0,
			receipt_success: true,
			counters: Arc::new(Counters::default()),
		}
	}

	pub fn with_nonce(mut self, nonce: U256) -> Self {
		self.nonce = nonce;
		self
	}

	pub fn with_failing_nonce(mut self) -> Self {
		self.fail_nonce = true;
		self
	}

	pub fn with_submit_error(mut self, message: &str) -> Self {
		self.submit_error = Some(message.to_string());
		self
	}

	/// Makes the first `misses` receipt polls report no receipt yet.
	pub fn with_receipt_misses(mut self, misses: usize) -> Self {
		self.receipt_misses = misses;
		self
	}

	pub fn with_reverting_receipt(mut self) -> Self {
		self.receipt_success = false;
		self
	}

	/// Wraps the mock in a [`RegistryService`] with a test-speed policy,
	/// handing back the shared counters.
	pub fn into_service(self) -> (RegistryService, Arc<Counters>) {
		let counters = Arc::clone(&self.counters);
		let service = RegistryService::new(
			Box::new(self),
			ConfirmationPolicy {
				confirmations: 1,
				poll_interval: Duration::from_millis(5),
				timeout: Duration::from_millis(500),
			},
		);
		(service, counters)
	}
}

#[async_trait]
impl RegistryInterface for MockRegistry {
	async fn nonce_of(&self, _account: Address) -> Result<U256, RegistryError> {
		self.counters.nonce_calls.fetch_add(1, Ordering::SeqCst);
		if self.fail_nonce {
			return Err(RegistryError::Network("nonce read refused".to_string()));
		}
		Ok(self.nonce)
	}

	async fn custody_of(&self, _fid: u64) -> Result<Address, RegistryError> {
		Ok(Address::from([0xcc; 20]))
	}

	async fn recovery_of(&self, _fid: u64) -> Result<Address, RegistryError> {
		Ok(Address::from([0xdd; 20]))
	}

	async fn submit_transfer(
		&self,
		_to: Address,
		_deadline: u64,
		_sig: &Signature,
	) -> Result<TransactionHash, RegistryError> {
		self.counters.submit_calls.fetch_add(1, Ordering::SeqCst);
		match &self.submit_error {
			Some(message) => Err(RegistryError::TransactionFailed(message.clone())),
			None => Ok(TransactionHash(vec![0xaa; 32])),
		}
	}

	async fn submit_recover(
		&self,
		_from: Address,
		_to: Address,
		_deadline: u64,
		_sig: &Signature,
	) -> Result<TransactionHash, RegistryError> {
		self.counters.submit_calls.fetch_add(1, Ordering::SeqCst);
		match &self.submit_error {
			Some(message) => Err(RegistryError::TransactionFailed(message.clone())),
			None => Ok(TransactionHash(vec![0xbb; 32])),
		}
	}

	async fn submit_change_recovery(
		&self,
		_recovery: Address,
	) -> Result<TransactionHash, RegistryError> {
		self.counters.submit_calls.fetch_add(1, Ordering::SeqCst);
		Ok(TransactionHash(vec![0xcc; 32]))
	}

	async fn get_receipt(
		&self,
		hash: &TransactionHash,
	) -> Result<TransactionReceipt, RegistryError> {
		let polls = self.counters.receipt_polls.fetch_add(1, Ordering::SeqCst);
		if polls < self.receipt_misses {
			return Err(RegistryError::ReceiptUnavailable);
		}
		Ok(TransactionReceipt {
			hash: hash.clone(),
			block_number: 100,
			success: self.receipt_success,
		})
	}

	async fn block_number(&self) -> Result<u64, RegistryError> {
		Ok(100)
	}
}
