//! The submission state machine.
//!
//! Drives one attempt to put a stored authorization on chain:
//! `Idle -> Submitting -> Broadcast -> Confirming -> Confirmed | Failed`.
//! Transitions are one-way and there is no automatic retry; a failed attempt
//! ends the machine's run and a new call starts a fresh attempt, which
//! re-validates every precondition against the current session first.

use crate::FlowError;
use fid_registry::{RegistryError, RegistryService};
use fid_types::{parse_address, Session, TransactionHash, TransactionReceipt};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

/// Status of the current (or last) submission attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionStatus {
	/// No attempt in progress.
	Idle,
	/// Preconditions passed; the write call is being sent.
	Submitting,
	/// The node accepted the transaction.
	Broadcast(TransactionHash),
	/// Submitted, awaiting confirmation. A receipt that is not yet
	/// available keeps the machine here; that is a polling artifact, not
	/// a failure.
	Confirming(TransactionHash),
	/// The receipt reported success. Terminal.
	Confirmed(TransactionReceipt),
	/// The transaction reverted, the chain rejected it, or the watcher
	/// gave up. Terminal; carries the underlying message verbatim.
	Failed(String),
}

impl SubmissionStatus {
	/// True for states that end an attempt.
	pub fn is_terminal(&self) -> bool {
		matches!(
			self,
			SubmissionStatus::Confirmed(_) | SubmissionStatus::Failed(_)
		)
	}
}

/// Which registry write to submit. The target address, deadline, and
/// signature always come from the session record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitKind {
	/// `transfer(to, deadline, sig)`, sent from the custody address.
	Transfer,
	/// `recover(from, to, deadline, sig)`, sent from the recovery address.
	Recover { from: alloy_primitives::Address },
}

/// Drives submission attempts and publishes their status.
pub struct Submission {
	registry: Arc<RegistryService>,
	status_tx: watch::Sender<SubmissionStatus>,
	attempt: Mutex<()>,
}

impl Submission {
	pub fn new(registry: Arc<RegistryService>) -> Self {
		let (status_tx, _) = watch::channel(SubmissionStatus::Idle);
		Self {
			registry,
			status_tx,
			attempt: Mutex::new(()),
		}
	}

	/// Subscribes to status updates for display.
	pub fn subscribe(&self) -> watch::Receiver<SubmissionStatus> {
		self.status_tx.subscribe()
	}

	/// The current status.
	pub fn status(&self) -> SubmissionStatus {
		self.status_tx.borrow().clone()
	}

	/// Runs one submission attempt from the session record.
	///
	/// Preconditions checked before anything is sent: no attempt already in
	/// flight, a well-formed target address, a stored signature with its
	/// deadline, and a signature that was produced for the current target;
	/// a target changed after signing refuses with
	/// [`FlowError::StaleSignature`] until a new signature exists.
	pub async fn submit(
		&self,
		session: &Session,
		kind: SubmitKind,
	) -> Result<TransactionReceipt, FlowError> {
		let _guard = self
			.attempt
			.try_lock()
			.map_err(|_| FlowError::AlreadySubmitting)?;

		let target = session
			.to_address
			.as_deref()
			.ok_or(FlowError::InvalidAddress)?;
		let to = parse_address(target).ok_or(FlowError::InvalidAddress)?;

		let signature = session
			.signature
			.as_ref()
			.ok_or(FlowError::MissingSignature)?;
		let deadline = session.timestamp.ok_or(FlowError::MissingSignature)?;

		if !session.signature_matches_target() {
			return Err(FlowError::StaleSignature);
		}

		self.set(SubmissionStatus::Submitting);

		let sent = match kind {
			SubmitKind::Transfer => self.registry.submit_transfer(to, deadline, signature).await,
			SubmitKind::Recover { from } => {
				self.registry
					.submit_recover(from, to, deadline, signature)
					.await
			}
		};

		let hash = match sent {
			Ok(hash) => hash,
			Err(e) => {
				// Surfaced verbatim: the node's revert reason is the most
				// useful thing the user will see.
				let message = e.to_string();
				self.set(SubmissionStatus::Failed(message.clone()));
				return Err(match e {
					RegistryError::Network(m) => FlowError::Rpc(m),
					_ => FlowError::ConfirmationFailed(message),
				});
			}
		};

		self.set(SubmissionStatus::Broadcast(hash.clone()));
		tracing::info!(tx_hash = %hash, "Transaction broadcast, awaiting confirmation");
		self.set(SubmissionStatus::Confirming(hash.clone()));

		match self.registry.wait_for_confirmation(&hash).await {
			Ok(receipt) if receipt.success => {
				tracing::info!(tx_hash = %hash, block = receipt.block_number, "Confirmed");
				self.set(SubmissionStatus::Confirmed(receipt.clone()));
				Ok(receipt)
			}
			Ok(_) => {
				let message = "Transaction reverted".to_string();
				self.set(SubmissionStatus::Failed(message.clone()));
				Err(FlowError::ConfirmationFailed(message))
			}
			Err(e) => {
				let message = e.to_string();
				self.set(SubmissionStatus::Failed(message.clone()));
				Err(FlowError::ConfirmationFailed(message))
			}
		}
	}

	fn set(&self, status: SubmissionStatus) {
		self.status_tx.send_replace(status);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::MockRegistry;
	use fid_types::Signature;

	const TARGET_A: &str = "0x00000000000000000000000000000000000000aa";
	const TARGET_B: &str = "0x00000000000000000000000000000000000000bb";

	fn signed_session(target: &str, signed_for: &str) -> Session {
		Session {
			fid: Some(1000),
			to_address: Some(target.to_string()),
			signature: Some(Signature(vec![0x1b; 65])),
			timestamp: Some(1_700_000_000),
			signed_for: Some(signed_for.to_string()),
			..Default::default()
		}
	}

	#[tokio::test]
	async fn happy_path_transfer_ends_confirmed() {
		let (service, counters) = MockRegistry::new().into_service();
		let submission = Submission::new(Arc::new(service));

		let receipt = submission
			.submit(&signed_session(TARGET_A, TARGET_A), SubmitKind::Transfer)
			.await
			.unwrap();
		assert!(receipt.success);
		assert_eq!(counters.submit_calls(), 1);
		assert!(matches!(
			submission.status(),
			SubmissionStatus::Confirmed(_)
		));
	}

	#[tokio::test]
	async fn changed_target_refuses_with_stale_signature() {
		let (service, counters) = MockRegistry::new().into_service();
		let submission = Submission::new(Arc::new(service));

		let err = submission
			.submit(&signed_session(TARGET_B, TARGET_A), SubmitKind::Transfer)
			.await
			.unwrap_err();
		assert!(matches!(err, FlowError::StaleSignature));
		// Nothing was sent, and the machine never left Idle.
		assert_eq!(counters.submit_calls(), 0);
		assert_eq!(submission.status(), SubmissionStatus::Idle);
	}

	#[tokio::test]
	async fn missing_signature_is_refused() {
		let (service, _) = MockRegistry::new().into_service();
		let submission = Submission::new(Arc::new(service));

		let mut session = signed_session(TARGET_A, TARGET_A);
		session.signature = None;
		let err = submission
			.submit(&session, SubmitKind::Transfer)
			.await
			.unwrap_err();
		assert!(matches!(err, FlowError::MissingSignature));
	}

	#[tokio::test]
	async fn malformed_target_is_refused() {
		let (service, counters) = MockRegistry::new().into_service();
		let submission = Submission::new(Arc::new(service));

		let mut session = signed_session(TARGET_A, TARGET_A);
		session.to_address = Some("not-an-address".to_string());
		session.signed_for = Some("not-an-address".to_string());
		let err = submission
			.submit(&session, SubmitKind::Transfer)
			.await
			.unwrap_err();
		assert!(matches!(err, FlowError::InvalidAddress));
		assert_eq!(counters.submit_calls(), 0);
	}

	#[tokio::test]
	async fn transient_receipt_gap_stays_confirming_then_confirms() {
		let (service, counters) = MockRegistry::new().with_receipt_misses(3).into_service();
		let submission = Arc::new(Submission::new(Arc::new(service)));

		let mut status_rx = submission.subscribe();
		let watcher = tokio::spawn(async move {
			let mut seen = Vec::new();
			loop {
				if status_rx.changed().await.is_err() {
					break;
				}
				let status = status_rx.borrow_and_update().clone();
				let terminal = status.is_terminal();
				seen.push(status);
				if terminal {
					break;
				}
			}
			seen
		});

		let receipt = submission
			.submit(&signed_session(TARGET_A, TARGET_A), SubmitKind::Transfer)
			.await
			.unwrap();
		assert!(receipt.success);
		// The first poll missed, so the receipt was fetched at least twice.
		assert!(counters.receipt_polls() >= 2);

		let seen = watcher.await.unwrap();
		assert!(seen
			.iter()
			.any(|s| matches!(s, SubmissionStatus::Confirming(_))));
		assert!(!seen.iter().any(|s| matches!(s, SubmissionStatus::Failed(_))));
		assert!(matches!(
			seen.last(),
			Some(SubmissionStatus::Confirmed(_))
		));
	}

	#[tokio::test]
	async fn synchronous_broadcast_failure_surfaces_verbatim() {
		let (service, _) = MockRegistry::new()
			.with_submit_error("execution reverted: Unauthorized")
			.into_service();
		let submission = Submission::new(Arc::new(service));

		let err = submission
			.submit(&signed_session(TARGET_A, TARGET_A), SubmitKind::Transfer)
			.await
			.unwrap_err();
		assert!(matches!(err, FlowError::ConfirmationFailed(_)));
		match submission.status() {
			SubmissionStatus::Failed(message) => {
				assert!(message.contains("execution reverted: Unauthorized"));
			}
			other => panic!("expected Failed, got {:?}", other),
		}
	}

	#[tokio::test]
	async fn reverted_receipt_ends_failed() {
		let (service, _) = MockRegistry::new().with_reverting_receipt().into_service();
		let submission = Submission::new(Arc::new(service));

		let err = submission
			.submit(&signed_session(TARGET_A, TARGET_A), SubmitKind::Recover {
				from: TARGET_B.parse().unwrap(),
			})
			.await
			.unwrap_err();
		assert!(matches!(err, FlowError::ConfirmationFailed(_)));
		assert!(matches!(submission.status(), SubmissionStatus::Failed(_)));
	}

	#[tokio::test]
	async fn concurrent_attempts_are_refused() {
		// A large miss count keeps the first attempt polling while the
		// second one knocks.
		let (service, _) = MockRegistry::new().with_receipt_misses(50).into_service();
		let submission = Arc::new(Submission::new(Arc::new(service)));

		let first = Arc::clone(&submission);
		let running = tokio::spawn(async move {
			first
				.submit(&signed_session(TARGET_A, TARGET_A), SubmitKind::Transfer)
				.await
		});

		// Give the first attempt time to take the guard.
		tokio::time::sleep(std::time::Duration::from_millis(20)).await;
		let err = submission
			.submit(&signed_session(TARGET_A, TARGET_A), SubmitKind::Transfer)
			.await
			.unwrap_err();
		assert!(matches!(err, FlowError::AlreadySubmitting));

		running.abort();
	}
}
