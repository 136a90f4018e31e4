//! Recovery and transfer signing pipeline.
//!
//! This crate ties the codec, signer, registry, and session crates into the
//! three stateful pieces of the tool: the nonce & deadline resolver, the
//! signature producer, and the submission state machine. All failures cross
//! these boundaries as typed [`FlowError`] results so the caller can render
//! per-step feedback; nothing here panics or retries on its own.

/// Flow-level error taxonomy.
pub mod error;
/// The signature producer.
pub mod producer;
/// Nonce and deadline resolution.
pub mod resolver;
/// The submission state machine.
pub mod submission;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::FlowError;
pub use producer::{PreparedTransfer, SignatureProducer, SignedAuthorization};
pub use resolver::{resolve, NonceSnapshot, Resolved, SIGNATURE_VALIDITY_SECS};
pub use submission::{SubmitKind, Submission, SubmissionStatus};
