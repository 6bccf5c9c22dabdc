//! Message integrity module
//!
//! Builds and checks the signed, hash-chained envelope every protocol message
//! travels in. A message is only trusted after `MessageEnvelope::verify`
//! succeeds; there is no partial trust.

mod envelope;
mod keys;
mod witness;

pub use envelope::MessageEnvelope;
pub use keys::{
    KeyPair, MessageSigner, PrivateKey, PublicKey, Signature, PUBLIC_KEY_LENGTH,
    SIGNATURE_LENGTH,
};
pub use witness::WitnessSignature;

use crate::core_codec::CodecError;
use thiserror::Error;

/// Result type for envelope operations
pub type MessageResult<T> = Result<T, MessageError>;

/// An envelope failed its integrity checks
///
/// Messages failing these checks are dropped, never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    #[error("message_id is wrong: expected {expected}, found {actual}")]
    MessageIdMismatch { expected: String, actual: String },

    #[error("Invalid signature from sender {sender}")]
    InvalidSignature { sender: String },

    #[error("Invalid witness signature from {witness}")]
    InvalidWitnessSignature { witness: String },
}

/// Errors raised while building or extending envelopes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    #[error(transparent)]
    Decode(#[from] CodecError),

    #[error(transparent)]
    Integrity(#[from] IntegrityError),

    /// A witness signature did not verify over the message id
    #[error("Witness signature rejected: {0}")]
    RejectedWitness(String),

    #[error("Witness {0} already signed this message")]
    DuplicateWitness(String),

    #[error("Invalid key material: {0}")]
    InvalidKey(String),

    #[error("Signer failed: {0}")]
    Signer(String),

    #[error("Invalid payload: {0}")]
    Payload(String),
}
