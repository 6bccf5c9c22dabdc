//! Witness signatures
//!
//! A witness attests to having seen a message by signing its `message_id`.
//! The signature covers the raw digest bytes, not the base64url text.

use super::keys::{KeyPair, PublicKey, Signature};
use super::IntegrityError;
use crate::core_codec::Hash;
use serde::{Deserialize, Serialize};

/// A witness key and its signature over some message id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessSignature {
    /// Witness public key
    pub witness: PublicKey,
    /// Signature over the message id bytes
    pub signature: Signature,
}

impl WitnessSignature {
    /// Pair an existing signature with its witness key
    pub fn new(witness: PublicKey, signature: Signature) -> Self {
        WitnessSignature { witness, signature }
    }

    /// Sign `message_id` as a witness
    pub fn sign(witness: &KeyPair, message_id: &Hash) -> Self {
        WitnessSignature {
            witness: witness.public_key().clone(),
            signature: witness.sign(message_id.as_bytes()),
        }
    }

    /// Check this signature against a specific message id
    pub fn verify(&self, message_id: &Hash) -> Result<(), IntegrityError> {
        if self.witness.verify(message_id.as_bytes(), &self.signature) {
            Ok(())
        } else {
            Err(IntegrityError::InvalidWitnessSignature {
                witness: self.witness.to_string(),
            })
        }
    }
}
