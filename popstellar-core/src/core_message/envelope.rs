//! Message envelope
//!
//! Signed, hash-chained wrapper around an opaque payload:
//!
//! ```json
//! {
//!     "data": "<base64url payload>",
//!     "sender": "<base64url public key>",
//!     "signature": "<base64url signature over the payload bytes>",
//!     "message_id": "<base64url Hash(data, signature)>",
//!     "witness_signatures": [{ "witness": "...", "signature": "..." }]
//! }
//! ```
//!
//! An envelope is immutable. Adding a witness returns a new envelope with the
//! same `message_id`.

use super::keys::{MessageSigner, PublicKey, Signature};
use super::witness::WitnessSignature;
use super::{IntegrityError, MessageError};
use crate::core_codec::{Base64UrlData, Hash};
use crate::core_registry::MessageData;
use serde::{Deserialize, Serialize};

/// Wire representation of a signed message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEnvelope {
    data: Base64UrlData,
    sender: PublicKey,
    signature: Signature,
    message_id: Hash,
    witness_signatures: Vec<WitnessSignature>,
}

impl MessageEnvelope {
    /// Sign a payload and compute its message id
    pub fn from_payload<S>(payload: &[u8], signer: &S) -> Result<Self, MessageError>
    where
        S: MessageSigner + ?Sized,
    {
        let data = Base64UrlData::encode(payload);
        let signature = signer.sign(data.as_bytes())?;
        let message_id = Self::compute_message_id(&data, &signature);

        Ok(MessageEnvelope {
            data,
            sender: signer.public_key(),
            signature,
            message_id,
            witness_signatures: Vec::new(),
        })
    }

    /// Serialize a JSON payload and sign it
    pub fn from_json<S>(payload: &serde_json::Value, signer: &S) -> Result<Self, MessageError>
    where
        S: MessageSigner + ?Sized,
    {
        let bytes = serde_json::to_vec(payload)
            .map_err(|e| MessageError::Payload(format!("Failed to serialize payload: {}", e)))?;
        Self::from_payload(&bytes, signer)
    }

    /// Sign a typed message data payload
    pub fn from_data<S>(data: &dyn MessageData, signer: &S) -> Result<Self, MessageError>
    where
        S: MessageSigner + ?Sized,
    {
        Self::from_json(&data.to_json(), signer)
    }

    /// Reassemble an envelope from its wire fields without checking it
    ///
    /// Call `verify` before trusting the result.
    pub fn from_parts(
        data: Base64UrlData,
        sender: PublicKey,
        signature: Signature,
        message_id: Hash,
        witness_signatures: Vec<WitnessSignature>,
    ) -> Self {
        MessageEnvelope {
            data,
            sender,
            signature,
            message_id,
            witness_signatures,
        }
    }

    /// `Hash(data_text, signature_text)`
    pub fn compute_message_id(data: &Base64UrlData, signature: &Signature) -> Hash {
        Hash::from_string_array([data.as_str(), signature.as_str()])
    }

    /// Check the id, the sender signature and every witness signature
    pub fn verify(&self) -> Result<(), IntegrityError> {
        let expected = Self::compute_message_id(&self.data, &self.signature);
        if expected != self.message_id {
            return Err(IntegrityError::MessageIdMismatch {
                expected: expected.to_string(),
                actual: self.message_id.to_string(),
            });
        }

        if !self.sender.verify(self.data.as_bytes(), &self.signature) {
            return Err(IntegrityError::InvalidSignature {
                sender: self.sender.to_string(),
            });
        }

        for witness in &self.witness_signatures {
            witness.verify(&self.message_id)?;
        }

        Ok(())
    }

    /// `verify` as a boolean
    pub fn is_valid(&self) -> bool {
        self.verify().is_ok()
    }

    /// New envelope with one more witness signature
    ///
    /// Rejects signatures that do not verify over this `message_id` and
    /// witnesses that already signed.
    pub fn with_added_witness(&self, witness: WitnessSignature) -> Result<Self, MessageError> {
        if self
            .witness_signatures
            .iter()
            .any(|existing| existing.witness == witness.witness)
        {
            return Err(MessageError::DuplicateWitness(witness.witness.to_string()));
        }

        witness
            .verify(&self.message_id)
            .map_err(|e| MessageError::RejectedWitness(e.to_string()))?;

        let mut next = self.clone();
        next.witness_signatures.push(witness);
        Ok(next)
    }

    /// Payload bytes
    pub fn decoded_payload(&self) -> &[u8] {
        self.data.as_bytes()
    }

    /// Payload parsed as JSON
    pub fn payload_json(&self) -> Result<serde_json::Value, MessageError> {
        serde_json::from_slice(self.data.as_bytes())
            .map_err(|e| MessageError::Payload(format!("Payload is not JSON: {}", e)))
    }

    pub fn data(&self) -> &Base64UrlData {
        &self.data
    }

    pub fn sender(&self) -> &PublicKey {
        &self.sender
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn message_id(&self) -> &Hash {
        &self.message_id
    }

    pub fn witness_signatures(&self) -> &[WitnessSignature] {
        &self.witness_signatures
    }
}
