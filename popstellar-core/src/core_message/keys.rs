//! Key material
//!
//! Ed25519 keys and signatures in their wire form. Public keys and signatures
//! travel as base64url text; private keys never leave the process except
//! through the encrypted wallet blobs.
//!
//! Security: `PrivateKey` wraps an `ed25519_dalek::SigningKey`, which is
//! zeroized on drop.

use super::MessageError;
use crate::core_codec::{Base64UrlData, CodecError};
use ed25519_dalek::{Signer as _, SigningKey, Verifier as _, VerifyingKey, SECRET_KEY_LENGTH};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, Zeroizing};

/// Length of an encoded-on-the-wire public key
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Length of an Ed25519 signature
pub const SIGNATURE_LENGTH: usize = 64;

/// Ed25519 public key in its wire form
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicKey(Base64UrlData);

impl PublicKey {
    /// Wrap raw key bytes
    pub fn from_bytes(bytes: &[u8]) -> Self {
        PublicKey(Base64UrlData::encode(bytes))
    }

    /// Parse base64url text
    pub fn parse(text: &str) -> Result<Self, CodecError> {
        Ok(PublicKey(Base64UrlData::parse(text)?))
    }

    /// Raw key bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// base64url text form
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Check `signature` over `msg`
    ///
    /// Returns false for malformed keys or signatures as well as for
    /// signatures that do not verify.
    pub fn verify(&self, msg: &[u8], signature: &Signature) -> bool {
        let key_bytes: [u8; PUBLIC_KEY_LENGTH] = match self.as_bytes().try_into() {
            Ok(bytes) => bytes,
            Err(_) => return false,
        };

        let verifying_key = match VerifyingKey::from_bytes(&key_bytes) {
            Ok(vk) => vk,
            Err(_) => return false,
        };

        let sig = match ed25519_dalek::Signature::from_slice(signature.as_bytes()) {
            Ok(sig) => sig,
            Err(_) => return false,
        };

        verifying_key.verify(msg, &sig).is_ok()
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.as_str())
    }
}

/// Ed25519 signature in its wire form
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(Base64UrlData);

impl Signature {
    /// Wrap raw signature bytes
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Signature(Base64UrlData::encode(bytes))
    }

    /// Parse base64url text
    pub fn parse(text: &str) -> Result<Self, CodecError> {
        Ok(Signature(Base64UrlData::parse(text)?))
    }

    /// Raw signature bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// base64url text form
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.as_str())
    }
}

/// Ed25519 private key
#[derive(Clone)]
pub struct PrivateKey(SigningKey);

impl PrivateKey {
    /// Secret material as `seed || public` (64 bytes), the layout other
    /// clients store
    pub fn to_keypair_bytes(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.0.to_keypair_bytes().to_vec())
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

/// Something able to sign outgoing messages
///
/// Implemented by `KeyPair`; hardware or remote signers plug in here.
pub trait MessageSigner: Send + Sync {
    /// Key the signatures verify under
    fn public_key(&self) -> PublicKey;

    /// Sign raw bytes
    fn sign(&self, msg: &[u8]) -> Result<Signature, MessageError>;
}

/// Ed25519 signing keypair
#[derive(Clone)]
pub struct KeyPair {
    public: PublicKey,
    private: PrivateKey,
}

impl KeyPair {
    /// Generate a fresh random keypair
    pub fn generate() -> Self {
        let mut seed = [0u8; SECRET_KEY_LENGTH];
        rand::thread_rng().fill_bytes(&mut seed);
        let keypair = Self::from_signing_key(SigningKey::from_bytes(&seed));
        seed.zeroize();
        keypair
    }

    /// Build from a 32-byte secret seed
    pub fn from_seed(seed: &[u8; SECRET_KEY_LENGTH]) -> Self {
        Self::from_signing_key(SigningKey::from_bytes(seed))
    }

    /// Build from either a 32-byte seed or 64-byte `seed || public` material
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, MessageError> {
        match bytes.len() {
            32 => {
                let mut seed = [0u8; SECRET_KEY_LENGTH];
                seed.copy_from_slice(bytes);
                let keypair = Self::from_seed(&seed);
                seed.zeroize();
                Ok(keypair)
            }
            64 => {
                let mut material = [0u8; 64];
                material.copy_from_slice(bytes);
                let signing_key = SigningKey::from_keypair_bytes(&material)
                    .map_err(|e| MessageError::InvalidKey(e.to_string()));
                material.zeroize();
                Ok(Self::from_signing_key(signing_key?))
            }
            n => Err(MessageError::InvalidKey(format!(
                "expected 32 or 64 bytes of key material, got {}",
                n
            ))),
        }
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        KeyPair {
            public: PublicKey::from_bytes(signing_key.verifying_key().as_bytes()),
            private: PrivateKey(signing_key),
        }
    }

    /// Public half
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Private half
    pub fn private_key(&self) -> &PrivateKey {
        &self.private
    }

    /// Sign raw bytes
    pub fn sign(&self, msg: &[u8]) -> Signature {
        Signature::from_bytes(&self.private.0.sign(msg).to_bytes())
    }
}

impl MessageSigner for KeyPair {
    fn public_key(&self) -> PublicKey {
        self.public.clone()
    }

    fn sign(&self, msg: &[u8]) -> Result<Signature, MessageError> {
        Ok(KeyPair::sign(self, msg))
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public)
            .finish()
    }
}
