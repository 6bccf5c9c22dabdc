//! Deterministic token derivation
//!
//! SLIP-0010 ed25519 derivation. Every index is hardened.
//!
//! A PoP token lives at `m/888'/0'/<lao_id segments>/<roll_call_id segments>`,
//! where each id is decoded and cut into groups of three bytes; a group
//! becomes the decimal concatenation of its bytes (`[79, 200, 43]` ->
//! `7920043'`). The last group may be shorter.

use super::WalletError;
use crate::core_codec::Hash;
use crate::core_message::KeyPair;
use hmac::{Hmac, Mac};
use sha2::Sha512;
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

type HmacSha512 = Hmac<Sha512>;

/// Purpose level of every token path
pub const PURPOSE: u32 = 888;

/// Account level of every token path
pub const ACCOUNT: u32 = 0;

const HARDENED_OFFSET: u32 = 0x8000_0000;

const ED25519_CURVE: &[u8] = b"ed25519 seed";

/// Bytes of an id folded into one path segment
const SEGMENT_BYTES: usize = 3;

/// A fully hardened derivation path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivationPath {
    indexes: Vec<u32>,
}

impl DerivationPath {
    /// Path of the PoP token of a roll call
    pub fn token_path(lao_id: &Hash, roll_call_id: &Hash) -> Result<Self, WalletError> {
        let mut indexes = vec![PURPOSE, ACCOUNT];
        indexes.extend(Self::id_segments(lao_id)?);
        indexes.extend(Self::id_segments(roll_call_id)?);
        Ok(DerivationPath { indexes })
    }

    fn id_segments(id: &Hash) -> Result<Vec<u32>, WalletError> {
        id.as_bytes()
            .chunks(SEGMENT_BYTES)
            .map(|group| {
                let digits: String = group.iter().map(|b| b.to_string()).collect();
                digits.parse::<u32>().map_err(|e| {
                    WalletError::Derivation(format!("segment {} out of range: {}", digits, e))
                })
            })
            .collect()
    }

    /// Build from raw, not yet hardened, indexes
    pub fn from_indexes(indexes: Vec<u32>) -> Result<Self, WalletError> {
        if let Some(bad) = indexes.iter().find(|i| **i >= HARDENED_OFFSET) {
            return Err(WalletError::Derivation(format!(
                "index {} does not fit a hardened path",
                bad
            )));
        }
        Ok(DerivationPath { indexes })
    }

    pub fn indexes(&self) -> &[u32] {
        &self.indexes
    }

    /// Derive the keypair at this path
    pub fn derive(&self, seed: &[u8]) -> Result<KeyPair, WalletError> {
        let mut node = ExtendedKey::master(seed)?;
        for index in &self.indexes {
            node = node.child(*index)?;
        }
        KeyPair::from_secret_bytes(node.key.as_slice())
            .map_err(|e| WalletError::Cryptographic(e.to_string()))
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for index in &self.indexes {
            write!(f, "/{}'", index)?;
        }
        Ok(())
    }
}

impl FromStr for DerivationPath {
    type Err = WalletError;

    /// Parse `m/<i>'/<j>'/...`; unhardened indexes are rejected
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('/');
        if parts.next() != Some("m") {
            return Err(WalletError::Derivation(format!("path {:?} must start with m", s)));
        }

        let indexes = parts
            .map(|part| {
                part.strip_suffix('\'')
                    .ok_or_else(|| {
                        WalletError::Derivation(format!("segment {:?} is not hardened", part))
                    })?
                    .parse::<u32>()
                    .map_err(|e| WalletError::Derivation(format!("segment {:?}: {}", part, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_indexes(indexes)
    }
}

/// Derive the PoP token of `(lao_id, roll_call_id)` from a root seed
pub fn derive_key_pair(
    seed: &[u8],
    lao_id: &Hash,
    roll_call_id: &Hash,
) -> Result<KeyPair, WalletError> {
    DerivationPath::token_path(lao_id, roll_call_id)?.derive(seed)
}

struct ExtendedKey {
    key: Zeroizing<[u8; 32]>,
    chain_code: Zeroizing<[u8; 32]>,
}

impl ExtendedKey {
    fn master(seed: &[u8]) -> Result<Self, WalletError> {
        Self::from_hmac(ED25519_CURVE, &[seed])
    }

    fn child(&self, index: u32) -> Result<Self, WalletError> {
        let hardened = (index | HARDENED_OFFSET).to_be_bytes();
        let prefix = [0u8];
        Self::from_hmac(
            self.chain_code.as_slice(),
            &[prefix.as_slice(), self.key.as_slice(), hardened.as_slice()],
        )
    }

    fn from_hmac(key: &[u8], parts: &[&[u8]]) -> Result<Self, WalletError> {
        let mut mac = HmacSha512::new_from_slice(key)
            .map_err(|e| WalletError::Cryptographic(format!("HMAC key rejected: {}", e)))?;
        for part in parts {
            mac.update(part);
        }
        let mut output = Zeroizing::new([0u8; 64]);
        output.copy_from_slice(&mac.finalize().into_bytes());

        let mut node = ExtendedKey {
            key: Zeroizing::new([0u8; 32]),
            chain_code: Zeroizing::new([0u8; 32]),
        };
        node.key.copy_from_slice(&output[..32]);
        node.chain_code.copy_from_slice(&output[32..]);
        Ok(node)
    }
}
