//! Protocol hash
//!
//! Every identifier in the protocol (message ids, LAO ids, roll call ids, ...)
//! is a SHA-256 digest over a list of strings. Each string is prefixed with
//! its UTF-8 byte length in decimal before being fed to the digest, so
//! `["ab", "c"]` hashes `"2ab1c"`. Peers that drop the prefix compute
//! different ids and reject every message we send.

use super::{base64url, CodecError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// A digest carried as raw bytes and rendered as base64url text
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash(Vec<u8>);

impl Hash {
    /// Wrap raw digest bytes
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Hash(bytes.into())
    }

    /// Parse the base64url text form
    pub fn from_base64url(text: &str) -> Result<Self, CodecError> {
        Ok(Hash(base64url::decode(text)?))
    }

    /// SHA-256 over raw bytes, with no framing
    pub fn digest(bytes: impl AsRef<[u8]>) -> Self {
        Hash(Sha256::digest(bytes.as_ref()).to_vec())
    }

    /// Protocol hash of a single string
    pub fn from_string(value: &str) -> Self {
        Self::from_string_array([value])
    }

    /// Protocol hash of an ordered list of strings
    pub fn from_string_array<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut hasher = Sha256::new();
        for part in parts {
            let part = part.as_ref();
            hasher.update(part.len().to_string().as_bytes());
            hasher.update(part.as_bytes());
        }
        Hash(hasher.finalize().to_vec())
    }

    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// base64url text form
    pub fn to_base64url(&self) -> String {
        base64url::encode(&self.0)
    }
}

impl FromStr for Hash {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hash::from_base64url(s)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64url())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.to_base64url())
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64url())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Hash::from_base64url(&text).map_err(serde::de::Error::custom)
    }
}
