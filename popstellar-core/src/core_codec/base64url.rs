//! URL-safe base64 codec
//!
//! Encoding always pads to a multiple of 4 with `=`. Decoding is strict: the
//! standard alphabet (`+`, `/`), missing padding, extra padding and
//! non-canonical trailing bits are all rejected.

use super::CodecError;
use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Encode bytes (or text) as padded URL-safe base64
pub fn encode(bytes: impl AsRef<[u8]>) -> String {
    URL_SAFE.encode(bytes.as_ref())
}

/// Decode padded URL-safe base64 text
pub fn decode(text: &str) -> Result<Vec<u8>, CodecError> {
    URL_SAFE
        .decode(text.as_bytes())
        .map_err(|e| CodecError::Decode(format!("{:?}: {}", text, e)))
}

/// Validated base64url text together with the bytes it encodes
///
/// Serialized as the plain JSON string. Deserializing malformed text fails,
/// so a value of this type always decodes.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Base64UrlData {
    text: String,
    bytes: Vec<u8>,
}

impl Base64UrlData {
    /// Encode raw bytes
    pub fn encode(bytes: impl AsRef<[u8]>) -> Self {
        let bytes = bytes.as_ref().to_vec();
        Base64UrlData {
            text: encode(&bytes),
            bytes,
        }
    }

    /// Parse already-encoded text
    pub fn parse(text: impl Into<String>) -> Result<Self, CodecError> {
        let text = text.into();
        let bytes = decode(&text)?;
        Ok(Base64UrlData { text, bytes })
    }

    /// The encoded text form
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The decoded bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume into the decoded bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl TryFrom<String> for Base64UrlData {
    type Error = CodecError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        Base64UrlData::parse(text)
    }
}

impl From<Base64UrlData> for String {
    fn from(data: Base64UrlData) -> Self {
        data.text
    }
}

impl fmt::Display for Base64UrlData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl fmt::Debug for Base64UrlData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Base64UrlData({})", self.text)
    }
}
