//! Codec module
//!
//! Canonical URL-safe base64 text encoding used for every binary field on the
//! wire, and the protocol hash built on top of it.
//!
//! API:
//! - `encode(bytes)` -> padded URL-safe text
//! - `decode(text)` -> bytes, or `CodecError::Decode`
//! - `Base64UrlData` -> validated text newtype, serialized as a JSON string
//! - `Hash` -> SHA-256 digest, rendered as base64url

mod base64url;
mod hash;

pub use base64url::{decode, encode, Base64UrlData};
pub use hash::Hash;

use thiserror::Error;

/// Codec errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Text is not canonical padded URL-safe base64
    #[error("Invalid base64url data: {0}")]
    Decode(String),
}
