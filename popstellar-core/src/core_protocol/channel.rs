//! Channels
//!
//! Every channel lives under `/root`. A LAO owns `/root/<lao_id>` and any
//! sub-channel below it (`/root/<lao_id>/social/chirps`, ...).

use super::ProtocolError;
use crate::core_codec::Hash;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the root channel
pub const ROOT_CHANNEL: &str = "/root";

/// A subscription topic
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Channel(String);

impl Channel {
    /// The root channel
    pub fn root() -> Self {
        Channel(ROOT_CHANNEL.to_string())
    }

    /// Channel of a LAO
    pub fn for_lao(lao_id: &Hash) -> Self {
        Channel(format!("{}/{}", ROOT_CHANNEL, lao_id))
    }

    /// Validate a channel name
    pub fn parse(name: impl Into<String>) -> Result<Self, ProtocolError> {
        let name = name.into();
        let rest = name
            .strip_prefix(ROOT_CHANNEL)
            .ok_or_else(|| ProtocolError::InvalidChannel(name.clone()))?;

        if rest.is_empty() {
            return Ok(Channel(name));
        }

        let segments = rest
            .strip_prefix('/')
            .ok_or_else(|| ProtocolError::InvalidChannel(name.clone()))?;
        if segments.split('/').any(str::is_empty) {
            return Err(ProtocolError::InvalidChannel(name));
        }

        Ok(Channel(name))
    }

    /// Sub-channel `<self>/<segment>`
    pub fn subchannel(&self, segment: &str) -> Result<Self, ProtocolError> {
        Self::parse(format!("{}/{}", self.0, segment))
    }

    pub fn is_root(&self) -> bool {
        self.0 == ROOT_CHANNEL
    }

    /// Id of the LAO this channel belongs to, if any
    pub fn lao_id(&self) -> Option<Hash> {
        self.0
            .strip_prefix(ROOT_CHANNEL)?
            .strip_prefix('/')?
            .split('/')
            .next()
            .and_then(|segment| Hash::from_base64url(segment).ok())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Channel {
    type Error = ProtocolError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Channel::parse(name)
    }
}

impl From<Channel> for String {
    fn from(channel: Channel) -> Self {
        channel.0
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
