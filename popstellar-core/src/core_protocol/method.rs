//! JSON-RPC methods

use serde::{Deserialize, Serialize};
use std::fmt;

/// Methods a client exchanges with a server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Server push of a message; carries no id
    Broadcast,
    /// Post a message on a channel
    Publish,
    /// Start receiving broadcasts of a channel
    Subscribe,
    /// Stop receiving broadcasts of a channel
    Unsubscribe,
    /// Fetch all past messages of a channel
    Catchup,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Broadcast => "broadcast",
            Method::Publish => "publish",
            Method::Subscribe => "subscribe",
            Method::Unsubscribe => "unsubscribe",
            Method::Catchup => "catchup",
        }
    }

    /// Whether requests of this method carry a JSON-RPC id
    pub fn requires_id(&self) -> bool {
        !matches!(self, Method::Broadcast)
    }

    /// Whether params of this method carry a message envelope
    pub fn carries_message(&self) -> bool {
        matches!(self, Method::Broadcast | Method::Publish)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
