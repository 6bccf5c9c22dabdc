//! Protocol requests
//!
//! ```json
//! {
//!     "jsonrpc": "2.0",
//!     "method": "publish",
//!     "id": 7,
//!     "params": { "channel": "/root/<lao_id>", "message": { ... } }
//! }
//! ```
//!
//! `Params` is keyed by method, so a request can never carry the wrong params
//! shape. The remaining rule (broadcast has no id, everything else has one)
//! is checked once, in `ProtocolRequest::new`.

use super::channel::Channel;
use super::method::Method;
use super::schema::SchemaValidator;
use super::{ProtocolError, JSON_RPC_VERSION};
use crate::core_message::MessageEnvelope;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Method-specific params
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Params {
    Broadcast {
        channel: Channel,
        message: MessageEnvelope,
    },
    Publish {
        channel: Channel,
        message: MessageEnvelope,
    },
    Subscribe {
        channel: Channel,
    },
    Unsubscribe {
        channel: Channel,
    },
    Catchup {
        channel: Channel,
    },
}

impl Params {
    pub fn method(&self) -> Method {
        match self {
            Params::Broadcast { .. } => Method::Broadcast,
            Params::Publish { .. } => Method::Publish,
            Params::Subscribe { .. } => Method::Subscribe,
            Params::Unsubscribe { .. } => Method::Unsubscribe,
            Params::Catchup { .. } => Method::Catchup,
        }
    }

    pub fn channel(&self) -> &Channel {
        match self {
            Params::Broadcast { channel, .. }
            | Params::Publish { channel, .. }
            | Params::Subscribe { channel }
            | Params::Unsubscribe { channel }
            | Params::Catchup { channel } => channel,
        }
    }

    /// Envelope carried by broadcast/publish
    pub fn message(&self) -> Option<&MessageEnvelope> {
        match self {
            Params::Broadcast { message, .. } | Params::Publish { message, .. } => Some(message),
            Params::Subscribe { .. } | Params::Unsubscribe { .. } | Params::Catchup { .. } => None,
        }
    }

    fn from_wire(method: Method, wire: WireParams) -> Result<Self, ProtocolError> {
        let WireParams { channel, message } = wire;
        match (method, message) {
            (Method::Broadcast, Some(message)) => Ok(Params::Broadcast { channel, message }),
            (Method::Publish, Some(message)) => Ok(Params::Publish { channel, message }),
            (Method::Subscribe, None) => Ok(Params::Subscribe { channel }),
            (Method::Unsubscribe, None) => Ok(Params::Unsubscribe { channel }),
            (Method::Catchup, None) => Ok(Params::Catchup { channel }),
            (Method::Broadcast | Method::Publish, None) => {
                Err(ProtocolError::MissingMessage { method })
            }
            (Method::Subscribe | Method::Unsubscribe | Method::Catchup, Some(_)) => {
                Err(ProtocolError::UnexpectedMessage { method })
            }
        }
    }

    fn to_wire(&self) -> WireParams {
        WireParams {
            channel: self.channel().clone(),
            message: self.message().cloned(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct WireParams {
    channel: Channel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<MessageEnvelope>,
}

#[derive(Serialize, Deserialize)]
struct WireRequest {
    jsonrpc: String,
    method: Method,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    params: WireParams,
}

/// A validated JSON-RPC request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolRequest {
    id: Option<i64>,
    params: Params,
}

impl ProtocolRequest {
    /// Build a request, enforcing the method/id table
    ///
    /// | method      | id      |
    /// |-------------|---------|
    /// | broadcast   | absent  |
    /// | publish     | present |
    /// | subscribe   | present |
    /// | unsubscribe | present |
    /// | catchup     | present |
    pub fn new(id: Option<i64>, params: Params) -> Result<Self, ProtocolError> {
        let method = params.method();
        match (method, id) {
            (Method::Broadcast, None) => Ok(ProtocolRequest { id, params }),
            (Method::Broadcast, Some(id)) => Err(ProtocolError::UnexpectedId { method, id }),
            (
                Method::Publish | Method::Subscribe | Method::Unsubscribe | Method::Catchup,
                Some(_),
            ) => Ok(ProtocolRequest { id, params }),
            (Method::Publish | Method::Subscribe | Method::Unsubscribe | Method::Catchup, None) => {
                Err(ProtocolError::MissingId { method })
            }
        }
    }

    pub fn broadcast(channel: Channel, message: MessageEnvelope) -> Self {
        ProtocolRequest {
            id: None,
            params: Params::Broadcast { channel, message },
        }
    }

    pub fn publish(id: i64, channel: Channel, message: MessageEnvelope) -> Self {
        ProtocolRequest {
            id: Some(id),
            params: Params::Publish { channel, message },
        }
    }

    pub fn subscribe(id: i64, channel: Channel) -> Self {
        ProtocolRequest {
            id: Some(id),
            params: Params::Subscribe { channel },
        }
    }

    pub fn unsubscribe(id: i64, channel: Channel) -> Self {
        ProtocolRequest {
            id: Some(id),
            params: Params::Unsubscribe { channel },
        }
    }

    pub fn catchup(id: i64, channel: Channel) -> Self {
        ProtocolRequest {
            id: Some(id),
            params: Params::Catchup { channel },
        }
    }

    /// Parse and schema-validate raw frame text
    pub fn parse(raw: &str, schemas: &dyn SchemaValidator) -> Result<Self, ProtocolError> {
        let limit = schemas.max_frame_bytes();
        if raw.len() > limit {
            return Err(ProtocolError::FrameTooLarge {
                size: raw.len(),
                limit,
            });
        }

        let value: Value =
            serde_json::from_str(raw).map_err(|e| ProtocolError::Json(e.to_string()))?;
        schemas.validate_query(&value).map_err(ProtocolError::Schema)?;
        Self::from_value(value)
    }

    /// Build from an already schema-checked JSON value
    pub fn from_value(value: Value) -> Result<Self, ProtocolError> {
        let wire: WireRequest =
            serde_json::from_value(value).map_err(|e| ProtocolError::InvalidFrame(e.to_string()))?;

        if wire.jsonrpc != JSON_RPC_VERSION {
            return Err(ProtocolError::InvalidFrame(format!(
                "unsupported jsonrpc version {:?}",
                wire.jsonrpc
            )));
        }

        let params = Params::from_wire(wire.method, wire.params)?;
        Self::new(wire.id, params)
    }

    pub fn to_value(&self) -> Result<Value, ProtocolError> {
        let wire = WireRequest {
            jsonrpc: JSON_RPC_VERSION.to_string(),
            method: self.method(),
            id: self.id,
            params: self.params.to_wire(),
        };
        serde_json::to_value(&wire).map_err(|e| ProtocolError::InvalidFrame(e.to_string()))
    }

    /// Frame text to hand to the transport
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(self.to_value()?.to_string())
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn method(&self) -> Method {
        self.params.method()
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn channel(&self) -> &Channel {
        self.params.channel()
    }

    pub fn message(&self) -> Option<&MessageEnvelope> {
        self.params.message()
    }
}
