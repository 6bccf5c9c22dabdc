//! Inbound routing
//!
//! Turns raw frames from the server into registry dispatches. Every
//! envelope is verified again before dispatch, whatever the server claims;
//! a message that fails is logged and dropped, never retried.

use super::RouterError;
use crate::core_codec::Hash;
use crate::core_message::MessageEnvelope;
use crate::core_protocol::{
    Channel, Params, ProtocolRequest, ProtocolResponse, ResponseBody, SchemaValidator,
};
use crate::core_registry::{MessageRegistry, RegistryError};
use std::sync::Arc;
use tracing::{debug, warn};

/// What happened to one received message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The handler applied it
    Applied,
    /// Recognized, but not applicable now
    Ignored,
    /// Failed verification or could not be built
    Rejected(String),
    /// No feature handles this object/action
    Unsupported { object: String, action: String },
}

/// Outcome of one message, with where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub channel: Channel,
    pub message_id: Hash,
    pub outcome: DispatchOutcome,
}

impl Delivery {
    pub fn is_applied(&self) -> bool {
        self.outcome == DispatchOutcome::Applied
    }
}

pub struct InboundRouter {
    registry: Arc<MessageRegistry>,
    schemas: Arc<dyn SchemaValidator>,
}

impl InboundRouter {
    pub fn new(registry: Arc<MessageRegistry>, schemas: Arc<dyn SchemaValidator>) -> Self {
        InboundRouter { registry, schemas }
    }

    /// Handle a request frame pushed by the server
    ///
    /// Clients only receive `broadcast`; any other method is an error.
    pub fn handle_request(&self, raw: &str) -> Result<Delivery, RouterError> {
        let request = ProtocolRequest::parse(raw, self.schemas.as_ref())?;
        match request.params() {
            Params::Broadcast { channel, message } => Ok(self.deliver(channel, message)),
            other => Err(RouterError::UnexpectedMethod(other.method())),
        }
    }

    /// Handle the answer to a request sent on `channel`
    ///
    /// A catchup reply yields one delivery per message, in order. A plain
    /// success yields none. An error answer is returned as
    /// `RouterError::Remote`.
    pub fn handle_response(
        &self,
        channel: &Channel,
        raw: &str,
    ) -> Result<Vec<Delivery>, RouterError> {
        let response = ProtocolResponse::parse(raw, self.schemas.as_ref())?;
        match response.body() {
            ResponseBody::Success => Ok(Vec::new()),
            ResponseBody::Messages(messages) => {
                debug!(
                    id = response.id(),
                    channel = %channel,
                    count = messages.len(),
                    "Catching up"
                );
                Ok(messages
                    .iter()
                    .map(|message| self.deliver(channel, message))
                    .collect())
            }
            ResponseBody::Error(error) => {
                warn!(
                    id = response.id(),
                    code = error.code.code(),
                    description = %error.description,
                    "Server rejected request"
                );
                Err(RouterError::Remote {
                    id: response.id(),
                    error: error.clone(),
                })
            }
        }
    }

    /// Verify then dispatch one envelope
    pub fn deliver(&self, channel: &Channel, envelope: &MessageEnvelope) -> Delivery {
        let message_id = envelope.message_id().clone();

        let outcome = match envelope.verify() {
            Err(e) => {
                warn!(channel = %channel, message_id = %message_id, error = %e, "Dropping message");
                DispatchOutcome::Rejected(e.to_string())
            }
            Ok(()) => match self.registry.dispatch(channel, envelope) {
                Ok(true) => DispatchOutcome::Applied,
                Ok(false) => DispatchOutcome::Ignored,
                Err(RegistryError::Unsupported { object, action }) => {
                    warn!(
                        channel = %channel,
                        message_id = %message_id,
                        object = %object,
                        action = %action,
                        "Dropping unsupported message"
                    );
                    DispatchOutcome::Unsupported { object, action }
                }
                Err(e) => {
                    warn!(channel = %channel, message_id = %message_id, error = %e, "Dropping message");
                    DispatchOutcome::Rejected(e.to_string())
                }
            },
        };

        Delivery {
            channel: channel.clone(),
            message_id,
            outcome,
        }
    }
}

impl std::fmt::Debug for InboundRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InboundRouter")
            .field("registry", &self.registry)
            .field("max_frame_bytes", &self.schemas.max_frame_bytes())
            .finish()
    }
}
