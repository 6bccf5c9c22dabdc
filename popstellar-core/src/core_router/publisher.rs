/*
   MessagePublisher

   Outgoing side of the client. Feature code hands it a MessageData and a
   channel; it asks the registry which identity must sign that kind of
   message, signs, and wraps the envelope in a `publish` request with a fresh
   id. The caller owns the transport and sends `request.to_json()`.

    MessageData ──► signer_class_for(object, action)
                        │
              ┌─────────┴──────────┐
        MainIdentity          EventToken
        (organizer key)   (PoP token of a roll call,
                            derived by the Wallet)
              └─────────┬──────────┘
                        ▼
               MessageEnvelope::from_data
                        ▼
            ProtocolRequest::publish(id, channel, envelope)
*/

use super::RouterError;
use crate::config::ProtocolConfig;
use crate::core_codec::Hash;
use crate::core_message::{MessageEnvelope, MessageSigner, PublicKey};
use crate::core_protocol::{Channel, ProtocolRequest, RequestIdGenerator};
use crate::core_registry::{MessageData, MessageRegistry, SignerClass};
use crate::core_wallet::{PopToken, Wallet};
use std::sync::Arc;
use tracing::debug;

pub struct MessagePublisher {
    registry: Arc<MessageRegistry>,
    identity: Arc<dyn MessageSigner>,
    ids: RequestIdGenerator,
}

impl MessagePublisher {
    pub fn new(
        registry: Arc<MessageRegistry>,
        identity: Arc<dyn MessageSigner>,
        ids: RequestIdGenerator,
    ) -> Self {
        MessagePublisher {
            registry,
            identity,
            ids,
        }
    }

    pub fn from_config(
        registry: Arc<MessageRegistry>,
        identity: Arc<dyn MessageSigner>,
        config: &ProtocolConfig,
    ) -> Self {
        Self::new(
            registry,
            identity,
            RequestIdGenerator::new(config.request_id_wrap),
        )
    }

    /// Key of the main identity
    pub fn identity(&self) -> PublicKey {
        self.identity.public_key()
    }

    /// Sign `data` with the identity its kind requires
    ///
    /// `token` is only used for kinds signed with a PoP token.
    pub fn sign(
        &self,
        data: &dyn MessageData,
        token: Option<&PopToken>,
    ) -> Result<MessageEnvelope, RouterError> {
        let class = self.registry.signer_class_for(data.object(), data.action())?;
        let envelope = match class {
            SignerClass::MainIdentity => MessageEnvelope::from_data(data, self.identity.as_ref())?,
            SignerClass::EventToken => {
                let token = token.ok_or_else(|| RouterError::MissingToken {
                    object: data.object().to_string(),
                    action: data.action().to_string(),
                })?;
                MessageEnvelope::from_data(data, token)?
            }
        };
        Ok(envelope)
    }

    /// Signed `publish` request for `data` on `channel`
    pub fn publish(
        &self,
        channel: Channel,
        data: &dyn MessageData,
        token: Option<&PopToken>,
    ) -> Result<ProtocolRequest, RouterError> {
        let envelope = self.sign(data, token)?;
        let id = self.ids.next_id();
        debug!(
            id,
            channel = %channel,
            object = %data.object(),
            action = %data.action(),
            message_id = %envelope.message_id(),
            "Publishing message"
        );
        Ok(ProtocolRequest::publish(id, channel, envelope))
    }

    /// `publish` signed with the wallet's token for one roll call
    pub async fn publish_as_attendee(
        &self,
        wallet: &Wallet,
        lao_id: &Hash,
        roll_call_id: &Hash,
        channel: Channel,
        data: &dyn MessageData,
    ) -> Result<ProtocolRequest, RouterError> {
        let token = wallet.generate_token(lao_id, roll_call_id).await?;
        self.publish(channel, data, Some(&token))
    }

    pub fn subscribe(&self, channel: Channel) -> ProtocolRequest {
        ProtocolRequest::subscribe(self.ids.next_id(), channel)
    }

    pub fn unsubscribe(&self, channel: Channel) -> ProtocolRequest {
        ProtocolRequest::unsubscribe(self.ids.next_id(), channel)
    }

    pub fn catchup(&self, channel: Channel) -> ProtocolRequest {
        ProtocolRequest::catchup(self.ids.next_id(), channel)
    }
}

impl std::fmt::Debug for MessagePublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessagePublisher")
            .field("identity", &self.identity.public_key())
            .field("registry", &self.registry)
            .finish()
    }
}
