//! Message registry
//!
//! Every feature registers, for each `(object, action)` it understands, a
//! payload builder, a handler and the class of signer its messages need.
//! Registration happens once through `MessageRegistryBuilder`; `build`
//! checks every entry is complete and returns a `MessageRegistry` that has
//! no way to register anything else.

use super::data::{declared_kind, MessageData};
use super::types::{ActionType, ObjectType, SignerClass};
use super::RegistryError;
use crate::core_message::MessageEnvelope;
use crate::core_protocol::Channel;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Turns a JSON payload into its typed form
pub type DataBuilder =
    Box<dyn Fn(&Value) -> Result<Box<dyn MessageData>, RegistryError> + Send + Sync>;

/// Applies a verified message; `false` means "recognized, not applicable now"
pub type DataHandler = Box<dyn Fn(&ProcessableMessage<'_>) -> bool + Send + Sync>;

/// One feature's registrations
pub type FeatureRegistration =
    Box<dyn FnOnce(&mut MessageRegistryBuilder) -> Result<(), RegistryError>>;

type Key = (ObjectType, ActionType);

/// A verified message ready for its handler
#[derive(Debug)]
pub struct ProcessableMessage<'a> {
    pub channel: &'a Channel,
    pub envelope: &'a MessageEnvelope,
    pub data: Box<dyn MessageData>,
}

#[derive(Default)]
struct PendingEntry {
    builder: Option<DataBuilder>,
    handler: Option<DataHandler>,
    signer: Option<SignerClass>,
}

/// Collects registrations during bootstrap
#[derive(Default)]
pub struct MessageRegistryBuilder {
    entries: BTreeMap<Key, PendingEntry>,
}

impl MessageRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register all three parts of an entry at once
    pub fn register<B, H>(
        &mut self,
        object: ObjectType,
        action: ActionType,
        builder: B,
        handler: H,
        signer: SignerClass,
    ) -> Result<&mut Self, RegistryError>
    where
        B: Fn(&Value) -> Result<Box<dyn MessageData>, RegistryError> + Send + Sync + 'static,
        H: Fn(&ProcessableMessage<'_>) -> bool + Send + Sync + 'static,
    {
        self.register_builder(object, action, builder)?;
        self.register_handler(object, action, handler)?;
        self.register_signer(object, action, signer)
    }

    pub fn register_builder<B>(
        &mut self,
        object: ObjectType,
        action: ActionType,
        builder: B,
    ) -> Result<&mut Self, RegistryError>
    where
        B: Fn(&Value) -> Result<Box<dyn MessageData>, RegistryError> + Send + Sync + 'static,
    {
        let entry = self.entries.entry((object, action)).or_default();
        if entry.builder.is_some() {
            return Err(Self::duplicate(object, action, "builder"));
        }
        entry.builder = Some(Box::new(builder));
        Ok(self)
    }

    pub fn register_handler<H>(
        &mut self,
        object: ObjectType,
        action: ActionType,
        handler: H,
    ) -> Result<&mut Self, RegistryError>
    where
        H: Fn(&ProcessableMessage<'_>) -> bool + Send + Sync + 'static,
    {
        let entry = self.entries.entry((object, action)).or_default();
        if entry.handler.is_some() {
            return Err(Self::duplicate(object, action, "handler"));
        }
        entry.handler = Some(Box::new(handler));
        Ok(self)
    }

    pub fn register_signer(
        &mut self,
        object: ObjectType,
        action: ActionType,
        signer: SignerClass,
    ) -> Result<&mut Self, RegistryError> {
        let entry = self.entries.entry((object, action)).or_default();
        if entry.signer.is_some() {
            return Err(Self::duplicate(object, action, "signer"));
        }
        entry.signer = Some(signer);
        Ok(self)
    }

    fn duplicate(object: ObjectType, action: ActionType, part: &str) -> RegistryError {
        RegistryError::Builder(format!("{} already registered for ({}, {})", part, object, action))
    }

    /// Check that every entry has a builder, a handler and a signer class
    pub fn verify_entries(&self) -> Result<(), RegistryError> {
        let incomplete: Vec<String> = self
            .entries
            .iter()
            .filter_map(|((object, action), entry)| {
                let mut missing = Vec::new();
                if entry.builder.is_none() {
                    missing.push("builder");
                }
                if entry.handler.is_none() {
                    missing.push("handler");
                }
                if entry.signer.is_none() {
                    missing.push("signer");
                }
                if missing.is_empty() {
                    None
                } else {
                    Some(format!("({}, {}) lacks {}", object, action, missing.join(", ")))
                }
            })
            .collect();

        if incomplete.is_empty() {
            Ok(())
        } else {
            Err(RegistryError::Configuration(incomplete.join("; ")))
        }
    }

    /// Freeze the table
    pub fn build(self) -> Result<MessageRegistry, RegistryError> {
        self.verify_entries()?;

        let mut entries = BTreeMap::new();
        for (key, pending) in self.entries {
            if let (Some(builder), Some(handler), Some(signer)) =
                (pending.builder, pending.handler, pending.signer)
            {
                entries.insert(
                    key,
                    RegistryEntry {
                        builder,
                        handler,
                        signer,
                    },
                );
            }
        }

        debug!(entries = entries.len(), "Message registry frozen");
        Ok(MessageRegistry { entries })
    }
}

struct RegistryEntry {
    builder: DataBuilder,
    handler: DataHandler,
    signer: SignerClass,
}

/// Immutable dispatch table from `(object, action)` to its entry
///
/// Share it behind an `Arc`; all methods take `&self`.
pub struct MessageRegistry {
    entries: BTreeMap<Key, RegistryEntry>,
}

impl MessageRegistry {
    /// Run every feature's registration, then freeze
    pub fn bootstrap(features: Vec<FeatureRegistration>) -> Result<Self, RegistryError> {
        let mut builder = MessageRegistryBuilder::new();
        for register in features {
            register(&mut builder)?;
        }
        builder.build()
    }

    fn entry(&self, object: &str, action: &str) -> Result<&RegistryEntry, RegistryError> {
        let unsupported = || RegistryError::Unsupported {
            object: object.to_string(),
            action: action.to_string(),
        };
        let key = (
            object.parse::<ObjectType>().map_err(|_| unsupported())?,
            action.parse::<ActionType>().map_err(|_| unsupported())?,
        );
        self.entries.get(&key).ok_or_else(unsupported)
    }

    /// Build the typed payload for a JSON message data
    pub fn build_message_data(&self, payload: &Value) -> Result<Box<dyn MessageData>, RegistryError> {
        let (object, action) = declared_kind(payload)?;
        let entry = self.entry(object, action)?;
        (entry.builder)(payload)
    }

    /// Build the payload of a verified envelope and hand it to its handler
    ///
    /// The envelope must already have passed `MessageEnvelope::verify`.
    pub fn dispatch(&self, channel: &Channel, envelope: &MessageEnvelope) -> Result<bool, RegistryError> {
        let payload = envelope
            .payload_json()
            .map_err(|e| RegistryError::InvalidPayload(e.to_string()))?;
        let (object, action) = declared_kind(&payload)?;
        let entry = self.entry(object, action)?;
        let data = (entry.builder)(&payload)?;

        let message = ProcessableMessage {
            channel,
            envelope,
            data,
        };
        let applied = (entry.handler)(&message);
        debug!(
            object = object,
            action = action,
            message_id = %envelope.message_id(),
            applied,
            "Dispatched message"
        );
        Ok(applied)
    }

    /// Which identity must sign messages of this kind
    pub fn signer_class_for(
        &self,
        object: ObjectType,
        action: ActionType,
    ) -> Result<SignerClass, RegistryError> {
        self.entries
            .get(&(object, action))
            .map(|entry| entry.signer)
            .ok_or_else(|| RegistryError::Unsupported {
                object: object.to_string(),
                action: action.to_string(),
            })
    }

    pub fn is_registered(&self, object: ObjectType, action: ActionType) -> bool {
        self.entries.contains_key(&(object, action))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for MessageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageRegistry")
            .field("entries", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}
