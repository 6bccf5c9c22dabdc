//! Message registry module
//!
//! Startup-time dispatch table keyed by the `(object, action)` a payload
//! declares. Each entry knows how to build the typed payload, which handler
//! applies it and which identity has to sign it.
//!
//! Lifecycle:
//! 1. Features register through `MessageRegistryBuilder`
//! 2. `build` verifies every entry and freezes the table
//! 3. The frozen `MessageRegistry` is shared read-only

mod data;
mod registry;
mod types;

pub use data::{declared_kind, GenericMessageData, MessageData};
pub use registry::{
    DataBuilder, DataHandler, FeatureRegistration, MessageRegistry, MessageRegistryBuilder,
    ProcessableMessage,
};
pub use types::{ActionType, ObjectType, SignerClass};

use thiserror::Error;

/// Registry errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No entry for the declared kind
    #[error("Unsupported message: object {object}, action {action}")]
    Unsupported { object: String, action: String },

    /// An entry is incomplete
    #[error("Registry misconfigured: {0}")]
    Configuration(String),

    #[error("Invalid message data: {0}")]
    InvalidPayload(String),

    /// Rejected registration during bootstrap
    #[error("Registration rejected: {0}")]
    Builder(String),
}

#[cfg(test)]
mod tests;
