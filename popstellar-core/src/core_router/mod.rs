//! Client-side message routing
//!
//! `MessagePublisher` signs and frames what the client sends,
//! `InboundRouter` verifies and dispatches what it receives. Neither owns a
//! connection: they turn values into frames and frames into dispatches.

mod inbound;
mod publisher;

pub use inbound::{Delivery, DispatchOutcome, InboundRouter};
pub use publisher::MessagePublisher;

use crate::core_message::MessageError;
use crate::core_protocol::{Method, ProtocolError, RpcError};
use crate::core_registry::RegistryError;
use crate::core_wallet::WalletError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouterError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Message(#[from] MessageError),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    /// The kind is signed with a PoP token and none was supplied
    #[error("{object}#{action} must be signed with a PoP token")]
    MissingToken { object: String, action: String },

    #[error("Unexpected {0} request from server")]
    UnexpectedMethod(Method),

    /// The server answered with an error object
    #[error("Request {id} failed: {} {}", .error.code, .error.description)]
    Remote { id: i64, error: RpcError },
}

#[cfg(test)]
mod tests;
