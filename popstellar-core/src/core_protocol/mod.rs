//! Protocol framing module
//!
//! JSON-RPC 2.0 requests and answers exchanged with a server. Every frame is
//! schema-checked before it is turned into a typed value, and the typed
//! constructors enforce the rules a schema cannot express:
//!
//! - `broadcast` never carries an id, every other method does
//! - `broadcast`/`publish` carry an envelope, the channel-only methods do not
//! - an answer has exactly one of `result`/`error`
//! - a numeric `result` is always `0`
//! - `error.code` lies in `[-6, -1]`

mod channel;
mod method;
mod request;
mod request_id;
mod response;
mod schema;

pub use channel::{Channel, ROOT_CHANNEL};
pub use method::Method;
pub use request::{Params, ProtocolRequest};
pub use request_id::{RequestIdGenerator, DEFAULT_ID_WRAP};
pub use response::{ErrorCode, ProtocolResponse, ResponseBody, RpcError};
pub use schema::{
    ProtocolSchemas, SchemaValidator, ANSWER_SCHEMA, DEFAULT_MAX_FRAME_BYTES, QUERY_SCHEMA,
};

use crate::core_message::MessageError;
use thiserror::Error;

/// JSON-RPC version carried by every frame
pub const JSON_RPC_VERSION: &str = "2.0";

/// Errors raised while parsing or building frames
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("Malformed JSON: {0}")]
    Json(String),

    /// Schema engine rejected the frame; carries the engine's text
    #[error("Schema validation failed: {0}")]
    Schema(String),

    #[error("Frame of {size} bytes exceeds the {limit} byte limit")]
    FrameTooLarge { size: usize, limit: usize },

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("{method} must not carry an id (got {id})")]
    UnexpectedId { method: Method, id: i64 },

    #[error("{method} requires an id")]
    MissingId { method: Method },

    #[error("{method} must not carry a message")]
    UnexpectedMessage { method: Method },

    #[error("{method} requires a message")]
    MissingMessage { method: Method },

    #[error("Invalid channel: {0}")]
    InvalidChannel(String),

    #[error("Answer carries both result and error")]
    ResultAndError,

    #[error("Answer carries neither result nor error")]
    NoResultOrError,

    #[error("Numeric result must be 0, got {0}")]
    NonZeroResult(i64),

    #[error("Invalid error code {0}")]
    InvalidErrorCode(i64),

    #[error(transparent)]
    Message(#[from] MessageError),
}
