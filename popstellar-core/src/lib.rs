//! Client library for the PoP (proof-of-personhood) protocol
//!
//! - `core_codec`: base64url text encoding and the protocol hash
//! - `core_message`: signed, witnessed message envelopes
//! - `core_protocol`: JSON-RPC frames exchanged with a server
//! - `core_registry`: `(object, action)` dispatch table filled by features
//! - `core_wallet`: BIP-39 seed and deterministic PoP tokens
//! - `core_router`: signing outgoing messages, verifying incoming ones

pub mod config;
pub mod core_codec;
pub mod core_message;
pub mod core_protocol;
pub mod core_registry;
pub mod core_router;
pub mod core_wallet;
pub mod logging;

pub use config::Config;
pub use core_codec::Hash;
pub use core_message::{KeyPair, MessageEnvelope, PublicKey};
pub use core_protocol::{Channel, ProtocolRequest, ProtocolResponse};
pub use core_registry::{MessageData, MessageRegistry};
pub use core_router::{InboundRouter, MessagePublisher};
pub use core_wallet::{PopToken, Wallet};
pub use logging::{init_logging, LogLevel};
