//! Frame schemas
//!
//! Structural validation of raw frames happens before any typed parsing.
//! `SchemaValidator` is the seam for a different schema engine; the default
//! `ProtocolSchemas` compiles the embedded query/answer schemas with the
//! `jsonschema` crate.
//!
//! The schemas only check shape. The method/id table and the result/error
//! rules are enforced by the typed constructors.

use super::ProtocolError;
use once_cell::sync::Lazy;
use serde_json::{json, Value};

/// Default cap on the size of a single raw frame
pub const DEFAULT_MAX_FRAME_BYTES: usize = 4 * 1024 * 1024;

const BASE64URL_PATTERN: &str =
    "^(?:[A-Za-z0-9_-]{4})*(?:[A-Za-z0-9_-]{2}==|[A-Za-z0-9_-]{3}=)?$";

const CHANNEL_PATTERN: &str = "^/root(?:/[^/]+)*$";

fn base64url() -> Value {
    json!({ "type": "string", "pattern": BASE64URL_PATTERN })
}

fn message_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "data": base64url(),
            "sender": base64url(),
            "signature": base64url(),
            "message_id": base64url(),
            "witness_signatures": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "witness": base64url(),
                        "signature": base64url()
                    },
                    "required": ["witness", "signature"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["data", "sender", "signature", "message_id", "witness_signatures"],
        "additionalProperties": false
    })
}

/// Schema of client/server requests
pub static QUERY_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "query",
        "type": "object",
        "properties": {
            "jsonrpc": { "const": "2.0" },
            "method": {
                "enum": ["broadcast", "publish", "subscribe", "unsubscribe", "catchup"]
            },
            "id": { "type": ["integer", "null"] },
            "params": {
                "type": "object",
                "properties": {
                    "channel": { "type": "string", "pattern": CHANNEL_PATTERN },
                    "message": message_schema()
                },
                "required": ["channel"],
                "additionalProperties": false
            }
        },
        "required": ["jsonrpc", "method", "params"],
        "additionalProperties": false
    })
});

/// Schema of server answers
pub static ANSWER_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "answer",
        "type": "object",
        "properties": {
            "jsonrpc": { "const": "2.0" },
            "id": { "type": "integer" },
            "result": {
                "oneOf": [
                    { "type": "integer" },
                    { "type": "array", "items": message_schema() }
                ]
            },
            "error": {
                "type": "object",
                "properties": {
                    "code": { "type": "integer" },
                    "description": { "type": "string" }
                },
                "required": ["code", "description"],
                "additionalProperties": false
            }
        },
        "required": ["jsonrpc", "id"],
        "additionalProperties": false
    })
});

/// Validates raw frames before they are turned into typed values
pub trait SchemaValidator: Send + Sync {
    /// Check a request frame; the error carries the engine's text
    fn validate_query(&self, frame: &Value) -> Result<(), String>;

    /// Check a response frame; the error carries the engine's text
    fn validate_answer(&self, frame: &Value) -> Result<(), String>;

    /// Frames longer than this are rejected unparsed
    fn max_frame_bytes(&self) -> usize {
        usize::MAX
    }
}

/// `jsonschema`-backed validator for the protocol frames
pub struct ProtocolSchemas {
    query: jsonschema::Validator,
    answer: jsonschema::Validator,
    max_frame_bytes: usize,
}

impl ProtocolSchemas {
    /// Compile the embedded schemas
    pub fn new(max_frame_bytes: usize) -> Result<Self, ProtocolError> {
        let query = jsonschema::validator_for(&QUERY_SCHEMA)
            .map_err(|e| ProtocolError::Schema(format!("query schema: {}", e)))?;
        let answer = jsonschema::validator_for(&ANSWER_SCHEMA)
            .map_err(|e| ProtocolError::Schema(format!("answer schema: {}", e)))?;

        Ok(ProtocolSchemas {
            query,
            answer,
            max_frame_bytes,
        })
    }

    fn collect_errors(validator: &jsonschema::Validator, frame: &Value) -> Result<(), String> {
        let messages: Vec<String> = validator
            .iter_errors(frame)
            .map(|e| e.to_string())
            .collect();

        if messages.is_empty() {
            Ok(())
        } else {
            Err(messages.join("; "))
        }
    }
}

impl SchemaValidator for ProtocolSchemas {
    fn validate_query(&self, frame: &Value) -> Result<(), String> {
        Self::collect_errors(&self.query, frame)
    }

    fn validate_answer(&self, frame: &Value) -> Result<(), String> {
        Self::collect_errors(&self.answer, frame)
    }

    fn max_frame_bytes(&self) -> usize {
        self.max_frame_bytes
    }
}

impl std::fmt::Debug for ProtocolSchemas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtocolSchemas")
            .field("max_frame_bytes", &self.max_frame_bytes)
            .finish()
    }
}
