//! Protocol answers
//!
//! ```json
//! { "jsonrpc": "2.0", "id": 7, "result": 0 }
//! { "jsonrpc": "2.0", "id": 8, "result": [ { "data": "...", ... } ] }
//! { "jsonrpc": "2.0", "id": 9, "error": { "code": -2, "description": "..." } }
//! ```

use super::schema::SchemaValidator;
use super::{ProtocolError, JSON_RPC_VERSION};
use crate::core_message::MessageEnvelope;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// Error codes a server may answer with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidAction,
    InvalidResource,
    ResourceAlreadyExists,
    InvalidMessageData,
    AccessDenied,
    InternalServerError,
}

impl ErrorCode {
    pub fn from_code(code: i64) -> Result<Self, ProtocolError> {
        match code {
            -1 => Ok(ErrorCode::InvalidAction),
            -2 => Ok(ErrorCode::InvalidResource),
            -3 => Ok(ErrorCode::ResourceAlreadyExists),
            -4 => Ok(ErrorCode::InvalidMessageData),
            -5 => Ok(ErrorCode::AccessDenied),
            -6 => Ok(ErrorCode::InternalServerError),
            other => Err(ProtocolError::InvalidErrorCode(other)),
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            ErrorCode::InvalidAction => -1,
            ErrorCode::InvalidResource => -2,
            ErrorCode::ResourceAlreadyExists => -3,
            ErrorCode::InvalidMessageData => -4,
            ErrorCode::AccessDenied => -5,
            ErrorCode::InternalServerError => -6,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCode::InvalidAction => "invalid action",
            ErrorCode::InvalidResource => "invalid resource",
            ErrorCode::ResourceAlreadyExists => "resource already exists",
            ErrorCode::InvalidMessageData => "invalid message data",
            ErrorCode::AccessDenied => "access denied",
            ErrorCode::InternalServerError => "internal server error",
        };
        write!(f, "{} ({})", name, self.code())
    }
}

/// Error object of a failed answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcError {
    pub code: ErrorCode,
    pub description: String,
}

/// What an answer carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    /// `result: 0`
    Success,
    /// `result: [...]`, the reply to a catchup
    Messages(Vec<MessageEnvelope>),
    Error(RpcError),
}

#[derive(Serialize, Deserialize)]
struct WireError {
    code: i64,
    description: String,
}

#[derive(Serialize, Deserialize)]
struct WireResponse {
    jsonrpc: String,
    id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<WireError>,
}

/// A validated JSON-RPC answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolResponse {
    id: i64,
    body: ResponseBody,
}

impl ProtocolResponse {
    pub fn success(id: i64) -> Self {
        ProtocolResponse {
            id,
            body: ResponseBody::Success,
        }
    }

    pub fn messages(id: i64, messages: Vec<MessageEnvelope>) -> Self {
        ProtocolResponse {
            id,
            body: ResponseBody::Messages(messages),
        }
    }

    pub fn error(id: i64, code: ErrorCode, description: impl Into<String>) -> Self {
        ProtocolResponse {
            id,
            body: ResponseBody::Error(RpcError {
                code,
                description: description.into(),
            }),
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
        schemas.validate_answer(&value).map_err(ProtocolError::Schema)?;
        Self::from_value(value)
    }

    /// Build from an already schema-checked JSON value
    pub fn from_value(value: Value) -> Result<Self, ProtocolError> {
        let wire: WireResponse =
            serde_json::from_value(value).map_err(|e| ProtocolError::InvalidFrame(e.to_string()))?;

        if wire.jsonrpc != JSON_RPC_VERSION {
            return Err(ProtocolError::InvalidFrame(format!(
                "unsupported jsonrpc version {:?}",
                wire.jsonrpc
            )));
        }

        let body = match (wire.result, wire.error) {
            (Some(_), Some(_)) => return Err(ProtocolError::ResultAndError),
            (None, None) => return Err(ProtocolError::NoResultOrError),
            (Some(result), None) => Self::parse_result(result)?,
            (None, Some(error)) => {
                if error.code >= 0 {
                    return Err(ProtocolError::InvalidErrorCode(error.code));
                }
                ResponseBody::Error(RpcError {
                    code: ErrorCode::from_code(error.code)?,
                    description: error.description,
                })
            }
        };

        Ok(ProtocolResponse { id: wire.id, body })
    }

    fn parse_result(result: Value) -> Result<ResponseBody, ProtocolError> {
        match result {
            Value::Number(n) => match n.as_i64() {
                Some(0) => Ok(ResponseBody::Success),
                Some(other) => Err(ProtocolError::NonZeroResult(other)),
                None => Err(ProtocolError::InvalidFrame(format!(
                    "result {} is not an integer",
                    n
                ))),
            },
            Value::Array(_) => {
                let messages: Vec<MessageEnvelope> = serde_json::from_value(result)
                    .map_err(|e| ProtocolError::InvalidFrame(e.to_string()))?;
                Ok(ResponseBody::Messages(messages))
            }
            other => Err(ProtocolError::InvalidFrame(format!(
                "unexpected result {}",
                other
            ))),
        }
    }

    pub fn to_value(&self) -> Result<Value, ProtocolError> {
        let (result, error) = match &self.body {
            ResponseBody::Success => (Some(json!(0)), None),
            ResponseBody::Messages(messages) => (
                Some(
                    serde_json::to_value(messages)
                        .map_err(|e| ProtocolError::InvalidFrame(e.to_string()))?,
                ),
                None,
            ),
            ResponseBody::Error(error) => (
                None,
                Some(WireError {
                    code: error.code.code(),
                    description: error.description.clone(),
                }),
            ),
        };

        let wire = WireResponse {
            jsonrpc: JSON_RPC_VERSION.to_string(),
            id: self.id,
            result,
            error,
        };
        serde_json::to_value(&wire).map_err(|e| ProtocolError::InvalidFrame(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(self.to_value()?.to_string())
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    pub fn is_success(&self) -> bool {
        !matches!(self.body, ResponseBody::Error(_))
    }
}
