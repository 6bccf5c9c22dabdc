//! Message data payloads
//!
//! The JSON inside an envelope's `data` field always declares its own
//! `object` and `action`. Features supply their typed payloads by
//! implementing `MessageData`; `GenericMessageData` keeps the raw JSON for
//! everything else.

use super::types::{ActionType, ObjectType};
use super::RegistryError;
use serde_json::Value;
use std::any::Any;
use std::fmt;

/// A typed message data payload
pub trait MessageData: fmt::Debug + Send + Sync {
    fn object(&self) -> ObjectType;

    fn action(&self) -> ActionType;

    /// JSON form, including the `object` and `action` fields
    fn to_json(&self) -> Value;

    /// Lets handlers recover the concrete payload type
    fn as_any(&self) -> &dyn Any;
}

/// Read the declared `object`/`action` of a payload as raw strings
pub fn declared_kind(payload: &Value) -> Result<(&str, &str), RegistryError> {
    let field = |name: &str| {
        payload
            .get(name)
            .and_then(Value::as_str)
            .ok_or_else(|| RegistryError::InvalidPayload(format!("missing string field {:?}", name)))
    };
    Ok((field("object")?, field("action")?))
}

/// Payload kept as raw JSON
#[derive(Debug, Clone, PartialEq)]
pub struct GenericMessageData {
    object: ObjectType,
    action: ActionType,
    body: Value,
}

impl GenericMessageData {
    /// Wrap a payload, reading its declared kind
    pub fn from_json(payload: &Value) -> Result<Self, RegistryError> {
        let (object, action) = declared_kind(payload)?;
        Ok(GenericMessageData {
            object: object.parse()?,
            action: action.parse()?,
            body: payload.clone(),
        })
    }

    /// Build a payload of the given kind; `fields` must be a JSON object
    pub fn new(object: ObjectType, action: ActionType, fields: Value) -> Result<Self, RegistryError> {
        let mut body = match fields {
            Value::Object(map) => map,
            Value::Null => serde_json::Map::new(),
            other => {
                return Err(RegistryError::InvalidPayload(format!(
                    "fields must be a JSON object, got {}",
                    other
                )))
            }
        };
        body.insert("object".to_string(), Value::String(object.as_str().to_string()));
        body.insert("action".to_string(), Value::String(action.as_str().to_string()));

        Ok(GenericMessageData {
            object,
            action,
            body: Value::Object(body),
        })
    }

    pub fn body(&self) -> &Value {
        &self.body
    }
}

impl MessageData for GenericMessageData {
    fn object(&self) -> ObjectType {
        self.object
    }

    fn action(&self) -> ActionType {
        self.action
    }

    fn to_json(&self) -> Value {
        self.body.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_reads_declared_kind() {
        let payload = json!({ "object": "roll_call", "action": "close", "closes": "x" });
        let data = GenericMessageData::from_json(&payload).unwrap();
        assert_eq!(data.object(), ObjectType::RollCall);
        assert_eq!(data.action(), ActionType::Close);
        assert_eq!(data.to_json(), payload);
    }

    #[test]
    fn test_from_json_requires_kind() {
        assert!(matches!(
            GenericMessageData::from_json(&json!({ "object": "lao" })),
            Err(RegistryError::InvalidPayload(_))
        ));
        assert!(GenericMessageData::from_json(&json!({ "object": 1, "action": "create" })).is_err());
    }

    #[test]
    fn test_new_inserts_kind() {
        let data =
            GenericMessageData::new(ObjectType::Chirp, ActionType::Add, json!({ "text": "hi" }))
                .unwrap();
        assert_eq!(data.body()["object"], "chirp");
        assert_eq!(data.body()["action"], "add");
        assert_eq!(data.body()["text"], "hi");
    }

    #[test]
    fn test_new_rejects_non_object_fields() {
        assert!(GenericMessageData::new(ObjectType::Chirp, ActionType::Add, json!([1])).is_err());
    }

    #[test]
    fn test_downcast_through_any() {
        let data: Box<dyn MessageData> = Box::new(
            GenericMessageData::new(ObjectType::Lao, ActionType::Create, Value::Null).unwrap(),
        );
        assert!(data.as_any().downcast_ref::<GenericMessageData>().is_some());
    }
}
