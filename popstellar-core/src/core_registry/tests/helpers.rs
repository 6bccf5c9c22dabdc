//! Helpers for registry tests

use crate::core_message::{KeyPair, MessageEnvelope};
use crate::core_registry::{
    ActionType, GenericMessageData, MessageData, MessageRegistryBuilder, ObjectType,
    ProcessableMessage, RegistryError, SignerClass,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub fn generic_builder(payload: &Value) -> Result<Box<dyn MessageData>, RegistryError> {
    Ok(Box::new(GenericMessageData::from_json(payload)?))
}

/// Register `(object, action)` with a handler counting its calls and
/// answering `applies`
pub fn register_counting(
    builder: &mut MessageRegistryBuilder,
    object: ObjectType,
    action: ActionType,
    signer: SignerClass,
    applies: bool,
) -> Arc<AtomicUsize> {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    builder
        .register(
            object,
            action,
            generic_builder,
            move |_: &ProcessableMessage<'_>| {
                counter.fetch_add(1, Ordering::SeqCst);
                applies
            },
            signer,
        )
        .unwrap();
    calls
}

pub fn signed(payload: Value) -> MessageEnvelope {
    MessageEnvelope::from_json(&payload, &KeyPair::generate()).unwrap()
}

pub fn roll_call_close() -> Value {
    json!({
        "object": "roll_call",
        "action": "close",
        "update_id": "x",
        "closes": "y",
        "closed_at": 1700000000,
        "attendees": []
    })
}
