//! Helpers for router tests

use crate::core_codec::Hash;
use crate::core_protocol::{Channel, ProtocolSchemas, DEFAULT_MAX_FRAME_BYTES};
use crate::core_registry::{
    ActionType, FeatureRegistration, GenericMessageData, MessageData, MessageRegistry,
    MessageRegistryBuilder, ObjectType, ProcessableMessage, RegistryError, SignerClass,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Handler call counters of the test registry
#[derive(Default, Clone)]
pub struct Calls {
    pub chirps: Arc<AtomicUsize>,
    pub closes: Arc<AtomicUsize>,
}

impl Calls {
    pub fn chirps(&self) -> usize {
        self.chirps.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

fn generic(payload: &Value) -> Result<Box<dyn MessageData>, RegistryError> {
    Ok(Box::new(GenericMessageData::from_json(payload)?))
}

/// Chirps are signed with a PoP token and always applied; roll call
/// closes are signed by the organizer and never applicable
pub fn test_registry() -> (Arc<MessageRegistry>, Calls) {
    let calls = Calls::default();
    let chirps = Arc::clone(&calls.chirps);
    let closes = Arc::clone(&calls.closes);

    let social: FeatureRegistration = Box::new(
        move |builder: &mut MessageRegistryBuilder| -> Result<(), RegistryError> {
            builder.register(
                ObjectType::Chirp,
                ActionType::Add,
                generic,
                move |_: &ProcessableMessage<'_>| {
                    chirps.fetch_add(1, Ordering::SeqCst);
                    true
                },
                SignerClass::EventToken,
            )?;
            Ok(())
        },
    );
    let roll_call: FeatureRegistration = Box::new(
        move |builder: &mut MessageRegistryBuilder| -> Result<(), RegistryError> {
            builder.register(
                ObjectType::RollCall,
                ActionType::Close,
                generic,
                move |_: &ProcessableMessage<'_>| {
                    closes.fetch_add(1, Ordering::SeqCst);
                    false
                },
                SignerClass::MainIdentity,
            )?;
            Ok(())
        },
    );

    let registry = MessageRegistry::bootstrap(vec![social, roll_call]).unwrap();

    (Arc::new(registry), calls)
}

pub fn schemas() -> Arc<ProtocolSchemas> {
    Arc::new(ProtocolSchemas::new(DEFAULT_MAX_FRAME_BYTES).unwrap())
}

pub fn lao_channel() -> Channel {
    Channel::for_lao(&Hash::from_string("lao"))
}

pub fn chirp(text: &str) -> GenericMessageData {
    GenericMessageData::new(
        ObjectType::Chirp,
        ActionType::Add,
        json!({ "text": text, "timestamp": 1700000000 }),
    )
    .unwrap()
}

pub fn roll_call_close() -> GenericMessageData {
    GenericMessageData::new(
        ObjectType::RollCall,
        ActionType::Close,
        json!({ "update_id": "x", "closes": "y", "closed_at": 1700000000, "attendees": [] }),
    )
    .unwrap()
}

pub fn election_setup() -> GenericMessageData {
    GenericMessageData::new(ObjectType::Election, ActionType::Setup, json!({})).unwrap()
}
