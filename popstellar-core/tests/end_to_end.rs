/*
    End-to-End Integration Test

    An organizer and an attendee exchange messages through a simulated
    server relaying frames verbatim:
    - the organizer closes a roll call, signed with its main key
    - the attendee chirps, signed with the PoP token its wallet derives
    - a witness countersigns the chirp
    - a late client catches up on the channel
    - the attendee restores its wallet on a new device and gets the same token
*/

use popstellar_core::config::Config;
use popstellar_core::core_codec::Hash;
use popstellar_core::core_message::{KeyPair, WitnessSignature};
use popstellar_core::core_protocol::{
    Channel, ProtocolRequest, ProtocolResponse, ProtocolSchemas, SchemaValidator,
};
use popstellar_core::core_registry::{
    ActionType, FeatureRegistration, GenericMessageData, MessageData, MessageRegistry,
    MessageRegistryBuilder, ObjectType, ProcessableMessage, RegistryError, SignerClass,
};
use popstellar_core::core_router::{DispatchOutcome, InboundRouter, MessagePublisher};
use popstellar_core::core_wallet::{MemoryWalletStorage, PasswordCipher, Wallet};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

type Log = Arc<Mutex<Vec<String>>>;

fn generic(payload: &Value) -> Result<Box<dyn MessageData>, RegistryError> {
    Ok(Box::new(GenericMessageData::from_json(payload)?))
}

fn recording(log: Log) -> impl Fn(&ProcessableMessage<'_>) -> bool + Send + Sync + 'static {
    move |message: &ProcessableMessage<'_>| {
        log.lock().unwrap().push(format!(
            "{}#{} from {}",
            message.data.object(),
            message.data.action(),
            message.envelope.sender()
        ));
        true
    }
}

/// Registry of a client knowing roll calls and chirps
fn client_registry(log: Log) -> Arc<MessageRegistry> {
    let roll_calls_log = Arc::clone(&log);
    let roll_calls: FeatureRegistration = Box::new(
        move |builder: &mut MessageRegistryBuilder| -> Result<(), RegistryError> {
            builder.register(
                ObjectType::RollCall,
                ActionType::Close,
                generic,
                recording(roll_calls_log),
                SignerClass::MainIdentity,
            )?;
            Ok(())
        },
    );
    let social: FeatureRegistration = Box::new(
        move |builder: &mut MessageRegistryBuilder| -> Result<(), RegistryError> {
            builder.register(
                ObjectType::Chirp,
                ActionType::Add,
                generic,
                recording(log),
                SignerClass::EventToken,
            )?;
            Ok(())
        },
    );

    Arc::new(MessageRegistry::bootstrap(vec![roll_calls, social]).unwrap())
}

/// What the server does with a publish: relay the envelope as a broadcast
fn relay(frame: &str, schemas: &dyn SchemaValidator) -> String {
    let request = ProtocolRequest::parse(frame, schemas).unwrap();
    let message = request.message().unwrap().clone();
    ProtocolRequest::broadcast(request.channel().clone(), message)
        .to_json()
        .unwrap()
}

fn wallet(storage: MemoryWalletStorage) -> Wallet {
    Wallet::new(
        Arc::new(storage),
        Arc::new(PasswordCipher::with_cost("attendee password", 64, 1)),
        Config::default().wallet,
    )
}

#[tokio::test]
async fn test_end_to_end_roll_call_and_chirp() {
    let config = Config::default();
    let schemas = Arc::new(ProtocolSchemas::new(config.protocol.max_frame_bytes).unwrap());

    let lao_id = Hash::from_string_array(["organizer", "1700000000", "My LAO"]);
    let roll_call_id = Hash::from_string_array(["R", lao_id.to_string().as_str(), "rc"]);
    let lao_channel = Channel::for_lao(&lao_id);

    // ========================================================================
    // Phase 1: organizer, attendee and a listening client
    // ========================================================================
    let organizer_keys = KeyPair::generate();
    let organizer = MessagePublisher::from_config(
        client_registry(Arc::default()),
        Arc::new(organizer_keys.clone()),
        &config.protocol,
    );

    let attendee_wallet = wallet(MemoryWalletStorage::new());
    let phrase = attendee_wallet.create().await.unwrap();
    let attendee = MessagePublisher::from_config(
        client_registry(Arc::default()),
        Arc::new(KeyPair::generate()),
        &config.protocol,
    );

    let listener_log: Log = Arc::default();
    let listener = InboundRouter::new(client_registry(Arc::clone(&listener_log)), schemas.clone());

    // ========================================================================
    // Phase 2: the organizer closes the roll call
    // ========================================================================
    let token = attendee_wallet
        .generate_token(&lao_id, &roll_call_id)
        .await
        .unwrap();
    let close = GenericMessageData::new(
        ObjectType::RollCall,
        ActionType::Close,
        json!({
            "update_id": "u",
            "closes": roll_call_id.to_string(),
            "closed_at": 1700000100,
            "attendees": [token.public_key().to_string()]
        }),
    )
    .unwrap();

    let close_request = organizer
        .publish(lao_channel.clone(), &close, None)
        .unwrap();
    let close_message = close_request.message().unwrap().clone();
    let delivery = listener
        .handle_request(&relay(&close_request.to_json().unwrap(), schemas.as_ref()))
        .unwrap();
    assert!(delivery.is_applied());

    // ========================================================================
    // Phase 3: the attendee chirps with its token, a witness countersigns
    // ========================================================================
    let chirp = GenericMessageData::new(
        ObjectType::Chirp,
        ActionType::Add,
        json!({ "text": "hello LAO", "timestamp": 1700000200 }),
    )
    .unwrap();
    let chirp_request = attendee
        .publish_as_attendee(
            &attendee_wallet,
            &lao_id,
            &roll_call_id,
            lao_channel.subchannel("social").unwrap(),
            &chirp,
        )
        .await
        .unwrap();

    let chirp_message = chirp_request.message().unwrap();
    assert_eq!(chirp_message.sender(), token.public_key());

    let witness = KeyPair::generate();
    let witnessed = chirp_message
        .with_added_witness(WitnessSignature::sign(&witness, chirp_message.message_id()))
        .unwrap();
    assert_eq!(witnessed.message_id(), chirp_message.message_id());

    let broadcast = ProtocolRequest::broadcast(chirp_request.channel().clone(), witnessed.clone())
        .to_json()
        .unwrap();
    assert!(listener.handle_request(&broadcast).unwrap().is_applied());

    {
        let log = listener_log.lock().unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(
            log[0],
            format!("roll_call#close from {}", organizer_keys.public_key())
        );
        assert_eq!(log[1], format!("chirp#add from {}", token.public_key()));
    }

    // ========================================================================
    // Phase 4: a late client catches up on the LAO channel
    // ========================================================================
    let late_log: Log = Arc::default();
    let late = InboundRouter::new(client_registry(Arc::clone(&late_log)), schemas.clone());
    let late_publisher = MessagePublisher::from_config(
        client_registry(Arc::default()),
        Arc::new(KeyPair::generate()),
        &config.protocol,
    );

    let catchup = late_publisher.catchup(lao_channel.clone());
    let reply = ProtocolResponse::messages(
        catchup.id().unwrap(),
        vec![close_message, witnessed],
    )
    .to_json()
    .unwrap();
    let deliveries = late.handle_response(catchup.channel(), &reply).unwrap();

    assert_eq!(deliveries.len(), 2);
    assert!(deliveries
        .iter()
        .all(|d| d.outcome == DispatchOutcome::Applied));
    assert_eq!(late_log.lock().unwrap().len(), 2);

    // ========================================================================
    // Phase 5: the attendee restores its wallet elsewhere
    // ========================================================================
    let restored = wallet(MemoryWalletStorage::new());
    restored.import_mnemonic(phrase.expose()).await.unwrap();
    let restored_token = restored
        .recover_token(&lao_id, &roll_call_id, &[token.public_key().clone()])
        .await
        .unwrap();
    assert_eq!(restored_token.public_key(), token.public_key());
}

#[tokio::test]
async fn test_relayed_tampering_is_dropped() {
    let schemas = Arc::new(ProtocolSchemas::new(1 << 20).unwrap());
    let log: Log = Arc::default();
    let listener = InboundRouter::new(client_registry(Arc::clone(&log)), schemas.clone());
    let organizer = MessagePublisher::from_config(
        client_registry(Arc::default()),
        Arc::new(KeyPair::generate()),
        &Config::default().protocol,
    );

    let close = GenericMessageData::new(
        ObjectType::RollCall,
        ActionType::Close,
        json!({ "update_id": "u", "closes": "c", "closed_at": 1, "attendees": [] }),
    )
    .unwrap();
    let frame = relay(
        &organizer
            .publish(Channel::root(), &close, None)
            .unwrap()
            .to_json()
            .unwrap(),
        schemas.as_ref(),
    );

    // A relay swapping the sender key for its own
    let mut value: Value = serde_json::from_str(&frame).unwrap();
    value["params"]["message"]["sender"] =
        Value::String(KeyPair::generate().public_key().to_string());
    let tampered = serde_json::to_string(&value).unwrap();

    let delivery = listener.handle_request(&tampered).unwrap();
    assert!(matches!(delivery.outcome, DispatchOutcome::Rejected(_)));
    assert!(log.lock().unwrap().is_empty());
}
