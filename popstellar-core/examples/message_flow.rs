//! Sign, frame, parse and dispatch one message with logging enabled
//!
//! Run with:
//! ```bash
//! POPSTELLAR_LOG_LEVEL=debug cargo run --example message_flow
//! ```

use popstellar_core::config::Config;
use popstellar_core::core_codec::Hash;
use popstellar_core::core_message::KeyPair;
use popstellar_core::core_protocol::{Channel, ProtocolRequest, ProtocolSchemas};
use popstellar_core::core_registry::{
    ActionType, FeatureRegistration, GenericMessageData, MessageData, MessageRegistry,
    MessageRegistryBuilder, ObjectType, ProcessableMessage, RegistryError, SignerClass,
};
use popstellar_core::core_router::{InboundRouter, MessagePublisher};
use popstellar_core::core_wallet::{MemoryWalletStorage, PasswordCipher, Wallet};
use popstellar_core::logging::init_logging_from;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

fn social(builder: &mut MessageRegistryBuilder) -> Result<(), RegistryError> {
    builder.register(
        ObjectType::Chirp,
        ActionType::Add,
        |payload: &Value| -> Result<Box<dyn MessageData>, RegistryError> {
            Ok(Box::new(GenericMessageData::from_json(payload)?))
        },
        |message: &ProcessableMessage<'_>| {
            info!(channel = %message.channel, sender = %message.envelope.sender(), "Chirp received");
            true
        },
        SignerClass::EventToken,
    )?;
    Ok(())
}

#[tokio::main]
async fn main() {
    let config = Config::from_env().expect("Invalid configuration");
    init_logging_from(&config.logging).expect("Failed to initialize logging");

    let features: Vec<FeatureRegistration> = vec![Box::new(social)];
    let registry = Arc::new(MessageRegistry::bootstrap(features).expect("Registry bootstrap"));
    let schemas = Arc::new(
        ProtocolSchemas::new(config.protocol.max_frame_bytes).expect("Embedded schemas compile"),
    );

    let wallet = Wallet::new(
        Arc::new(MemoryWalletStorage::new()),
        Arc::new(PasswordCipher::new("demo password")),
        config.wallet.clone(),
    );
    let phrase = wallet.create().await.expect("Wallet creation");
    info!(words = phrase.word_count(), "Back up your recovery phrase");

    let lao_id = Hash::from_string_array(["organizer", "1700000000", "Demo LAO"]);
    let roll_call_id = Hash::from_string("demo roll call");
    let channel = Channel::for_lao(&lao_id);

    let publisher = MessagePublisher::from_config(
        Arc::clone(&registry),
        Arc::new(KeyPair::generate()),
        &config.protocol,
    );
    let chirp = GenericMessageData::new(
        ObjectType::Chirp,
        ActionType::Add,
        json!({ "text": "hello from the demo", "timestamp": 1700000000 }),
    )
    .expect("Valid chirp");

    let request = publisher
        .publish_as_attendee(&wallet, &lao_id, &roll_call_id, channel.clone(), &chirp)
        .await
        .expect("Publish");
    let frame = request.to_json().expect("Serialize");
    info!(bytes = frame.len(), "Publish frame ready");

    // Loop the message back as if the server had broadcast it
    let message = request.message().expect("Publish carries a message").clone();
    let broadcast = ProtocolRequest::broadcast(channel, message)
        .to_json()
        .expect("Serialize");

    let router = InboundRouter::new(registry, schemas);
    let delivery = router.handle_request(&broadcast).expect("Valid frame");
    info!(outcome = ?delivery.outcome, message_id = %delivery.message_id, "Delivered");
}
