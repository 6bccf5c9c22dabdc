//! Wallet lifecycle tests

use super::helpers::*;
use crate::core_codec::Hash;
use crate::core_wallet::{
    derive_key_pair, seed_from_mnemonic, FileWalletStorage, TokenKey, Wallet, WalletError,
    WalletStorage,
};
use std::sync::Arc;

fn lao() -> Hash {
    Hash::from_string("lao")
}

fn roll_call(name: &str) -> Hash {
    Hash::from_string(name)
}

#[tokio::test]
async fn test_create_then_export() {
    let (wallet, storage) = memory_wallet();
    assert!(!wallet.has_seed().await.unwrap());

    let phrase = wallet.create().await.unwrap();
    assert_eq!(phrase.word_count(), 12);
    assert!(wallet.has_seed().await.unwrap());
    assert_eq!(storage.len().await, 2);

    let exported = wallet.export_mnemonic().await.unwrap();
    assert_eq!(exported.expose(), phrase.expose());
}

#[tokio::test]
async fn test_create_twice_fails() {
    let (wallet, _) = memory_wallet();
    wallet.create().await.unwrap();
    assert!(matches!(
        wallet.create().await,
        Err(WalletError::AlreadyInitialized)
    ));
}

#[tokio::test]
async fn test_uninitialized_wallet() {
    let (wallet, _) = memory_wallet();
    assert!(matches!(
        wallet.export_mnemonic().await,
        Err(WalletError::NotInitialized)
    ));
    assert!(matches!(
        wallet.generate_token(&lao(), &roll_call("rc")).await,
        Err(WalletError::NotInitialized)
    ));
}

#[tokio::test]
async fn test_imported_phrase_yields_expected_token() {
    let (wallet, _) = memory_wallet();
    wallet.import_mnemonic(PHRASE).await.unwrap();

    let token = wallet.generate_token(&lao(), &roll_call("rc")).await.unwrap();
    let seed = seed_from_mnemonic(PHRASE).unwrap();
    let expected = derive_key_pair(seed.as_bytes(), &lao(), &roll_call("rc")).unwrap();

    assert_eq!(token.public_key(), expected.public_key());
}

#[tokio::test]
async fn test_tokens_are_scoped_to_roll_calls() {
    let (wallet, _) = memory_wallet();
    wallet.import_mnemonic(PHRASE).await.unwrap();

    let first = wallet.generate_token(&lao(), &roll_call("rc1")).await.unwrap();
    let again = wallet.generate_token(&lao(), &roll_call("rc1")).await.unwrap();
    let second = wallet.generate_token(&lao(), &roll_call("rc2")).await.unwrap();

    assert_eq!(first.public_key(), again.public_key());
    assert_ne!(first.public_key(), second.public_key());
}

#[tokio::test]
async fn test_import_replaces_seed() {
    let (wallet, _) = memory_wallet();
    wallet.create().await.unwrap();
    let before = wallet.generate_token(&lao(), &roll_call("rc")).await.unwrap();

    wallet.import_mnemonic(PHRASE).await.unwrap();
    let after = wallet.generate_token(&lao(), &roll_call("rc")).await.unwrap();

    assert_ne!(before.public_key(), after.public_key());
    assert_eq!(wallet.export_mnemonic().await.unwrap().expose(), PHRASE);
}

#[tokio::test]
async fn test_import_rejects_invalid_phrase() {
    let (wallet, storage) = memory_wallet();
    let result = wallet.import_mnemonic("not a real phrase").await;

    assert!(matches!(result, Err(WalletError::InvalidMnemonic(_))));
    assert!(storage.is_empty().await);
}

#[tokio::test]
async fn test_recover_token_checks_attendees() {
    let (wallet, _) = memory_wallet();
    wallet.import_mnemonic(PHRASE).await.unwrap();
    let token = wallet.generate_token(&lao(), &roll_call("rc")).await.unwrap();

    let attendees = vec![token.public_key().clone()];
    let recovered = wallet
        .recover_token(&lao(), &roll_call("rc"), &attendees)
        .await
        .unwrap();
    assert_eq!(recovered.public_key(), token.public_key());

    assert!(matches!(
        wallet.recover_token(&lao(), &roll_call("other"), &attendees).await,
        Err(WalletError::NotAnAttendee(_))
    ));
}

#[tokio::test]
async fn test_recover_tokens_batch() {
    let (wallet, _) = memory_wallet();
    wallet.import_mnemonic(PHRASE).await.unwrap();

    let keys: Vec<TokenKey> = ["rc1", "rc2", "rc3"]
        .iter()
        .map(|rc| TokenKey::new(lao(), roll_call(rc)))
        .collect();
    let recovered = wallet.recover_tokens(keys.clone()).await.unwrap();

    assert_eq!(recovered.len(), 3);
    for key in &keys {
        let single = wallet
            .generate_token(&key.lao_id, &key.roll_call_id)
            .await
            .unwrap();
        assert_eq!(recovered[key].public_key(), single.public_key());
    }
}

#[tokio::test]
async fn test_wipe() {
    let (wallet, storage) = memory_wallet();
    wallet.create().await.unwrap();

    wallet.wipe().await.unwrap();
    assert!(!wallet.has_seed().await.unwrap());
    assert!(storage.is_empty().await);

    // Wiping an empty wallet is fine
    wallet.wipe().await.unwrap();
}

#[tokio::test]
async fn test_wrong_password_cannot_read_seed() {
    let (wallet, storage) = memory_wallet();
    wallet.import_mnemonic(PHRASE).await.unwrap();

    let intruder = Wallet::new(
        Arc::new(storage.clone()),
        cheap_cipher("wrong password"),
        test_config(),
    );
    assert!(intruder.has_seed().await.unwrap());
    assert!(matches!(
        intruder.generate_token(&lao(), &roll_call("rc")).await,
        Err(WalletError::InvalidPassword)
    ));
}

#[tokio::test]
async fn test_blobs_hold_no_plaintext() {
    let (wallet, storage) = memory_wallet();
    wallet.import_mnemonic(PHRASE).await.unwrap();

    let seed = seed_from_mnemonic(PHRASE).unwrap();
    let seed_blob = storage.get("test-wallet.seed").await.unwrap().unwrap();
    let mnemonic_blob = storage.get("test-wallet.mnemonic").await.unwrap().unwrap();

    assert!(!seed_blob
        .windows(seed.as_bytes().len())
        .any(|w| w == seed.as_bytes()));
    assert!(!mnemonic_blob
        .windows(PHRASE.len())
        .any(|w| w == PHRASE.as_bytes()));
}

#[tokio::test]
async fn test_storage_ids_are_isolated() {
    let (alice, storage) = memory_wallet();
    alice.import_mnemonic(PHRASE).await.unwrap();

    let mut config = test_config();
    config.storage_id = "bob".to_string();
    let bob = Wallet::new(Arc::new(storage), cheap_cipher(PASSWORD), config);

    assert!(!bob.has_seed().await.unwrap());
}

#[tokio::test]
async fn test_wallet_survives_restart_on_disk() {
    let dir = tempfile::TempDir::new().unwrap();

    let first = wallet_on(Arc::new(FileWalletStorage::new(dir.path()).unwrap()));
    first.import_mnemonic(PHRASE).await.unwrap();
    let token = first.generate_token(&lao(), &roll_call("rc")).await.unwrap();
    drop(first);

    let reopened = wallet_on(Arc::new(FileWalletStorage::new(dir.path()).unwrap()));
    let again = reopened.generate_token(&lao(), &roll_call("rc")).await.unwrap();
    assert_eq!(token.public_key(), again.public_key());
    assert!(dir.path().join("test-wallet.seed.blob").exists());
}

#[tokio::test]
async fn test_failed_mnemonic_write_leaves_no_seed() {
    let (wallet, storage) = failing_wallet();
    storage.fail_puts_on(".mnemonic");

    assert!(matches!(wallet.create().await, Err(WalletError::Storage(_))));
    assert!(!wallet.has_seed().await.unwrap());
    assert!(storage.inner.is_empty().await);

    // Once storage recovers the wallet can still be created and backed up
    storage.heal();
    let phrase = wallet.create().await.unwrap();
    let exported = wallet.export_mnemonic().await.unwrap();
    assert_eq!(exported.expose(), phrase.expose());
}

#[tokio::test]
async fn test_failed_seed_write_rolls_back_mnemonic() {
    let (wallet, storage) = failing_wallet();
    storage.fail_puts_on(".seed");

    assert!(wallet.import_mnemonic(PHRASE).await.is_err());
    assert!(!wallet.has_seed().await.unwrap());
    assert!(storage.inner.is_empty().await);
    assert!(matches!(
        wallet.export_mnemonic().await,
        Err(WalletError::NotInitialized)
    ));
}

#[tokio::test]
async fn test_failed_import_keeps_previous_wallet() {
    let (wallet, storage) = failing_wallet();
    let original = wallet.create().await.unwrap();
    let token = wallet.generate_token(&lao(), &roll_call("rc")).await.unwrap();

    storage.fail_puts_on(".seed");
    assert!(wallet.import_mnemonic(PHRASE).await.is_err());
    storage.heal();

    assert!(wallet.has_seed().await.unwrap());
    assert_eq!(wallet.export_mnemonic().await.unwrap().expose(), original.expose());
    let again = wallet.generate_token(&lao(), &roll_call("rc")).await.unwrap();
    assert_eq!(token.public_key(), again.public_key());
}
