//! Helpers for wallet tests

use crate::config::WalletConfig;
use crate::core_wallet::{MemoryWalletStorage, PasswordCipher, Wallet, WalletError, WalletStorage};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Phrase with a published BIP-39 seed, see `mnemonic.rs`
pub const PHRASE: &str =
    "garbage effort river orphan negative kind outside quit hat camera approve first";

pub const PASSWORD: &str = "correct horse battery staple";

/// Argon2 at its cheapest so tests stay fast
pub fn cheap_cipher(password: &str) -> Arc<PasswordCipher> {
    Arc::new(PasswordCipher::with_cost(password, 64, 1))
}

pub fn test_config() -> WalletConfig {
    WalletConfig {
        mnemonic_words: 12,
        recovery_workers: 2,
        storage_id: "test-wallet".to_string(),
    }
}

pub fn wallet_on(storage: Arc<dyn WalletStorage>) -> Wallet {
    Wallet::new(storage, cheap_cipher(PASSWORD), test_config())
}

/// Fresh wallet over memory storage, plus a handle on that storage
pub fn memory_wallet() -> (Wallet, MemoryWalletStorage) {
    let storage = MemoryWalletStorage::new();
    (wallet_on(Arc::new(storage.clone())), storage)
}

/// Memory storage whose `put` fails for keys ending in a chosen suffix
#[derive(Clone, Default)]
pub struct FailingStorage {
    pub inner: MemoryWalletStorage,
    failing_suffix: Arc<Mutex<Option<&'static str>>>,
}

impl FailingStorage {
    pub fn fail_puts_on(&self, suffix: &'static str) {
        *self.failing_suffix.lock().unwrap() = Some(suffix);
    }

    pub fn heal(&self) {
        *self.failing_suffix.lock().unwrap() = None;
    }
}

#[async_trait]
impl WalletStorage for FailingStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, WalletError> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, blob: &[u8]) -> Result<(), WalletError> {
        let failing = *self.failing_suffix.lock().unwrap();
        match failing {
            Some(suffix) if key.ends_with(suffix) => {
                Err(WalletError::Storage("disk full".to_string()))
            }
            _ => self.inner.put(key, blob).await,
        }
    }

    async fn delete(&self, key: &str) -> Result<(), WalletError> {
        self.inner.delete(key).await
    }
}

/// Wallet over a `FailingStorage`, plus a handle on that storage
pub fn failing_wallet() -> (Wallet, FailingStorage) {
    let storage = FailingStorage::default();
    (wallet_on(Arc::new(storage.clone())), storage)
}
