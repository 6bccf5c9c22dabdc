//! PoP token wallet
//!
//! Holds one root seed, persisted as two independently encrypted blobs:
//! `<storage_id>.seed` and `<storage_id>.mnemonic`. The plaintext seed only
//! exists for the duration of a single call.

use super::derivation::derive_key_pair;
use super::mnemonic::{generate_mnemonic, MnemonicPhrase, RootSeed};
use super::recovery::{recover_all, TokenKey};
use super::storage::{SecureStorage, WalletStorage};
use super::WalletError;
use crate::config::WalletConfig;
use crate::core_codec::Hash;
use crate::core_message::{KeyPair, PublicKey};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Keypair an attendee signs with inside one roll call
pub type PopToken = KeyPair;

pub struct Wallet {
    storage: Arc<dyn WalletStorage>,
    cipher: Arc<dyn SecureStorage>,
    config: WalletConfig,
}

impl Wallet {
    pub fn new(
        storage: Arc<dyn WalletStorage>,
        cipher: Arc<dyn SecureStorage>,
        config: WalletConfig,
    ) -> Self {
        Wallet {
            storage,
            cipher,
            config,
        }
    }

    fn seed_key(&self) -> String {
        format!("{}.seed", self.config.storage_id)
    }

    fn mnemonic_key(&self) -> String {
        format!("{}.mnemonic", self.config.storage_id)
    }

    /// Set the wallet up with a fresh phrase and return it for backup
    pub async fn create(&self) -> Result<MnemonicPhrase, WalletError> {
        if self.has_seed().await? {
            return Err(WalletError::AlreadyInitialized);
        }
        let phrase = generate_mnemonic(self.config.mnemonic_words)?;
        self.store(&phrase).await?;
        info!(words = phrase.word_count(), "Wallet created");
        Ok(phrase)
    }

    /// Restore from a backed-up phrase, replacing any current seed
    pub async fn import_mnemonic(&self, phrase: &str) -> Result<(), WalletError> {
        let phrase = MnemonicPhrase::parse(phrase)?;
        self.store(&phrase).await?;
        info!(words = phrase.word_count(), "Wallet imported");
        Ok(())
    }

    /// Persist both blobs, mnemonic first
    ///
    /// On a failed write the previous blobs are put back, so storage never
    /// holds a seed whose phrase cannot be exported.
    async fn store(&self, phrase: &MnemonicPhrase) -> Result<(), WalletError> {
        let seed = phrase.to_seed()?;
        let sealed_seed = self.cipher.encrypt(seed.as_bytes()).await?;
        let sealed_mnemonic = self.cipher.encrypt(phrase.as_bytes()).await?;

        let (seed_key, mnemonic_key) = (self.seed_key(), self.mnemonic_key());
        let previous_mnemonic = self.storage.get(&mnemonic_key).await?;
        let previous_seed = self.storage.get(&seed_key).await?;

        let written = match self.storage.put(&mnemonic_key, &sealed_mnemonic).await {
            Ok(()) => self.storage.put(&seed_key, &sealed_seed).await,
            Err(e) => Err(e),
        };

        if let Err(e) = written {
            warn!(error = %e, "Wallet write failed, restoring previous state");
            self.restore(&mnemonic_key, previous_mnemonic).await;
            self.restore(&seed_key, previous_seed).await;
            return Err(e);
        }
        Ok(())
    }

    async fn restore(&self, key: &str, previous: Option<Vec<u8>>) {
        let restored = match previous {
            Some(blob) => self.storage.put(key, &blob).await,
            None => self.storage.delete(key).await,
        };
        if let Err(e) = restored {
            warn!(key, error = %e, "Failed to restore wallet blob");
        }
    }

    /// True once both the seed and its phrase are stored
    pub async fn has_seed(&self) -> Result<bool, WalletError> {
        Ok(self.storage.get(&self.seed_key()).await?.is_some()
            && self.storage.get(&self.mnemonic_key()).await?.is_some())
    }

    /// Decrypt the phrase for the user to back up
    pub async fn export_mnemonic(&self) -> Result<MnemonicPhrase, WalletError> {
        let sealed = self
            .storage
            .get(&self.mnemonic_key())
            .await?
            .ok_or(WalletError::NotInitialized)?;
        let plaintext = self.cipher.decrypt(&sealed).await?;
        MnemonicPhrase::from_stored(&plaintext)
    }

    async fn load_seed(&self) -> Result<RootSeed, WalletError> {
        let sealed = self
            .storage
            .get(&self.seed_key())
            .await?
            .ok_or(WalletError::NotInitialized)?;
        let plaintext = self.cipher.decrypt(&sealed).await?;
        Ok(RootSeed::from_bytes(&plaintext))
    }

    /// Token of the roll call `roll_call_id` in LAO `lao_id`
    pub async fn generate_token(
        &self,
        lao_id: &Hash,
        roll_call_id: &Hash,
    ) -> Result<PopToken, WalletError> {
        let seed = self.load_seed().await?;
        let token = derive_key_pair(seed.as_bytes(), lao_id, roll_call_id)?;
        debug!(lao_id = %lao_id, roll_call_id = %roll_call_id, "Derived PoP token");
        Ok(token)
    }

    /// Token of a closed roll call, only if it is among the attendees
    pub async fn recover_token(
        &self,
        lao_id: &Hash,
        roll_call_id: &Hash,
        attendees: &[PublicKey],
    ) -> Result<PopToken, WalletError> {
        let token = self.generate_token(lao_id, roll_call_id).await?;
        if attendees.contains(token.public_key()) {
            Ok(token)
        } else {
            Err(WalletError::NotAnAttendee(token.public_key().to_string()))
        }
    }

    /// Derive the tokens of many roll calls on the recovery pool
    pub async fn recover_tokens(
        &self,
        pairs: Vec<TokenKey>,
    ) -> Result<HashMap<TokenKey, PopToken>, WalletError> {
        let seed = self.load_seed().await?;
        let workers = self.config.recovery_workers;

        tokio::task::spawn_blocking(move || recover_all(&seed, &pairs, workers))
            .await
            .map_err(|e| WalletError::Derivation(format!("Recovery task failed: {}", e)))?
    }

    /// Erase both blobs
    pub async fn wipe(&self) -> Result<(), WalletError> {
        self.storage.delete(&self.seed_key()).await?;
        self.storage.delete(&self.mnemonic_key()).await?;
        info!("Wallet wiped");
        Ok(())
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("storage_id", &self.config.storage_id)
            .finish()
    }
}
