//! BIP-39 mnemonics and root seeds

use super::WalletError;
use rand::RngCore;
use secrecy::{ExposeSecret, Secret};
use std::fmt;
use zeroize::{Zeroize, Zeroizing};

/// Length of a BIP-39 seed
pub const SEED_LENGTH: usize = 64;

/// Word count of freshly generated phrases
pub const DEFAULT_WORD_COUNT: usize = 12;

/// A BIP-39 phrase, normalized to single-space separated lowercase words
pub struct MnemonicPhrase(Secret<String>);

impl MnemonicPhrase {
    /// Validate a user supplied phrase
    ///
    /// Case and surrounding or repeated whitespace are ignored.
    pub fn parse(phrase: &str) -> Result<Self, WalletError> {
        let normalized = Zeroizing::new(
            phrase
                .split_whitespace()
                .map(str::to_lowercase)
                .collect::<Vec<_>>()
                .join(" "),
        );
        let mnemonic = bip39::Mnemonic::parse_normalized(&normalized)
            .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;
        Ok(MnemonicPhrase(Secret::new(mnemonic.to_string())))
    }

    /// Rebuild from bytes previously produced by `as_bytes`
    pub(crate) fn from_stored(bytes: &[u8]) -> Result<Self, WalletError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| WalletError::Storage(format!("mnemonic blob is not UTF-8: {}", e)))?;
        Self::parse(text)
    }

    pub fn words(&self) -> Vec<String> {
        self.0
            .expose_secret()
            .split(' ')
            .map(str::to_string)
            .collect()
    }

    pub fn word_count(&self) -> usize {
        self.0.expose_secret().split(' ').count()
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.expose_secret().as_bytes()
    }

    /// BIP-39 seed with an empty passphrase
    pub fn to_seed(&self) -> Result<RootSeed, WalletError> {
        let mnemonic = bip39::Mnemonic::parse_normalized(self.0.expose_secret())
            .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;
        Ok(RootSeed::from_bytes(&mnemonic.to_seed_normalized("")))
    }
}

impl fmt::Debug for MnemonicPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MnemonicPhrase(<{} words>)", self.word_count())
    }
}

/// The secret every token is derived from
///
/// Zeroized on drop.
#[derive(Clone)]
pub struct RootSeed(Zeroizing<Vec<u8>>);

impl RootSeed {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        RootSeed(Zeroizing::new(bytes.to_vec()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for RootSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RootSeed(<redacted>)")
    }
}

/// Generate a new English phrase of 12 or 24 words from fresh entropy
pub fn generate_mnemonic(words: usize) -> Result<MnemonicPhrase, WalletError> {
    let entropy_len = match words {
        12 => 16,
        24 => 32,
        other => {
            return Err(WalletError::InvalidMnemonic(format!(
                "unsupported word count {}, expected 12 or 24",
                other
            )))
        }
    };

    let mut entropy = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut entropy[..entropy_len]);
    let mnemonic = bip39::Mnemonic::from_entropy(&entropy[..entropy_len])
        .map_err(|e| WalletError::Cryptographic(e.to_string()));
    entropy.zeroize();

    Ok(MnemonicPhrase(Secret::new(mnemonic?.to_string())))
}

/// Seed of a user supplied phrase, with an empty passphrase
pub fn seed_from_mnemonic(phrase: &str) -> Result<RootSeed, WalletError> {
    MnemonicPhrase::parse(phrase)?.to_seed()
}
