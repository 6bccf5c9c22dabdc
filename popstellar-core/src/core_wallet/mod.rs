//! Identity derivation module
//!
//! Deterministic, event-scoped identities ("PoP tokens") derived from one
//! BIP-39 root seed, so every client derives bit-identical tokens:
//!
//! ```text
//! mnemonic --BIP-39--> root seed --SLIP-0010 m/888'/0'/<lao>/<roll call>--> token
//! ```
//!
//! The root seed is only persisted encrypted, through the `SecureStorage` and
//! `WalletStorage` seams.

mod derivation;
mod mnemonic;
mod recovery;
mod storage;
mod wallet;

pub use derivation::{derive_key_pair, DerivationPath, ACCOUNT, PURPOSE};
pub use mnemonic::{
    generate_mnemonic, seed_from_mnemonic, MnemonicPhrase, RootSeed, DEFAULT_WORD_COUNT,
    SEED_LENGTH,
};
pub use recovery::{recover_all, TokenKey};
pub use storage::{
    FileWalletStorage, MemoryWalletStorage, PasswordCipher, SecureStorage, WalletStorage,
    DEFAULT_ARGON2_ITERATIONS, DEFAULT_ARGON2_MEMORY_KIB,
};
pub use wallet::{PopToken, Wallet};

use thiserror::Error;

/// Wallet errors
#[derive(Debug, Error)]
pub enum WalletError {
    /// No seed has been created or imported yet
    #[error("Wallet has no seed")]
    NotInitialized,

    #[error("Wallet already holds a seed")]
    AlreadyInitialized,

    #[error("Cryptographic error: {0}")]
    Cryptographic(String),

    #[error("Invalid password")]
    InvalidPassword,

    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Derivation error: {0}")]
    Derivation(String),

    /// The derived token is not among a roll call's attendees
    #[error("Token {0} did not attend this roll call")]
    NotAnAttendee(String),
}

#[cfg(test)]
mod tests;
