//! Configuration management for popstellar-core
//!
//! Defaults, TOML files and `POPSTELLAR_*` environment overrides, validated
//! before use.

use crate::core_protocol::{DEFAULT_ID_WRAP, DEFAULT_MAX_FRAME_BYTES};
use crate::core_wallet::DEFAULT_WORD_COUNT;
use serde::{Deserialize, Serialize};
use std::env;

mod error;

pub use error::ConfigError;

/// Library configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Protocol framing
    pub protocol: ProtocolConfig,

    /// Wallet and token recovery
    pub wallet: WalletConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Protocol framing configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Frames longer than this are rejected before parsing
    pub max_frame_bytes: usize,

    /// Request ids wrap back to 1 when they reach this value
    pub request_id_wrap: i64,
}

/// Wallet configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Words of a freshly created mnemonic (12 or 24)
    pub mnemonic_words: usize,

    /// Threads of the batch recovery pool
    pub recovery_workers: usize,

    /// Prefix of the persisted blobs
    pub storage_id: String,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON formatting
    pub json_format: bool,

    /// Include target module
    pub with_target: bool,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
            request_id_wrap: DEFAULT_ID_WRAP,
        }
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            mnemonic_words: DEFAULT_WORD_COUNT,
            recovery_workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            storage_id: "popstellar-wallet".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            with_target: true,
        }
    }
}

fn parse_var<T>(value: &str, what: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| ConfigError::InvalidValue(format!("Invalid {}: {}", what, e)))
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Environment variables follow the pattern: POPSTELLAR_<SECTION>_<KEY>
    /// Example: POPSTELLAR_WALLET_RECOVERY_WORKERS=8
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        // Protocol config
        if let Some(max) = lookup("POPSTELLAR_PROTOCOL_MAX_FRAME_BYTES") {
            config.protocol.max_frame_bytes = parse_var(&max, "max frame bytes")?;
        }
        if let Some(wrap) = lookup("POPSTELLAR_PROTOCOL_REQUEST_ID_WRAP") {
            config.protocol.request_id_wrap = parse_var(&wrap, "request id wrap")?;
        }

        // Wallet config
        if let Some(words) = lookup("POPSTELLAR_WALLET_MNEMONIC_WORDS") {
            config.wallet.mnemonic_words = parse_var(&words, "mnemonic word count")?;
        }
        if let Some(workers) = lookup("POPSTELLAR_WALLET_RECOVERY_WORKERS") {
            config.wallet.recovery_workers = parse_var(&workers, "recovery workers")?;
        }
        if let Some(storage_id) = lookup("POPSTELLAR_WALLET_STORAGE_ID") {
            config.wallet.storage_id = storage_id;
        }

        // Logging config
        if let Some(level) = lookup("POPSTELLAR_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Some(json) = lookup("POPSTELLAR_LOG_JSON") {
            config.logging.json_format = parse_var(&json, "JSON flag")?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::FileReadError(e.to_string()))?;

        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.protocol.max_frame_bytes == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_frame_bytes must be greater than 0".to_string(),
            ));
        }

        if self.protocol.request_id_wrap < 2 {
            return Err(ConfigError::ValidationFailed(
                "request_id_wrap must be at least 2".to_string(),
            ));
        }

        if !matches!(self.wallet.mnemonic_words, 12 | 24) {
            return Err(ConfigError::ValidationFailed(format!(
                "mnemonic_words must be 12 or 24, got {}",
                self.wallet.mnemonic_words
            )));
        }

        if self.wallet.recovery_workers == 0 {
            return Err(ConfigError::ValidationFailed(
                "recovery_workers must be greater than 0".to_string(),
            ));
        }

        if self.wallet.storage_id.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "storage_id must not be empty".to_string(),
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid log level: {}",
                self.logging.level
            )));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: impl AsRef<std::path::Path>) -> Result<(), ConfigError> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, contents).map_err(|e| ConfigError::FileWriteError(e.to_string()))?;

        Ok(())
    }
}
