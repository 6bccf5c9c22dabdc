//! Logging for popstellar-core
//!
//! Everything in the crate logs through `tracing` macros. Installing a
//! subscriber is left to the embedding application; `init_logging_from`
//! wires the `[logging]` section of the library configuration into a
//! `tracing-subscriber` registry.

use crate::config::LoggingConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod error;
mod level;

pub use error::LoggingError;
pub use level::LogLevel;

/// Subscriber settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Minimum level, overridden by `RUST_LOG` when set
    pub level: LogLevel,
    pub with_target: bool,
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            with_target: true,
            json_format: false,
        }
    }
}

impl LogConfig {
    pub fn new(level: LogLevel) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    pub fn json_format(mut self, enabled: bool) -> Self {
        self.json_format = enabled;
        self
    }

    /// Build subscriber settings from the `[logging]` configuration section
    pub fn from_config(config: &LoggingConfig) -> Result<Self, LoggingError> {
        let level = config.level.parse::<LogLevel>()?;
        Ok(Self::new(level)
            .with_target(config.with_target)
            .json_format(config.json_format))
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("popstellar_core={}", self.level.as_str()))
        })
    }
}

/// Install a subscriber with default settings
///
/// # Example
/// ```
/// use popstellar_core::logging::init_logging;
///
/// init_logging().expect("Failed to initialize logging");
/// ```
pub fn init_logging() -> Result<(), LoggingError> {
    init_logging_with_config(LogConfig::default())
}

/// Install a subscriber configured from the library configuration
///
/// # Example
/// ```
/// use popstellar_core::config::Config;
/// use popstellar_core::logging::init_logging_from;
///
/// let config = Config::default();
/// init_logging_from(&config.logging).expect("Failed to initialize logging");
/// ```
pub fn init_logging_from(config: &LoggingConfig) -> Result<(), LoggingError> {
    init_logging_with_config(LogConfig::from_config(config)?)
}

/// Install a subscriber with explicit settings
///
/// Fails if a global subscriber is already set.
pub fn init_logging_with_config(config: LogConfig) -> Result<(), LoggingError> {
    let fmt_layer = fmt::layer().with_target(config.with_target);
    let registry = tracing_subscriber::registry().with(config.filter());

    let installed = if config.json_format {
        registry.with(fmt_layer.json()).try_init()
    } else {
        registry.with(fmt_layer).try_init()
    };

    installed.map_err(|e| LoggingError::InitializationFailed(e.to_string()))
}
