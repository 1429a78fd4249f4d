//! Configuration for emitter-backed sources.
//!
//! # Configuration Precedence
//!
//! Start from a base, then layer overrides on top; later layers win:
//!
//! 1. **Defaults**: built-in defaults from [`EmitterConfig::default()`], or
//!    **Config file**: values loaded from a TOML file (requires `config-file` feature)
//! 2. **Environment variables**: [`apply_env_overrides`] with `UNI_BRIDGE_*` env vars
//! 3. **Programmatic**: builder methods such as `catch_producer_panics(false)`
//!
//! # Supported Environment Variables
//!
//! | Variable | Type | Maps to |
//! |----------|------|---------|
//! | `UNI_BRIDGE_CATCH_PANICS` | `bool` | `catch_producer_panics` |
//! | `UNI_BRIDGE_NULL_FAILURE_MESSAGE` | `String` | `null_failure_message` |
//! | `UNI_BRIDGE_LABEL` | `String` | `label` |

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable name for the producer panic-catching toggle.
pub const ENV_CATCH_PANICS: &str = "UNI_BRIDGE_CATCH_PANICS";
/// Environment variable name for the message substituted for absent failures.
pub const ENV_NULL_FAILURE_MESSAGE: &str = "UNI_BRIDGE_NULL_FAILURE_MESSAGE";
/// Environment variable name for the log label.
pub const ENV_LABEL: &str = "UNI_BRIDGE_LABEL";

/// Default message for the synthetic failure substituted for `failure(None)`.
pub const DEFAULT_NULL_FAILURE_MESSAGE: &str = "failure signalled without an error";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable held an unparseable value.
    #[error("invalid value for {var}: expected {expected}, got {value:?}")]
    InvalidEnv {
        /// The variable name.
        var: &'static str,
        /// What the variable should contain.
        expected: &'static str,
        /// The raw value found.
        value: String,
    },

    /// A configuration file could not be read.
    #[error("failed to read config file: {source}")]
    Io {
        /// The source I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A configuration file could not be parsed.
    #[error("failed to parse config file: {details}")]
    Parse {
        /// Parser diagnostics.
        details: String,
    },
}

/// Per-operator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Convert producer panics into failures instead of unwinding into the
    /// subscriber's caller.
    pub catch_producer_panics: bool,
    /// Message of the invalid-argument failure delivered for `failure(None)`.
    pub null_failure_message: String,
    /// Optional label attached to log events.
    pub label: Option<String>,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            catch_producer_panics: true,
            null_failure_message: DEFAULT_NULL_FAILURE_MESSAGE.to_owned(),
            label: None,
        }
    }
}

impl EmitterConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether producer panics are caught.
    #[must_use]
    pub fn catch_producer_panics(mut self, enabled: bool) -> Self {
        self.catch_producer_panics = enabled;
        self
    }

    /// Sets the message used for the synthetic absent-failure error.
    #[must_use]
    pub fn null_failure_message(mut self, message: impl Into<String>) -> Self {
        self.null_failure_message = message.into();
        self
    }

    /// Sets the log label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Returns the label used in log events.
    #[must_use]
    pub fn label_or_default(&self) -> &str {
        self.label.as_deref().unwrap_or("uni")
    }

    /// Builds a configuration from defaults plus environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        apply_env_overrides(&mut config)?;
        Ok(config)
    }

    /// Parses a configuration from TOML text.
    #[cfg(feature = "config-file")]
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse {
            details: e.to_string(),
        })
    }

    /// Loads a configuration from a TOML file.
    #[cfg(feature = "config-file")]
    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

/// Apply environment variable overrides to an [`EmitterConfig`].
///
/// Only variables that are set in the environment are applied.
pub fn apply_env_overrides(config: &mut EmitterConfig) -> Result<(), ConfigError> {
    apply_overrides_from(config, |name| std::env::var(name).ok())
}

/// Apply overrides using an arbitrary variable lookup.
pub fn apply_overrides_from<F>(config: &mut EmitterConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup(ENV_CATCH_PANICS) {
        config.catch_producer_panics = parse_bool(ENV_CATCH_PANICS, &val)?;
    }
    if let Some(val) = lookup(ENV_NULL_FAILURE_MESSAGE) {
        config.null_failure_message = val;
    }
    if let Some(val) = lookup(ENV_LABEL) {
        config.label = Some(val);
    }
    Ok(())
}

fn parse_bool(var: &'static str, val: &str) -> Result<bool, ConfigError> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            var,
            expected: "boolean",
            value: val.to_owned(),
        }),
    }
}
