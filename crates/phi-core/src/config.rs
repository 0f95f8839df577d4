//! Configuration loading and validation for the PHI encryption core.
//!
//! All values are read from environment variables by the host process at
//! startup. A missing or malformed master key is a fatal configuration error,
//! never a per-request condition.

use serde::Deserialize;
use thiserror::Error;

use crate::keys::{KeyError, MasterKey};

/// Errors produced while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The environment could not be read or deserialised into [`Config`].
    #[error("failed to load configuration from environment: {0}")]
    Load(#[source] config::ConfigError),

    /// A required value is absent or empty.
    #[error("{0} is required and must not be empty")]
    Missing(&'static str),

    /// A numeric value is outside its valid range.
    #[error("{0} must be > 0")]
    OutOfRange(&'static str),

    /// The master key is present but malformed (wrong length or not hex).
    #[error("PHI_MASTER_KEY is malformed: {0}")]
    MasterKey(#[from] KeyError),
}

/// Validated core configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Hex-encoded 256-bit field-encryption key. **Required.**
    pub phi_master_key: String,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Bounded depth of the audit event queue.
    #[serde(default = "default_audit_queue_depth")]
    pub audit_queue_depth: usize,

    /// How many times the audit worker retries a failed sink append before
    /// dropping the event.
    #[serde(default = "default_audit_retry_limit")]
    pub audit_retry_limit: u32,
}

fn default_log_level() -> String {
    "info".into()
}
fn default_audit_queue_depth() -> usize {
    1024
}
fn default_audit_retry_limit() -> u32 {
    3
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any required variable is absent, empty,
    /// or cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .map_err(ConfigError::Load)?;

        let c: Config = cfg.try_deserialize().map_err(ConfigError::Load)?;
        c.validate()?;
        Ok(c)
    }

    /// Parse the configured hex key into a validated [`MasterKey`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MasterKey`] if the value is not 64 hex characters.
    pub fn master_key(&self) -> Result<MasterKey, ConfigError> {
        Ok(MasterKey::from_hex(&self.phi_master_key)?)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.phi_master_key.trim().is_empty() {
            return Err(ConfigError::Missing("PHI_MASTER_KEY"));
        }
        if self.audit_queue_depth == 0 {
            return Err(ConfigError::OutOfRange("AUDIT_QUEUE_DEPTH"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The key hex must never reach logs, so Debug is written by hand.
        f.debug_struct("Config")
            .field("phi_master_key", &"[REDACTED]")
            .field("log_level", &self.log_level)
            .field("audit_queue_depth", &self.audit_queue_depth)
            .field("audit_retry_limit", &self.audit_retry_limit)
            .finish()
    }
}
