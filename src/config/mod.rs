//! Registry configuration module
//!
//! `RegistryConfig` carries the four parameters the session registry reads
//! at construction time. It can be built in code, read from a JSON document
//! or layered from a JSON document plus environment variables using the
//! `config` and `dotenvy` crates. Environment variables use the
//! `SESSION_REGISTRY` prefix and `__` as the separator.
//!
//! # Example
//!
//! ```no_run
//! use session_registry::config::RegistryConfig;
//!
//! let config = RegistryConfig::from_file("registry.json").expect("Failed to load configuration");
//! println!("{}", config);
//! ```

mod error;

pub use error::{ConfigError, ValidationError};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Default seconds of inactivity before a session is reaped (30 minutes)
pub const DEFAULT_INACTIVE_TIMEOUT_SECS: u64 = 1800;

/// Default seconds between reaper sweeps (5 minutes)
pub const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 300;

/// Default cap on concurrently active sessions per user
pub const DEFAULT_MAX_SESSIONS_PER_USER: usize = 5;

/// Environment variable prefix for layered loading
pub const ENV_PREFIX: &str = "SESSION_REGISTRY";

/// Session registry configuration
///
/// Immutable once handed to a registry; the registry keeps its own copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Seconds of inactivity after which a session may be reaped
    #[serde(default = "default_inactive_timeout")]
    pub inactive_timeout: u64,

    /// Seconds between reaper sweeps
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval: u64,

    /// Maximum concurrently active sessions per user
    #[serde(default = "default_max_sessions_per_user")]
    pub max_sessions_per_user: usize,

    /// Whether the background reaper starts with the registry
    #[serde(default = "default_enable_auto_cleanup")]
    pub enable_auto_cleanup: bool,
}

impl RegistryConfig {
    /// Load configuration from a JSON file
    ///
    /// Fields absent from the document take their defaults.
    ///
    /// # Errors
    ///
    /// - `NotFound` if `path` does not exist
    /// - `Parse` if the document is malformed or a field has the wrong type
    /// - `ValidationFailed` if a value is zero or negative
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let (_, config) = read_document(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from an optional JSON file and the environment
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads the JSON file at `path`, if given
    /// 3. Overrides with `SESSION_REGISTRY__*` environment variables
    /// 4. Validates the result
    ///
    /// # Environment Variable Format
    ///
    /// - `SESSION_REGISTRY__INACTIVE_TIMEOUT=60` -> `inactive_timeout = 60`
    /// - `SESSION_REGISTRY__ENABLE_AUTO_CLEANUP=false` -> `enable_auto_cleanup = false`
    ///
    /// The file is type-checked strictly; only environment values are
    /// parsed from strings.
    ///
    /// # Errors
    ///
    /// Same as [`RegistryConfig::from_file`], plus `Load` if an environment
    /// value cannot be converted.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let mut builder = config::Config::builder();
        if let Some(path) = path {
            let (contents, _) = read_document(path)?;
            builder = builder.add_source(config::File::from_str(
                &contents,
                config::FileFormat::Json,
            ));
        }

        let config: Self = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as a pretty-printed JSON document
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns `NonPositive` for a zero timeout, interval or cap.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.inactive_timeout == 0 {
            return Err(ValidationError::NonPositive { field: "inactive_timeout" });
        }
        if self.cleanup_interval == 0 {
            return Err(ValidationError::NonPositive { field: "cleanup_interval" });
        }
        if self.max_sessions_per_user == 0 {
            return Err(ValidationError::NonPositive { field: "max_sessions_per_user" });
        }
        Ok(())
    }

    /// Inactivity timeout as a `Duration`
    pub fn inactive_timeout(&self) -> Duration {
        Duration::from_secs(self.inactive_timeout)
    }

    /// Reaper interval as a `Duration`
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval)
    }

    pub fn with_inactive_timeout(mut self, secs: u64) -> Self {
        self.inactive_timeout = secs;
        self
    }

    pub fn with_cleanup_interval(mut self, secs: u64) -> Self {
        self.cleanup_interval = secs;
        self
    }

    pub fn with_max_sessions_per_user(mut self, max: usize) -> Self {
        self.max_sessions_per_user = max;
        self
    }

    pub fn with_auto_cleanup(mut self, enabled: bool) -> Self {
        self.enable_auto_cleanup = enabled;
        self
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            inactive_timeout: default_inactive_timeout(),
            cleanup_interval: default_cleanup_interval(),
            max_sessions_per_user: default_max_sessions_per_user(),
            enable_auto_cleanup: default_enable_auto_cleanup(),
        }
    }
}

impl fmt::Display for RegistryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RegistryConfig(timeout={}s, cleanup={}s)",
            self.inactive_timeout, self.cleanup_interval
        )
    }
}

/// Reads a JSON document without coercing field types.
///
/// Returns the raw text alongside the parsed config so layered loading can
/// reuse it as a source.
fn read_document(path: &Path) -> Result<(String, RegistryConfig), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let contents = std::fs::read_to_string(path)?;
    let document: serde_json::Value =
        serde_json::from_str(&contents).map_err(ConfigError::Parse)?;
    reject_negative(&document)?;

    let config = serde_json::from_value(document).map_err(ConfigError::Parse)?;
    Ok((contents, config))
}

/// Negative numbers are out of range rather than mistyped.
fn reject_negative(document: &serde_json::Value) -> Result<(), ValidationError> {
    for field in ["inactive_timeout", "cleanup_interval", "max_sessions_per_user"] {
        if document
            .get(field)
            .and_then(serde_json::Value::as_i64)
            .is_some_and(|n| n < 0)
        {
            return Err(ValidationError::NonPositive { field });
        }
    }
    Ok(())
}

fn default_inactive_timeout() -> u64 {
    DEFAULT_INACTIVE_TIMEOUT_SECS
}

fn default_cleanup_interval() -> u64 {
    DEFAULT_CLEANUP_INTERVAL_SECS
}

fn default_max_sessions_per_user() -> usize {
    DEFAULT_MAX_SESSIONS_PER_USER
}

fn default_enable_auto_cleanup() -> bool {
    true
}
