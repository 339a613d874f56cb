//! Configuration error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading and saving
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Configuration I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration loading failed: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Configuration parsing failed: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Configuration serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Configuration value '{field}' must be greater than zero")]
    NonPositive { field: &'static str },
}
