//! Registry error types.

use thiserror::Error;

use crate::config::ValidationError;
use crate::domain::foundation::SessionId;

/// Hard failures surfaced by the registry.
///
/// Only construction and explicit-id creation can fail. Missing sessions,
/// observer failures and reaper sweep failures are absorbed and logged.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Invalid registry configuration: {0}")]
    InvalidConfig(#[from] ValidationError),

    #[error("Session id already in use: {0}")]
    DuplicateSessionId(SessionId),

    #[error("Automatic cleanup requires a running Tokio runtime")]
    NoRuntime,
}
