//! Termination observer port.
//!
//! Observers are notified synchronously each time the registry removes a
//! session, whatever the trigger: explicit termination, per-user bulk
//! termination, cap eviction, reaper sweep or shutdown.

use thiserror::Error;

use crate::domain::session::Session;

/// Failure reported by an observer.
///
/// The registry logs it and carries on; it never reaches the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ObserverError(String);

impl ObserverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Observer invoked after a session has been terminated.
///
/// Implementations must be quick and must not call back into the
/// registry: evictions are dispatched while the registry's map guard is
/// held, and the guard is not reentrant.
///
/// # Example
///
/// ```ignore
/// struct AuditTrail;
///
/// impl TerminationObserver for AuditTrail {
///     fn on_terminated(&self, session: &Session) -> Result<(), ObserverError> {
///         println!("closed {}", session.id());
///         Ok(())
///     }
///
///     fn name(&self) -> &str {
///         "AuditTrail"
///     }
/// }
/// ```
pub trait TerminationObserver: Send + Sync {
    /// Receives the session in its final state (`is_active() == false`).
    fn on_terminated(&self, session: &Session) -> Result<(), ObserverError>;

    /// Observer name for logging.
    fn name(&self) -> &str;
}

/// Adapts a closure into a [`TerminationObserver`].
pub struct FnObserver<F> {
    name: String,
    callback: F,
}

impl<F> FnObserver<F>
where
    F: Fn(&Session) -> Result<(), ObserverError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, callback: F) -> Self {
        Self {
            name: name.into(),
            callback,
        }
    }
}

impl<F> TerminationObserver for FnObserver<F>
where
    F: Fn(&Session) -> Result<(), ObserverError> + Send + Sync,
{
    fn on_terminated(&self, session: &Session) -> Result<(), ObserverError> {
        (self.callback)(session)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
