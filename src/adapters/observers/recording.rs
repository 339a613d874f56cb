//! In-memory audit trail of terminated sessions.
//!
//! Captures a snapshot of every session it is told about, in delivery
//! order. Useful for auditing in small deployments and for assertions
//! in tests.

use parking_lot::RwLock;

use crate::domain::foundation::{SessionId, UserId};
use crate::domain::session::{Session, SessionSnapshot};
use crate::ports::{ObserverError, TerminationObserver};

/// Observer that records the final state of each terminated session.
///
/// # Example
///
/// ```ignore
/// let audit = Arc::new(RecordingObserver::new());
/// registry.register_termination_callback(audit.clone());
///
/// registry.terminate_session(&id);
/// assert!(audit.has_session(&id));
/// ```
#[derive(Debug)]
pub struct RecordingObserver {
    name: String,
    recorded: RwLock<Vec<SessionSnapshot>>,
}

impl RecordingObserver {
    /// Creates an empty recorder named `RecordingObserver`.
    pub fn new() -> Self {
        Self::named("RecordingObserver")
    }

    /// Creates an empty recorder with a custom name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            recorded: RwLock::new(Vec::new()),
        }
    }

    // === Inspection ===

    /// Returns every recorded snapshot in delivery order.
    pub fn recorded(&self) -> Vec<SessionSnapshot> {
        self.recorded.read().clone()
    }

    /// Returns recorded session ids in delivery order.
    pub fn terminated_ids(&self) -> Vec<SessionId> {
        self.recorded
            .read()
            .iter()
            .map(|s| s.session_id.clone())
            .collect()
    }

    /// Returns snapshots belonging to one user.
    pub fn for_user(&self, user_id: &UserId) -> Vec<SessionSnapshot> {
        self.recorded
            .read()
            .iter()
            .filter(|s| &s.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Checks if a specific session was recorded.
    pub fn has_session(&self, session_id: &SessionId) -> bool {
        self.recorded
            .read()
            .iter()
            .any(|s| &s.session_id == session_id)
    }

    /// Number of recorded terminations.
    pub fn count(&self) -> usize {
        self.recorded.read().len()
    }

    /// Drops everything recorded so far.
    pub fn clear(&self) {
        self.recorded.write().clear();
    }
}

impl Default for RecordingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminationObserver for RecordingObserver {
    fn on_terminated(&self, session: &Session) -> Result<(), ObserverError> {
        self.recorded.write().push(session.snapshot());
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terminated_session(user: &str) -> Session {
        let mut session = Session::new(UserId::new(user).unwrap(), None, None);
        session.terminate();
        session
    }

    #[test]
    fn records_in_delivery_order() {
        let observer = RecordingObserver::new();
        let first = terminated_session("u1");
        let second = terminated_session("u2");

        observer.on_terminated(&first).unwrap();
        observer.on_terminated(&second).unwrap();

        assert_eq!(
            observer.terminated_ids(),
            vec![first.id().clone(), second.id().clone()]
        );
        assert_eq!(observer.count(), 2);
    }

    #[test]
    fn recorded_snapshot_is_final_state() {
        let observer = RecordingObserver::new();
        let session = terminated_session("u1");

        observer.on_terminated(&session).unwrap();

        let recorded = observer.recorded();
        assert!(!recorded[0].is_active);
        assert!(observer.has_session(session.id()));
    }

    #[test]
    fn for_user_filters_correctly() {
        let observer = RecordingObserver::new();
        observer.on_terminated(&terminated_session("u1")).unwrap();
        observer.on_terminated(&terminated_session("u2")).unwrap();
        observer.on_terminated(&terminated_session("u1")).unwrap();

        let u1 = UserId::new("u1").unwrap();
        assert_eq!(observer.for_user(&u1).len(), 2);
    }

    #[test]
    fn clear_resets_state() {
        let observer = RecordingObserver::named("audit");
        observer.on_terminated(&terminated_session("u1")).unwrap();

        observer.clear();

        assert_eq!(observer.count(), 0);
        assert_eq!(observer.name(), "audit");
    }
}
