//! Observer that logs every termination through `tracing`.

use tracing::info;

use crate::domain::session::Session;
use crate::ports::{ObserverError, TerminationObserver};

/// Emits one `info` event per terminated session.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl TracingObserver {
    pub fn new() -> Self {
        Self
    }
}

impl TerminationObserver for TracingObserver {
    fn on_terminated(&self, session: &Session) -> Result<(), ObserverError> {
        info!(
            session_id = %session.id(),
            user_id = %session.user_id(),
            lifetime_secs = session.created_at().elapsed().as_secs(),
            "Session closed"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "TracingObserver"
    }
}
