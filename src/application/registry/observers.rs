//! Ordered set of termination observers with failure containment.

use parking_lot::RwLock;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error};

use crate::domain::session::Session;
use crate::ports::TerminationObserver;

/// Observers in registration order.
#[derive(Default)]
pub(crate) struct ObserverSet {
    observers: RwLock<Vec<Arc<dyn TerminationObserver>>>,
}

impl ObserverSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&self, observer: Arc<dyn TerminationObserver>) {
        debug!(observer = observer.name(), "Termination observer registered");
        self.observers.write().push(observer);
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.read().len()
    }

    /// Invokes every observer in registration order.
    ///
    /// An observer that returns an error or panics is logged and skipped;
    /// the remaining observers still run. Returns the number of observers
    /// that failed.
    pub(crate) fn notify(&self, session: &Session) -> usize {
        // Clone the list so the lock is not held across observer calls
        let observers: Vec<Arc<dyn TerminationObserver>> = self.observers.read().clone();

        let mut failures = 0;
        for observer in observers {
            match catch_unwind(AssertUnwindSafe(|| observer.on_terminated(session))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    failures += 1;
                    error!(
                        observer = observer.name(),
                        session_id = %session.id(),
                        error = %e,
                        "Termination observer failed"
                    );
                }
                Err(payload) => {
                    failures += 1;
                    error!(
                        observer = observer.name(),
                        session_id = %session.id(),
                        panic = panic_message(payload.as_ref()),
                        "Termination observer panicked"
                    );
                }
            }
        }
        failures
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
