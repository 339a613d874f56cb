//! Reaper - Background task that removes inactive sessions.
//!
//! ## Schedule
//!
//! The task sleeps for `cleanup_interval`, then runs one sweep
//! (`cleanup_inactive`) on the blocking pool, and repeats.
//!
//! ## Stopping
//!
//! The sleep races a watch-channel stop signal, so stopping does not wait
//! for the rest of the interval. `stop` waits a bounded time for the task
//! to exit and aborts it if it does not.
//!
//! ## Failure handling
//!
//! A sweep that panics surfaces as a `JoinError`; it is logged and the
//! task keeps its schedule.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::{self, JoinHandle};
use tokio::time;
use tracing::{debug, error, warn};

use super::error::RegistryError;
use super::state::RegistryState;

/// How long `stop` waits for the task to acknowledge the stop signal.
pub const REAPER_STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to a running reaper task.
pub(crate) struct ReaperHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ReaperHandle {
    /// Spawns the reaper on the current Tokio runtime.
    ///
    /// # Errors
    ///
    /// - `NoRuntime` if called outside a Tokio runtime
    pub(crate) fn spawn(state: Arc<RegistryState>) -> Result<Self, RegistryError> {
        let runtime = Handle::try_current().map_err(|_| RegistryError::NoRuntime)?;
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = runtime.spawn(run(state, stop_rx));
        Ok(Self { stop_tx, task })
    }

    pub(crate) fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Signals the task and waits up to `timeout` for it to exit.
    ///
    /// Returns `false` if the task had to be aborted.
    pub(crate) async fn stop(self, timeout: Duration) -> bool {
        let Self { stop_tx, mut task } = self;
        // Send fails only if the task already exited
        let _ = stop_tx.send(true);

        match time::timeout(timeout, &mut task).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                error!(error = %e, "Reaper task ended abnormally");
                true
            }
            Err(_) => {
                warn!(timeout_ms = timeout.as_millis() as u64, "Reaper did not stop in time, aborting");
                task.abort();
                false
            }
        }
    }

    /// Signals and aborts without waiting. Used where awaiting is impossible.
    pub(crate) fn halt(self) {
        let _ = self.stop_tx.send(true);
        self.task.abort();
    }
}

async fn run(state: Arc<RegistryState>, mut stop: watch::Receiver<bool>) {
    let interval = state.config().cleanup_interval();

    loop {
        tokio::select! {
            changed = stop.changed() => {
                // A dropped sender also means stop
                if changed.is_err() || *stop.borrow() {
                    break;
                }
            }

            _ = time::sleep(interval) => {
                let sweep_state = Arc::clone(&state);
                match task::spawn_blocking(move || sweep_state.cleanup_inactive()).await {
                    Ok(count) => debug!(count, "Reaper sweep finished"),
                    Err(e) => error!(error = %e, "Reaper sweep failed"),
                }
            }
        }
    }

    debug!("Reaper loop exited");
}
