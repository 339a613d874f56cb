//! SessionRegistry - Public handle over the shared session map.

use parking_lot::Mutex;
use serde_json::Value;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::RegistryConfig;
use crate::domain::foundation::{SessionId, UserId};
use crate::domain::session::{Session, SessionData};
use crate::ports::{FnObserver, ObserverError, TerminationObserver};

use super::error::RegistryError;
use super::reaper::{ReaperHandle, REAPER_STOP_TIMEOUT};
use super::state::RegistryState;
use super::stats::RegistryStats;

/// In-memory registry of user sessions with automatic expiry.
///
/// The registry is the only owner of live sessions. Lookups return owned
/// copies; mutations go through registry methods or [`with_session`].
///
/// Share it with `Arc`. Dropping the last handle stops the reaper and
/// terminates every remaining session, so cleanup happens even on early
/// exit. Prefer [`shutdown`] where an `.await` is possible, since it waits
/// for the reaper to finish its current sweep.
///
/// # Example
///
/// ```no_run
/// use session_registry::{RegistryConfig, SessionRegistry, UserId};
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = SessionRegistry::new(RegistryConfig::default())?;
/// let user = UserId::new("alice")?;
///
/// let session = registry.create_session(&user, None);
/// assert!(registry.get_session(session.id()).is_some());
///
/// registry.shutdown().await;
/// # Ok(())
/// # }
/// ```
///
/// [`with_session`]: SessionRegistry::with_session
/// [`shutdown`]: SessionRegistry::shutdown
pub struct SessionRegistry {
    state: Arc<RegistryState>,
    reaper: Mutex<Option<ReaperHandle>>,
    shut_down: AtomicBool,
}

impl SessionRegistry {
    /// Create a registry, starting the reaper if auto-cleanup is enabled.
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` if a timeout, interval or cap is zero
    /// - `NoRuntime` if auto-cleanup is enabled outside a Tokio runtime
    pub fn new(config: RegistryConfig) -> Result<Self, RegistryError> {
        config.validate()?;
        info!(config = %config, "Session registry initialised");

        let auto_cleanup = config.enable_auto_cleanup;
        let registry = Self {
            state: Arc::new(RegistryState::new(config)),
            reaper: Mutex::new(None),
            shut_down: AtomicBool::new(false),
        };

        if auto_cleanup {
            registry.start_auto_cleanup()?;
        }
        Ok(registry)
    }

    /// Create a registry with default configuration.
    pub fn with_defaults() -> Result<Self, RegistryError> {
        Self::new(RegistryConfig::default())
    }

    /// Open a registry, run `body` with it, then shut it down.
    ///
    /// If `body` panics, the registry is still torn down when its last
    /// handle drops.
    pub async fn scope<F, Fut, T>(config: RegistryConfig, body: F) -> Result<T, RegistryError>
    where
        F: FnOnce(Arc<SessionRegistry>) -> Fut,
        Fut: Future<Output = T>,
    {
        let registry = Arc::new(Self::new(config)?);
        let output = body(Arc::clone(&registry)).await;
        registry.shutdown().await;
        Ok(output)
    }

    pub fn config(&self) -> &RegistryConfig {
        self.state.config()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Creation
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a session for `user_id`.
    ///
    /// If the user already holds `max_sessions_per_user` sessions, the one
    /// created earliest is terminated first. Its observers run before the
    /// new session becomes visible.
    pub fn create_session(&self, user_id: &UserId, data: Option<SessionData>) -> Session {
        loop {
            match self.state.create(user_id, None, data.clone()) {
                Ok(session) => return session,
                // Only possible on a random id collision
                Err(e) => warn!(error = %e, "Generated session id collided, retrying"),
            }
        }
    }

    /// Create a session with a caller-chosen id.
    ///
    /// # Errors
    ///
    /// - `DuplicateSessionId` if a live session already uses `session_id`
    pub fn create_session_with_id(
        &self,
        session_id: SessionId,
        user_id: &UserId,
        data: Option<SessionData>,
    ) -> Result<Session, RegistryError> {
        self.state.create(user_id, Some(session_id), data)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lookup
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns a copy of the session if it is live.
    ///
    /// Unknown and already-terminated ids both return `None`.
    pub fn get_session(&self, session_id: &SessionId) -> Option<Session> {
        self.state.get(session_id)
    }

    /// Returns copies of every live session owned by `user_id`, in no particular order.
    pub fn get_user_sessions(&self, user_id: &UserId) -> Vec<Session> {
        self.state.user_sessions(user_id)
    }

    /// Returns copies of every live session.
    pub fn get_all_sessions(&self) -> Vec<Session> {
        self.state.all_sessions()
    }

    /// Number of live sessions.
    pub fn active_count(&self) -> usize {
        self.get_stats().total_active_sessions
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Activity and payload
    // ─────────────────────────────────────────────────────────────────────────

    /// Refreshes `last_activity`. Returns `false` if the session is not live.
    pub fn update_session_activity(&self, session_id: &SessionId) -> bool {
        self.state.touch(session_id)
    }

    /// Stores `value` under `key`. Counts as activity.
    pub fn set_session_data(
        &self,
        session_id: &SessionId,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> bool {
        self.state.set_data(session_id, key.into(), value.into())
    }

    /// Reads the value under `key`. Counts as activity.
    pub fn get_session_data(&self, session_id: &SessionId, key: &str) -> Option<Value> {
        self.state.get_data(session_id, key)
    }

    /// Runs `f` with exclusive access to a live session.
    ///
    /// The registry guard is held while `f` runs, so `f` must not call
    /// back into the registry.
    pub fn with_session<R>(
        &self,
        session_id: &SessionId,
        f: impl FnOnce(&mut Session) -> R,
    ) -> Option<R> {
        self.state.with_session(session_id, f)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Termination
    // ─────────────────────────────────────────────────────────────────────────

    /// Terminates one session and notifies every observer in registration order.
    ///
    /// Returns `false` if no live session has this id.
    pub fn terminate_session(&self, session_id: &SessionId) -> bool {
        self.state.terminate(session_id)
    }

    /// Terminates every live session owned by `user_id`.
    ///
    /// Sessions are terminated one at a time, so a session created
    /// concurrently for the same user may survive.
    pub fn terminate_user_sessions(&self, user_id: &UserId) -> usize {
        self.state.terminate_user(user_id)
    }

    /// Terminates every session idle for longer than `inactive_timeout`.
    pub fn cleanup_inactive_sessions(&self) -> usize {
        self.state.cleanup_inactive()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Observers
    // ─────────────────────────────────────────────────────────────────────────

    /// Appends an observer notified after every termination.
    ///
    /// Observers may call back into the registry, except when notified of
    /// a cap eviction: that notification runs under the registry guard.
    pub fn register_termination_callback(&self, observer: Arc<dyn TerminationObserver>) {
        self.state.observers().register(observer);
    }

    /// Appends a closure observer.
    pub fn on_termination<F>(&self, name: impl Into<String>, callback: F)
    where
        F: Fn(&Session) -> Result<(), ObserverError> + Send + Sync + 'static,
    {
        self.register_termination_callback(Arc::new(FnObserver::new(name, callback)));
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.state.observers().len()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reaper lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Starts the background reaper. A no-op if it is already running.
    ///
    /// # Errors
    ///
    /// - `NoRuntime` if called outside a Tokio runtime
    pub fn start_auto_cleanup(&self) -> Result<(), RegistryError> {
        let mut reaper = self.reaper.lock();
        if reaper.as_ref().is_some_and(ReaperHandle::is_running) {
            warn!("Automatic cleanup is already running");
            return Ok(());
        }

        *reaper = Some(ReaperHandle::spawn(Arc::clone(&self.state))?);
        info!(
            interval_secs = self.config().cleanup_interval,
            timeout_secs = self.config().inactive_timeout,
            "Automatic cleanup started"
        );
        Ok(())
    }

    /// Stops the background reaper, waiting a bounded time for it to exit.
    pub async fn stop_auto_cleanup(&self) {
        let handle = self.reaper.lock().take();
        if let Some(handle) = handle {
            handle.stop(REAPER_STOP_TIMEOUT).await;
            info!("Automatic cleanup stopped");
        }
    }

    /// Whether the reaper task is alive.
    pub fn is_auto_cleanup_running(&self) -> bool {
        self.reaper.lock().as_ref().is_some_and(ReaperHandle::is_running)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Stats and shutdown
    // ─────────────────────────────────────────────────────────────────────────

    pub fn get_stats(&self) -> RegistryStats {
        let running = self.is_auto_cleanup_running();
        self.state.stats(running)
    }

    /// Stops the reaper, then terminates every remaining session.
    ///
    /// Idempotent: later calls do nothing and return 0. Returns the number
    /// of sessions terminated.
    pub async fn shutdown(&self) -> usize {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            debug!("Session registry already shut down");
            return 0;
        }

        info!("Shutting down session registry");
        self.stop_auto_cleanup().await;
        let count = self.state.terminate_all();
        info!(count, "Session registry shut down");
        count
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }
}

impl Drop for SessionRegistry {
    fn drop(&mut self) {
        if let Some(handle) = self.reaper.get_mut().take() {
            handle.halt();
        }

        let count = self.state.terminate_all();
        if count > 0 {
            info!(count, "Terminated remaining sessions on drop");
        }
    }
}
