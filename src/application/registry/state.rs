//! Session map and the operations that run under its guard.
//!
//! `RegistryState` is shared between the public `SessionRegistry` handle and
//! the reaper task. Every read or write of the map goes through one
//! `parking_lot::Mutex`.
//!
//! # Lock discipline
//!
//! - Cap eviction dispatches observers while the guard is held, so the
//!   evicted session's observers finish before the new session is visible.
//! - Every other termination removes the session under the guard and
//!   dispatches observers after releasing it.
//! - Cleanup collects expired ids under the guard, releases it, then
//!   terminates each id separately.

use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

use crate::config::RegistryConfig;
use crate::domain::foundation::{SessionId, UserId};
use crate::domain::session::{Session, SessionData};

use super::error::RegistryError;
use super::observers::ObserverSet;
use super::stats::{RegistryStats, INACTIVE_SOON_RATIO};

#[derive(Default)]
struct SessionMap {
    sessions: HashMap<SessionId, Session>,
    next_sequence: u64,
}

impl SessionMap {
    fn user_sessions<'a>(&'a self, user_id: &'a UserId) -> impl Iterator<Item = &'a Session> + 'a {
        self.sessions
            .values()
            .filter(move |s| s.is_owner(user_id) && s.is_active())
    }

    fn oldest_for(&self, user_id: &UserId) -> Option<SessionId> {
        self.user_sessions(user_id)
            .min_by_key(|s| s.creation_order())
            .map(|s| s.id().clone())
    }
}

pub(crate) struct RegistryState {
    config: RegistryConfig,
    sessions: Mutex<SessionMap>,
    observers: ObserverSet,
}

impl RegistryState {
    pub(crate) fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            sessions: Mutex::new(SessionMap::default()),
            observers: ObserverSet::new(),
        }
    }

    pub(crate) fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub(crate) fn observers(&self) -> &ObserverSet {
        &self.observers
    }

    /// Creates a session for `user_id` with an optional caller-chosen id.
    pub(crate) fn create(
        &self,
        user_id: &UserId,
        session_id: Option<SessionId>,
        data: Option<SessionData>,
    ) -> Result<Session, RegistryError> {
        self.insert(Session::new(user_id.clone(), session_id, data))
    }

    /// Inserts `session`, evicting the user's oldest sessions first if the
    /// cap would otherwise be exceeded.
    fn insert(&self, session: Session) -> Result<Session, RegistryError> {
        let mut map = self.sessions.lock();

        if map.sessions.contains_key(session.id()) {
            return Err(RegistryError::DuplicateSessionId(session.id().clone()));
        }

        let user_id = session.user_id().clone();
        let max = self.config.max_sessions_per_user;
        while map.user_sessions(&user_id).count() >= max {
            warn!(user_id = %user_id, max, "User reached session limit, evicting oldest session");
            let Some(oldest) = map.oldest_for(&user_id) else {
                break;
            };
            if let Some(mut evicted) = map.sessions.remove(&oldest) {
                evicted.terminate();
                info!(session_id = %evicted.id(), user_id = %user_id, "Session terminated");
                self.observers.notify(&evicted);
            }
        }

        let sequence = map.next_sequence;
        map.next_sequence += 1;
        let session = session.with_sequence(sequence);
        map.sessions.insert(session.id().clone(), session.clone());

        info!(session_id = %session.id(), user_id = %user_id, "Session created");
        Ok(session)
    }

    pub(crate) fn get(&self, session_id: &SessionId) -> Option<Session> {
        self.sessions
            .lock()
            .sessions
            .get(session_id)
            .filter(|s| s.is_active())
            .cloned()
    }

    pub(crate) fn user_sessions(&self, user_id: &UserId) -> Vec<Session> {
        self.sessions.lock().user_sessions(user_id).cloned().collect()
    }

    pub(crate) fn all_sessions(&self) -> Vec<Session> {
        self.sessions
            .lock()
            .sessions
            .values()
            .filter(|s| s.is_active())
            .cloned()
            .collect()
    }

    /// Runs `f` against a live session while holding the guard.
    pub(crate) fn with_session<R>(
        &self,
        session_id: &SessionId,
        f: impl FnOnce(&mut Session) -> R,
    ) -> Option<R> {
        let mut map = self.sessions.lock();
        map.sessions
            .get_mut(session_id)
            .filter(|s| s.is_active())
            .map(f)
    }

    pub(crate) fn touch(&self, session_id: &SessionId) -> bool {
        let touched = self.with_session(session_id, Session::update_activity).is_some();
        if touched {
            debug!(session_id = %session_id, "Session activity updated");
        }
        touched
    }

    pub(crate) fn set_data(&self, session_id: &SessionId, key: String, value: Value) -> bool {
        self.with_session(session_id, |s| s.set_data(key, value)).is_some()
    }

    pub(crate) fn get_data(&self, session_id: &SessionId, key: &str) -> Option<Value> {
        self.with_session(session_id, |s| s.get_data(key).cloned())
            .flatten()
    }

    /// Removes one session and notifies observers after releasing the guard.
    pub(crate) fn terminate(&self, session_id: &SessionId) -> bool {
        let removed = {
            let mut map = self.sessions.lock();
            map.sessions.remove(session_id).map(|mut session| {
                session.terminate();
                session
            })
        };

        match removed {
            Some(session) => {
                info!(session_id = %session.id(), user_id = %session.user_id(), "Session terminated");
                self.observers.notify(&session);
                true
            }
            None => false,
        }
    }

    pub(crate) fn terminate_user(&self, user_id: &UserId) -> usize {
        let ids: Vec<SessionId> = self
            .user_sessions(user_id)
            .into_iter()
            .map(|s| s.id().clone())
            .collect();

        let count = ids.iter().filter(|id| self.terminate(id)).count();
        info!(user_id = %user_id, count, "Terminated user sessions");
        count
    }

    /// Terminates every session idle longer than the configured timeout.
    pub(crate) fn cleanup_inactive(&self) -> usize {
        let timeout = self.config.inactive_timeout();
        let expired: Vec<SessionId> = {
            let map = self.sessions.lock();
            map.sessions
                .values()
                .filter(|s| s.is_inactive_for(timeout))
                .map(|s| s.id().clone())
                .collect()
        };

        let count = expired.iter().filter(|id| self.terminate(id)).count();
        if count > 0 {
            info!(count, "Inactive sessions cleaned up");
        }
        count
    }

    pub(crate) fn terminate_all(&self) -> usize {
        let ids: Vec<SessionId> = self.sessions.lock().sessions.keys().cloned().collect();
        ids.iter().filter(|id| self.terminate(id)).count()
    }

    pub(crate) fn stats(&self, auto_cleanup_running: bool) -> RegistryStats {
        let soon = self.config.inactive_timeout().mul_f64(INACTIVE_SOON_RATIO);
        let map = self.sessions.lock();

        let users: HashSet<&UserId> = map.sessions.values().map(|s| s.user_id()).collect();
        let inactive_soon = map
            .sessions
            .values()
            .filter(|s| s.inactive_duration() > soon)
            .count();

        RegistryStats {
            total_active_sessions: map.sessions.len(),
            unique_users: users.len(),
            sessions_inactive_soon: inactive_soon,
            auto_cleanup_running,
            config: self.config.clone(),
        }
    }

    #[cfg(test)]
    pub(crate) fn backdate(&self, session_id: &SessionId, secs: u64) {
        if let Some(session) = self.sessions.lock().sessions.get_mut(session_id) {
            session.backdate_activity(secs);
        }
    }
}
