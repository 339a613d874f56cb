//! Session aggregate entity.
//!
//! A session is one user's bounded-lifetime record: identity, activity
//! timestamps and an opaque key-value payload.
//!
//! # Synchronization
//!
//! `Session` has no interior locking. The registry owns every live
//! session and only mutates it while holding its map guard.

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crate::domain::foundation::{SessionId, Timestamp, UserId};

use super::snapshot::SessionSnapshot;

/// Opaque payload stored in a session.
pub type SessionData = HashMap<String, Value>;

/// A single user session.
///
/// # Invariants
///
/// - `id`, `user_id` and `created_at` never change after construction
/// - `last_activity` never moves backwards
/// - `is_active` goes from `true` to `false` exactly once
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    id: SessionId,
    user_id: UserId,
    created_at: Timestamp,
    last_activity: Timestamp,
    data: SessionData,
    is_active: bool,
    /// Insertion order assigned by the registry, breaks `created_at` ties.
    sequence: u64,
}

impl Session {
    /// Create a new active session.
    ///
    /// A random id is generated unless `session_id` is supplied.
    pub(crate) fn new(
        user_id: UserId,
        session_id: Option<SessionId>,
        data: Option<SessionData>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: session_id.unwrap_or_else(SessionId::generate),
            user_id,
            created_at: now,
            last_activity: now,
            data: data.unwrap_or_default(),
            is_active: true,
            sequence: 0,
        }
    }

    pub(crate) fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the session ID.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Returns the owner's user ID.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns when the session was created.
    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// Returns when the session was last used.
    pub fn last_activity(&self) -> &Timestamp {
        &self.last_activity
    }

    /// Returns the payload without counting as activity.
    pub fn data(&self) -> &SessionData {
        &self.data
    }

    /// Returns whether the session is still live.
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Checks if the given user owns this session.
    pub fn is_owner(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    /// Ordering key for oldest-first eviction.
    pub(crate) fn creation_order(&self) -> (Timestamp, u64) {
        (self.created_at, self.sequence)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Activity
    // ─────────────────────────────────────────────────────────────────────────

    /// Marks the session as used right now.
    pub fn update_activity(&mut self) {
        let now = Timestamp::now();
        if self.last_activity.is_before(&now) {
            self.last_activity = now;
        }
    }

    /// Time since the last recorded activity.
    pub fn inactive_duration(&self) -> Duration {
        self.last_activity.elapsed()
    }

    /// True once the session has been idle strictly longer than `timeout`.
    pub fn is_inactive_for(&self, timeout: Duration) -> bool {
        self.inactive_duration() > timeout
    }

    /// Flips the session to inactive.
    ///
    /// Returns `false` if it was already terminated. Only the registry
    /// terminates sessions, so a live session in its map is always active.
    pub(crate) fn terminate(&mut self) -> bool {
        std::mem::replace(&mut self.is_active, false)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Payload
    // ─────────────────────────────────────────────────────────────────────────

    /// Stores a value under `key`. Counts as activity.
    pub fn set_data(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(key.into(), value.into());
        self.update_activity();
    }

    /// Reads the value under `key`. Counts as activity.
    pub fn get_data(&mut self, key: &str) -> Option<&Value> {
        self.update_activity();
        self.data.get(key)
    }

    /// Reads the value under `key`, falling back to `default`. Counts as activity.
    pub fn get_data_or(&mut self, key: &str, default: Value) -> Value {
        self.get_data(key).cloned().unwrap_or(default)
    }

    /// Produces the serializable view of this session.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id.clone(),
            user_id: self.user_id.clone(),
            created_at: self.created_at,
            last_activity: self.last_activity,
            is_active: self.is_active,
            inactive_seconds: self.inactive_duration().as_secs_f64(),
            data: self.data.clone(),
        }
    }

    #[cfg(test)]
    pub(crate) fn backdate_activity(&mut self, secs: u64) {
        self.last_activity = Timestamp::now().minus_secs(secs);
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Session(id={}, user={}, active={})",
            self.id, self.user_id, self.is_active
        )
    }
}
