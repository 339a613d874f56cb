//! Serializable point-in-time view of a session.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{SessionId, Timestamp, UserId};

use super::aggregate::SessionData;

/// Flat record handed to callers and observers.
///
/// Timestamps serialize as RFC 3339 strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub created_at: Timestamp,
    pub last_activity: Timestamp,
    pub is_active: bool,
    /// Seconds since `last_activity` at the moment the snapshot was taken.
    pub inactive_seconds: f64,
    pub data: SessionData,
}
