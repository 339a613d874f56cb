//! Point-in-time registry statistics.

use serde::Serialize;

use crate::config::RegistryConfig;

/// Share of the inactivity timeout after which a session counts as "expiring soon".
pub const INACTIVE_SOON_RATIO: f64 = 0.8;

/// Aggregate view of the registry, computed under the map guard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistryStats {
    pub total_active_sessions: usize,
    pub unique_users: usize,
    /// Sessions idle for more than 80% of the inactivity timeout.
    pub sessions_inactive_soon: usize,
    pub auto_cleanup_running: bool,
    pub config: RegistryConfig,
}
