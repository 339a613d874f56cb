//! Session registry service.
//!
//! Owns the session map, enforces the per-user cap, dispatches termination
//! observers and runs the background reaper.
//!
//! ## Components
//!
//! - `SessionRegistry` - Public handle, shared via `Arc`
//! - `RegistryStats` - Point-in-time aggregate
//! - `RegistryError` - Construction and explicit-id failures
//!
//! ## Usage
//!
//! ```ignore
//! let registry = SessionRegistry::new(RegistryConfig::default())?;
//! registry.register_termination_callback(Arc::new(TracingObserver::new()));
//!
//! let session = registry.create_session(&user_id, None);
//! registry.set_session_data(session.id(), "theme", "dark");
//!
//! registry.shutdown().await;
//! ```

mod error;
mod observers;
mod reaper;
mod service;
mod state;
mod stats;

pub use error::RegistryError;
pub use reaper::REAPER_STOP_TIMEOUT;
pub use service::SessionRegistry;
pub use stats::{RegistryStats, INACTIVE_SOON_RATIO};
