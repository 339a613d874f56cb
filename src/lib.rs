//! Session Registry - In-memory user session tracking with automatic expiry
//!
//! This crate keeps live user sessions in a shared map, caps how many each
//! user may hold, expires idle sessions from a background task and notifies
//! registered observers whenever a session ends.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use application::registry::{RegistryError, RegistryStats, SessionRegistry};
pub use config::RegistryConfig;
pub use domain::foundation::{SessionId, UserId};
pub use domain::session::{Session, SessionData, SessionSnapshot};
pub use ports::{ObserverError, TerminationObserver};
