//! Ports - Interfaces for external collaborators.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the registry and the outside world. Adapters implement these ports.
//!
//! ## Observer Ports
//!
//! - `TerminationObserver` - Notified whenever a session is removed
//! - `FnObserver` - Closure adapter for ad-hoc observers

mod termination_observer;

pub use termination_observer::{FnObserver, ObserverError, TerminationObserver};
