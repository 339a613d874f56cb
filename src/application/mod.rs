//! Application layer - Services that coordinate domain objects and ports.
//!
//! The registry service owns session state and drives termination observers.

pub mod registry;

pub use registry::{RegistryError, RegistryStats, SessionRegistry};
