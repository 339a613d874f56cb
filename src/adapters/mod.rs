//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the registry to external concerns:
//! - `observers` - Termination observers (in-memory audit, tracing)

pub mod observers;

pub use observers::{RecordingObserver, TracingObserver};
