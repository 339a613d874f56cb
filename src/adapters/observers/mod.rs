//! Termination observer adapters.
//!
//! ## Available Adapters
//!
//! - `RecordingObserver` - In-memory audit trail of terminated sessions
//! - `TracingObserver` - Logs each termination through `tracing`

mod recording;
mod tracing_observer;

pub use recording::RecordingObserver;
pub use tracing_observer::TracingObserver;
