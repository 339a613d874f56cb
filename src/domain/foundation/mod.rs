//! Foundation module - Shared domain primitives.
//!
//! Contains the identifiers, timestamps and validation errors
//! that form the vocabulary of the session registry.

mod errors;
mod ids;
mod timestamp;

pub use errors::ValidationError;
pub use ids::{SessionId, UserId};
pub use timestamp::Timestamp;
