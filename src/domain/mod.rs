//! Domain layer containing session types and shared primitives.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, validation errors)
//! - `session` - Session aggregate and its serializable snapshot

pub mod foundation;
pub mod session;
