//! Session domain module.
//!
//! A `Session` tracks one user's activity and opaque payload. Sessions are
//! created and terminated only by the registry in `application::registry`;
//! callers see owned copies or serializable `SessionSnapshot`s.

mod aggregate;
mod snapshot;

pub use aggregate::{Session, SessionData};
pub use snapshot::SessionSnapshot;
