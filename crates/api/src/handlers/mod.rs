//! HTTP handlers, grouped by resource.
//!
//! Handlers return either an [`Envelope`](crate::response::Envelope) or a
//! bare serializable value; the envelope layer wraps the latter. None of
//! them set a transport status.

pub mod auth;
pub mod content;
pub mod profile;
pub mod user;
