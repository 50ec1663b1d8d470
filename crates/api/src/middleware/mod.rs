//! Request-path middleware and auth extractors.
//!
//! - [`envelope`] -- response normalization layer.
//! - [`auth`] -- bearer token extractor.
//! - [`rbac`] -- superuser gate built on [`auth::AuthUser`].

pub mod auth;
pub mod envelope;
pub mod rbac;
