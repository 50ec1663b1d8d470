//! Domain primitives shared by the persistence and HTTP crates.

pub mod content;
pub mod error;
pub mod types;
