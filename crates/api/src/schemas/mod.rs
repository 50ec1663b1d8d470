//! Request and response schemas for the HTTP surface.
//!
//! Request models reject unknown fields and trim surrounding whitespace from
//! every string field. Response models wrap their payload in an
//! [`Envelope`](crate::response::Envelope) with a resource-specific message.

pub mod content;
pub mod security;

use serde::{Deserialize, Deserializer};

/// Deserialize a string with surrounding whitespace removed.
pub fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|s| s.trim().to_string())
}

/// Optional variant of [`trimmed`]; pair with `#[serde(default)]`.
pub fn trimmed_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(|s| s.map(|s| s.trim().to_string()))
}
