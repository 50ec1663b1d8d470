use std::str::FromStr;

use crate::auth::jwt::JwtConfig;
use crate::middleware::envelope::{ExcludedPaths, DEFAULT_EXCLUDED_PATHS};

/// Failure to build configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in the environment")]
    Missing(&'static str),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{var} has an invalid value '{value}'")]
    Invalid { var: &'static str, value: String },
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// Per-request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Path prefixes served without envelope normalization.
    pub excluded_paths: ExcludedPaths,
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                          |
    /// |---------------------------|----------------------------------|
    /// | `HOST`                    | `0.0.0.0`                        |
    /// | `PORT`                    | `8000`                           |
    /// | `CORS_ORIGINS`            | `http://localhost:3000`          |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                             |
    /// | `ENVELOPE_EXCLUDED_PATHS` | `/docs,/redoc,/openapi.json`     |
    ///
    /// JWT settings are read by [`JwtConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env_or("HOST", "0.0.0.0");
        let port = parse_env("PORT", 8000u16)?;
        let cors_origins = split_list(&env_or("CORS_ORIGINS", "http://localhost:3000"));
        let request_timeout_secs = parse_env("REQUEST_TIMEOUT_SECS", 30u64)?;

        let excluded_paths = match std::env::var("ENVELOPE_EXCLUDED_PATHS") {
            Ok(raw) => ExcludedPaths::new(split_list(&raw)),
            Err(_) => ExcludedPaths::new(DEFAULT_EXCLUDED_PATHS),
        };

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            excluded_paths,
            jwt: JwtConfig::from_env()?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ---------------------------------------------------------------------------
// Env helpers
// ---------------------------------------------------------------------------

pub(crate) fn env_or(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.to_string())
}

/// Parse `var` if set, otherwise return `default`.
pub(crate) fn parse_env<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
pub(crate) fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
