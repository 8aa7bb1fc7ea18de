//! Typed error hierarchy for socialsync.
//!
//! Two enums cover the two places errors originate:
//! - `RemoteError`: a call to the social API failed
//! - `ConfigError`: the configuration file could not be loaded
//!
//! Controllers never propagate `RemoteError`; they convert it into a notice or
//! a log line. The CLI wraps everything else in `anyhow`.

use thiserror::Error;

/// Errors from a remote social API call.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}: {message}")]
    Status {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("Failed to decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("Remote unavailable: {0}")]
    Unavailable(String),
}

impl RemoteError {
    /// True when the server answered but refused the request.
    pub fn is_rejection(&self) -> bool {
        matches!(self, RemoteError::Status { status, .. } if (400..500).contains(status))
    }
}

/// Errors loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: std::path::PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid base URL '{0}': must start with http:// or https://")]
    InvalidBaseUrl(String),
}
