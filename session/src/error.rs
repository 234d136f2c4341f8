//! Error types for configuration, storage, and the auth service client.

use std::path::PathBuf;

/// Startup configuration problems. All of them are fatal.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The base URL variable is unset or blank.
    #[error("{var} is not set; point it at the authentication service")]
    MissingBaseUrl { var: &'static str },

    /// The base URL is not an `http://` or `https://` URL.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Durable token storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O failed at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file exists but is not a JSON object of strings.
    #[error("storage file {} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors produced by calls to the authentication service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The request never produced a response (connect, timeout, TLS).
    #[error("request failed: {0}")]
    Request(String),

    /// The service answered with a non-success status.
    #[error("server returned status {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Status { status: u16, detail: Option<String> },

    /// The response body did not match the expected shape.
    #[error("response parse failed: {0}")]
    Parse(String),
}

impl ApiError {
    /// Message suitable for showing to the user.
    ///
    /// Prefers the service's own `detail` text over the generic rendering.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { detail: Some(detail), .. } => detail.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status, when the service answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failures surfaced by `SessionStore::login` and `SessionStore::register`.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("could not persist token: {0}")]
    Storage(#[from] StorageError),
}

impl SessionError {
    /// Message suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(err) => err.user_message(),
            Self::Storage(_) => self.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
