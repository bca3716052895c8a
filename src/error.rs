//! Error types for tcad
//!
//! Every failure in a sync run is fatal: the run stops at the first error and
//! reports it to the caller. The variants describe *where* the run stopped so the
//! command-line shell can print a single useful diagnostic line.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for tcad operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for tcad
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "url")
        key: Option<String>,
    },

    /// The artifact manifest could not be retrieved
    #[error("failed to fetch artifact list from {url}: {source}")]
    ManifestFetch {
        /// The manifest URL that was requested
        url: String,
        /// Underlying network or HTTP status failure
        #[source]
        source: std::io::Error,
    },

    /// The artifact manifest is not a well-formed document
    #[error("invalid artifact manifest: {0}")]
    InvalidManifest(String),

    /// Downloading a single artifact failed
    #[error("failed to download {url}: {source}")]
    Transfer {
        /// The artifact URL that was requested
        url: String,
        /// Underlying network or HTTP status failure
        #[source]
        source: std::io::Error,
    },

    /// Creating a directory or writing a local file failed
    #[error("filesystem error at {}: {source}", path.display())]
    Filesystem {
        /// The local path being created or written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A remote artifact path cannot be mapped below the output directory
    #[error("invalid artifact path '{path}': {reason}")]
    InvalidArtifactPath {
        /// The remote artifact path as listed in the manifest
        path: String,
        /// Why the path was rejected
        reason: String,
    },

    /// The HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// I/O error (progress output, console)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a [`Error::Config`] tied to a configuration key
    pub fn config(key: &str, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }

    /// Short machine-readable code for the failing stage, used in log fields
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::ManifestFetch { .. } => "manifest_fetch_failed",
            Error::InvalidManifest(_) => "invalid_manifest",
            Error::Transfer { .. } => "transfer_failed",
            Error::Filesystem { .. } => "filesystem_error",
            Error::InvalidArtifactPath { .. } => "invalid_artifact_path",
            Error::HttpClient(_) => "http_client_error",
            Error::Io(_) => "io_error",
        }
    }

    /// Re-tag a transfer failure as a manifest failure.
    ///
    /// The transfer engine does not know whether it is fetching the manifest or
    /// an artifact; the orchestrator calls this on the manifest path.
    pub(crate) fn into_manifest_fetch(self) -> Self {
        match self {
            Error::Transfer { url, source } => Error::ManifestFetch { url, source },
            other => other,
        }
    }
}
