//! Sync error handling
//!
//! Typed errors for the run-fatal failures of a sync: a missing roster,
//! an unreachable or malformed snapshot backend, or a missing credential.
//! Per-user fetch failures are not errors; they degrade to absence and are
//! only logged.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a sync run
#[derive(Error, Debug)]
pub enum SyncError {
    /// Roster file does not exist
    #[error("Roster not found at '{path}'")]
    RosterMissing { path: PathBuf },

    /// Roster file exists but is not a valid user list
    #[error("Invalid roster in '{path}': {source}")]
    RosterParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Failed to read or write a local file
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Snapshot backend could not be reached or answered unexpectedly
    #[error("Snapshot backend unavailable: {details}")]
    BackendUnavailable { details: String },

    /// Snapshot backend returned content that is not a snapshot document
    #[error("Malformed snapshot document: {details}")]
    MalformedBackendResponse { details: String },

    /// A required setting is missing for the selected backend
    #[error("'{key}' must be configured for the {backend} backend")]
    NotConfigured {
        key: &'static str,
        backend: &'static str,
    },

    /// A required credential is not set
    #[error("Environment variable {var} is not set")]
    MissingToken { var: &'static str },

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SyncError {
    /// Create an I/O error with path context
    pub fn io(source: io::Error, path: impl Into<PathBuf>) -> Self {
        SyncError::Io {
            path: path.into(),
            source,
        }
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            SyncError::RosterMissing { .. } => {
                Some("Create the roster file (a JSON array of {\"leetcode_username\", \"display_name\"} objects) or point roster_file at it.")
            }
            SyncError::MissingToken { .. } => {
                Some("Export a GitHub token with gist scope, or switch to the local backend.")
            }
            SyncError::MalformedBackendResponse { .. } => {
                Some("The stored snapshot must be a JSON object of date -> {handle -> count}. Fix or reset it.")
            }
            _ => None,
        }
    }
}

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;
