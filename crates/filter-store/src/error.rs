//! Error types for session persistence.
//!
//! Store operations themselves never fail; only reading and writing a
//! session file can.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    /// I/O error while reading or writing the session file
    #[error("I/O error on session file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Session file does not hold a JSON array of filters
    #[error("Malformed session file {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, SessionError>;
