//! Error types for cache operations.

use std::path::PathBuf;

/// Errors that can occur during cache operations.
///
/// Reads are fail-safe: an unreadable table results in a fresh cache rather
/// than a hard failure. Writes (flushes) and fingerprinting report errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while reading or writing cache files.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The persisted cache table could not be parsed as valid JSON.
    #[error("failed to parse cache table {path}: {reason}")]
    TableParse {
        /// The table file.
        path: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// A serialization error occurred while writing the table.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },
}
