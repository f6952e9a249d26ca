//! Error types for devnet supervision.

use std::path::PathBuf;

/// Errors raised while configuring, starting, or stopping the devnet.
///
/// Every variant except `StopTimeout` and `Io` is a start error: the
/// guarded action does not run.
#[derive(Debug, thiserror::Error)]
pub enum DevnetError {
    /// The devnet URL cannot be used to bind a local process.
    #[error("invalid devnet url '{url}': {reason}")]
    InvalidUrl {
        /// The configured URL.
        url: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The devnet process could not be spawned.
    #[error("failed to start devnet ('{program}'): {source}")]
    Spawn {
        /// The program that was launched.
        program: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Something already answers at the devnet URL.
    #[error("devnet port already in use: {url} is answering before devnet was started")]
    PortOccupied {
        /// The devnet URL.
        url: String,
    },

    /// The devnet process exited before becoming ready.
    #[error("devnet exited during startup ({status})")]
    EarlyExit {
        /// Exit status description.
        status: String,
    },

    /// The devnet did not become ready in time.
    #[error("devnet at {url} not ready after {timeout_ms} ms")]
    StartTimeout {
        /// The devnet URL.
        url: String,
        /// The startup timeout.
        timeout_ms: u128,
    },

    /// The devnet process did not exit after being killed.
    #[error("devnet did not exit within {timeout_ms} ms of being stopped")]
    StopTimeout {
        /// The grace period.
        timeout_ms: u128,
    },

    /// An output sink or process handle operation failed.
    #[error("devnet I/O error at {path}: {source}")]
    Io {
        /// The file or resource involved.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
