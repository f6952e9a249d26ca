//! Error types for discovery, compilation, and artifact normalization.

use std::path::PathBuf;

use cairn_cache::CacheError;

/// Errors produced while building a project.
///
/// Per-unit variants (`ManifestValidation`, `Compilation`,
/// `BuildReportMissing`) are collected into a
/// [`BuildSummary`](crate::BuildSummary) and only cross the batch boundary
/// as a single [`CompileError::BatchFailed`].
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// A sources root or an expected input file does not exist.
    #[error("path not found: {path}")]
    NotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// A glob pattern could not be compiled.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Description of the problem.
        reason: String,
    },

    /// A `Scarb.toml` could not be parsed.
    #[error("failed to parse {manifest}: {reason}")]
    ManifestParse {
        /// The manifest file.
        manifest: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// A `Scarb.toml` does not have the required contract target shape.
    #[error("invalid manifest {manifest}: {reason}")]
    ManifestValidation {
        /// The manifest file.
        manifest: PathBuf,
        /// Description of the violated constraint.
        reason: String,
    },

    /// An external compiler or build tool reported failure.
    #[error("failed to compile {unit}: {message}")]
    Compilation {
        /// Source file or manifest that failed.
        unit: PathBuf,
        /// Exit status and rewritten compiler output.
        message: String,
    },

    /// An external program could not be started at all.
    #[error("failed to run '{program}': {source}")]
    Launch {
        /// The program that could not be started.
        program: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Scarb succeeded but did not emit its build report.
    #[error("build report not found, expected {path}")]
    BuildReportMissing {
        /// Where the report was expected.
        path: PathBuf,
    },

    /// No `Scarb.toml` was found under any requested sources path.
    #[error("no Scarb projects found under {paths}")]
    NoProjectsFound {
        /// The searched paths, comma-separated.
        paths: String,
    },

    /// A filesystem operation on an artifact or input failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A JSON input (Sierra class, build report) was malformed.
    #[error("invalid JSON in {path}: {reason}")]
    Json {
        /// The offending file.
        path: PathBuf,
        /// Description of the problem.
        reason: String,
    },

    /// The recompilation cache could not be updated or persisted.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// One or more units in a batch failed.
    #[error("{count} file(s) failed to compile")]
    BatchFailed {
        /// Number of failed units.
        count: usize,
    },
}

impl CompileError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CompileError::Io {
            path: path.into(),
            source,
        }
    }
}
