//! Persisted cache table.
//!
//! The table is stored as `compile-cache.json` in the cache directory. It
//! records, per source file, the invocation signature and content
//! fingerprint of the last successful compilation and the artifacts it
//! produced. Entries are kept in a `BTreeMap` so that loading a table and
//! saving it again reproduces the file byte for byte.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use cairn_common::{ArtifactSet, ContentHash, Dialect};
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// Name of the table file within the cache directory.
pub const TABLE_FILE: &str = "compile-cache.json";

/// Top-level persisted cache state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheTable {
    /// Cairn version that wrote this table. Invalidate on version change.
    pub tool_version: String,

    /// Per-source-file state, keyed by source path.
    pub entries: BTreeMap<PathBuf, CacheEntry>,
}

/// State of one source file after its last successful compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Pipeline that compiled the file.
    pub dialect: Dialect,

    /// Signature of the compiler invocation(s) used.
    pub signature: ContentHash,

    /// Content fingerprint of the source at compile time.
    pub fingerprint: ContentHash,

    /// Output files written by the compilation.
    pub artifacts: ArtifactSet,
}

impl CacheTable {
    /// Creates a new, empty table for the given Cairn version.
    pub fn new(tool_version: &str) -> Self {
        Self {
            tool_version: tool_version.to_string(),
            entries: BTreeMap::new(),
        }
    }

    /// Loads a table from `path`.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>, CacheError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CacheError::Io {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| CacheError::TableParse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    /// Saves the table to `path`, creating parent directories as needed.
    ///
    /// The table is written to a sibling temporary file first and then
    /// renamed over `path`, so readers never see a half-written table.
    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CacheError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let mut json =
            serde_json::to_string_pretty(self).map_err(|e| CacheError::Serialization {
                reason: e.to_string(),
            })?;
        json.push('\n');

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| CacheError::Io {
            path: tmp.clone(),
            source: e,
        })?;
        std::fs::rename(&tmp, path).map_err(|e| CacheError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Returns `true` if this table was produced by a compatible Cairn version.
    pub fn is_compatible(&self, current_version: &str) -> bool {
        self.tool_version == current_version
    }
}
