//! Recompilation cache orchestrator.
//!
//! [`RecompilationCache`] ties the persisted [`CacheTable`] to the build
//! pipelines. The table is loaded from disk the first time a decision is
//! needed and written back only on [`RecompilationCache::flush`].

use std::path::{Path, PathBuf};

use cairn_common::{ArtifactSet, ContentHash, Dialect};
use tracing::{debug, warn};

use crate::error::CacheError;
use crate::hasher::{InvocationSignature, SourceHasher};
use crate::table::{CacheEntry, CacheTable, TABLE_FILE};

/// Per-project cache deciding whether a source needs recompiling.
///
/// A source is up to date only if all of the following hold: it has an
/// entry, the entry's invocation signature matches, the source content
/// fingerprint matches, and every recorded artifact still exists.
pub struct RecompilationCache {
    /// Location of the table file.
    file: PathBuf,

    /// Cairn version string for compatibility checks.
    tool_version: String,

    /// In-memory table, `None` until first use.
    table: Option<CacheTable>,
}

impl RecompilationCache {
    /// Creates a cache backed by `<cache_dir>/compile-cache.json`.
    ///
    /// Nothing is read from disk until the cache is first queried.
    pub fn new(cache_dir: &Path, tool_version: &str) -> Self {
        Self {
            file: cache_dir.join(TABLE_FILE),
            tool_version: tool_version.to_string(),
            table: None,
        }
    }

    /// Path of the persisted table.
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Returns `true` once the table has been loaded (or created) in memory.
    pub fn is_loaded(&self) -> bool {
        self.table.is_some()
    }

    /// Decides whether `source` must be compiled with the given signature.
    pub fn should_recompile(&mut self, source: &Path, signature: &InvocationSignature) -> bool {
        let Some(entry) = self.table_mut().entries.get(source) else {
            debug!(source = %source.display(), "no cache entry");
            return true;
        };

        if entry.signature != signature.digest() {
            debug!(source = %source.display(), "compiler invocation changed");
            return true;
        }

        match SourceHasher::hash_file(source) {
            Ok(fingerprint) if fingerprint == entry.fingerprint => {}
            Ok(_) => {
                debug!(source = %source.display(), "source content changed");
                return true;
            }
            Err(e) => {
                debug!(source = %source.display(), error = %e, "cannot fingerprint source");
                return true;
            }
        }

        if !entry.artifacts.all_exist() {
            debug!(source = %source.display(), "artifact missing");
            return true;
        }

        false
    }

    /// Records a successful compilation of `source`.
    ///
    /// `fingerprint` must be taken before the compiler reads the source, so
    /// that an edit made during compilation is seen as a change next time.
    pub fn record_success(
        &mut self,
        source: &Path,
        dialect: Dialect,
        signature: &InvocationSignature,
        fingerprint: ContentHash,
        artifacts: ArtifactSet,
    ) -> Result<(), CacheError> {
        self.table_mut().entries.insert(
            source.to_path_buf(),
            CacheEntry {
                dialect,
                signature: signature.digest(),
                fingerprint,
                artifacts,
            },
        );
        Ok(())
    }

    /// Drops the entry for `source`. Returns `true` if there was one.
    pub fn invalidate(&mut self, source: &Path) -> bool {
        self.table_mut().entries.remove(source).is_some()
    }

    /// Looks up the entry for `source`.
    pub fn entry(&mut self, source: &Path) -> Option<&CacheEntry> {
        self.table_mut().entries.get(source)
    }

    /// Number of entries in the table.
    pub fn len(&mut self) -> usize {
        self.table_mut().entries.len()
    }

    /// Returns `true` if the table has no entries.
    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    /// Writes the table back to disk.
    ///
    /// Does nothing if the table was never loaded.
    pub fn flush(&self) -> Result<(), CacheError> {
        match &self.table {
            Some(table) => {
                debug!(file = %self.file.display(), entries = table.entries.len(), "flushing cache");
                table.save(&self.file)
            }
            None => Ok(()),
        }
    }

    fn table_mut(&mut self) -> &mut CacheTable {
        let file = &self.file;
        let version = &self.tool_version;
        self.table
            .get_or_insert_with(|| load_or_fresh(file, version))
    }
}

fn load_or_fresh(file: &Path, version: &str) -> CacheTable {
    match CacheTable::load(file) {
        Ok(Some(table)) if table.is_compatible(version) => table,
        Ok(Some(table)) => {
            warn!(
                file = %file.display(),
                found = %table.tool_version,
                expected = %version,
                "cache written by a different version, starting fresh"
            );
            CacheTable::new(version)
        }
        Ok(None) => CacheTable::new(version),
        Err(e) => {
            warn!(error = %e, "cache unreadable, starting fresh");
            CacheTable::new(version)
        }
    }
}
