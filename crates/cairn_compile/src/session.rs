//! Build session: one build invocation over one or more sources paths.
//!
//! The session owns the recompilation cache for the whole invocation.
//! Units under one sources path are processed sequentially; a unit's
//! failure is recorded and the batch continues. The cache is flushed once
//! after each sources path, and the per-unit failures only turn into an
//! error at the very end, through [`BuildSummary::check`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use cairn_cache::{RecompilationCache, SourceHasher};
use cairn_common::{ArtifactSet, Dialect};
use cairn_config::ProjectConfig;
use tracing::{debug, info};

use crate::error::CompileError;
use crate::invoker::{CompilerInvoker, OutputRewriter};
use crate::layout::ArtifactPathMapper;
use crate::options::CompileOptions;
use crate::pipeline::{scarb, CompileUnit};
use crate::traverse::traverse;

/// Result of processing one unit (source file or Scarb manifest).
#[derive(Debug)]
pub enum UnitOutcome {
    /// The cache reported the unit's artifacts as current.
    UpToDate,
    /// The unit was compiled; one artifact set per contract produced.
    Compiled(Vec<ArtifactSet>),
    /// The unit failed; siblings are unaffected.
    Failed(CompileError),
}

/// Aggregated outcome of a build.
#[derive(Debug, Default)]
pub struct BuildSummary {
    /// Units compiled.
    pub compiled: usize,
    /// Units skipped as up to date.
    pub up_to_date: usize,
    /// Failed units with their errors.
    pub failures: Vec<(PathBuf, CompileError)>,
}

impl BuildSummary {
    /// Adds one unit's outcome.
    pub fn record(&mut self, unit: &Path, outcome: UnitOutcome) {
        match outcome {
            UnitOutcome::UpToDate => self.up_to_date += 1,
            UnitOutcome::Compiled(_) => self.compiled += 1,
            UnitOutcome::Failed(e) => self.failures.push((unit.to_path_buf(), e)),
        }
    }

    /// Folds another summary into this one.
    pub fn merge(&mut self, other: BuildSummary) {
        self.compiled += other.compiled;
        self.up_to_date += other.up_to_date;
        self.failures.extend(other.failures);
    }

    /// Number of failed units.
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Converts any failures into a single [`CompileError::BatchFailed`].
    pub fn check(&self) -> Result<(), CompileError> {
        match self.failed() {
            0 => Ok(()),
            count => Err(CompileError::BatchFailed { count }),
        }
    }
}

/// Units discovered under one sources path.
#[derive(Debug, Clone)]
pub struct SourceBatch {
    /// The sources path, resolved against the project root.
    pub root: PathBuf,
    /// Source files or manifests found under it.
    pub units: Vec<PathBuf>,
}

/// State of one build invocation.
pub struct BuildSession {
    project_root: PathBuf,
    mapper: ArtifactPathMapper,
    rewriter: OutputRewriter,
    options: CompileOptions,
    cache: RecompilationCache,
    invoker: Arc<dyn CompilerInvoker>,
}

impl BuildSession {
    /// Creates a session for the project at `project_root`.
    ///
    /// The cache is not read until the first unit needs a decision.
    pub fn new(
        project_root: &Path,
        config: &ProjectConfig,
        options: CompileOptions,
        invoker: Arc<dyn CompilerInvoker>,
        tool_version: &str,
    ) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            mapper: ArtifactPathMapper::new(project_root, Path::new(&config.paths.artifacts)),
            rewriter: OutputRewriter::new(project_root),
            options,
            cache: RecompilationCache::new(&project_root.join(&config.paths.cache), tool_version),
            invoker,
        }
    }

    /// The session's recompilation cache.
    pub fn cache_mut(&mut self) -> &mut RecompilationCache {
        &mut self.cache
    }

    /// Persists the cache if it was used.
    pub fn flush(&self) -> Result<(), CompileError> {
        self.cache.flush().map_err(CompileError::from)
    }

    /// Finds the units of `dialect` under every path.
    ///
    /// Fails if a path does not exist, or for Scarb if no manifest is found
    /// under any of the paths.
    pub fn discover(
        &self,
        paths: &[PathBuf],
        dialect: Dialect,
    ) -> Result<Vec<SourceBatch>, CompileError> {
        let mut batches = Vec::with_capacity(paths.len());
        for path in paths {
            let root = self.project_root.join(path);
            let units = traverse(&root, dialect.default_pattern())?;
            debug!(root = %root.display(), found = units.len(), "discovered units");
            batches.push(SourceBatch { root, units });
        }

        if dialect == Dialect::Scarb && batches.iter().all(|b| b.units.is_empty()) {
            return Err(CompileError::NoProjectsFound {
                paths: paths
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }
        Ok(batches)
    }

    /// Processes every unit of one batch, then flushes the cache.
    pub async fn compile_batch(
        &mut self,
        batch: &SourceBatch,
        dialect: Dialect,
    ) -> Result<BuildSummary, CompileError> {
        let mut summary = BuildSummary::default();
        for unit in &batch.units {
            let outcome = match CompileUnit::plan(dialect, unit, &self.mapper, &self.options) {
                Some(planned) => self.compile_unit(&planned).await,
                None => self.build_package(unit).await,
            };
            summary.record(unit, outcome);
        }
        self.flush()?;

        info!(
            root = %self.mapper.relative_to_project(&batch.root).display(),
            compiled = summary.compiled,
            up_to_date = summary.up_to_date,
            failed = summary.failed(),
            "processed sources path"
        );
        Ok(summary)
    }

    /// Discovers and processes every path, returning the merged summary.
    pub async fn build(
        &mut self,
        paths: &[PathBuf],
        dialect: Dialect,
    ) -> Result<BuildSummary, CompileError> {
        self.build_with_progress(paths, dialect, |_| {}).await
    }

    /// Like [`BuildSession::build`], calling `on_batch` before each batch
    /// is processed.
    pub async fn build_with_progress<F>(
        &mut self,
        paths: &[PathBuf],
        dialect: Dialect,
        mut on_batch: F,
    ) -> Result<BuildSummary, CompileError>
    where
        F: FnMut(&SourceBatch),
    {
        let batches = self.discover(paths, dialect)?;
        let mut summary = BuildSummary::default();
        for batch in &batches {
            on_batch(batch);
            summary.merge(self.compile_batch(batch, dialect).await?);
        }
        Ok(summary)
    }

    async fn compile_unit(&mut self, unit: &CompileUnit) -> UnitOutcome {
        let source = unit.source();
        let signature = unit.signature();
        if !self.options.force && !self.cache.should_recompile(source, &signature) {
            debug!(source = %source.display(), "up to date");
            return UnitOutcome::UpToDate;
        }

        // Taken before compiling so an edit made meanwhile is not recorded
        // as built.
        let fingerprint = match SourceHasher::hash_file(source) {
            Ok(fingerprint) => fingerprint,
            Err(e) => {
                self.cache.invalidate(source);
                return UnitOutcome::Failed(e.into());
            }
        };

        info!(
            source = %self.mapper.relative_to_project(source).display(),
            dialect = %unit.dialect(),
            "compiling"
        );
        match unit.compile(self.invoker.as_ref(), &self.rewriter).await {
            Ok(()) => {
                let artifacts = unit.artifacts().clone();
                match self.cache.record_success(
                    source,
                    unit.dialect(),
                    &signature,
                    fingerprint,
                    artifacts.clone(),
                ) {
                    Ok(()) => UnitOutcome::Compiled(vec![artifacts]),
                    Err(e) => UnitOutcome::Failed(e.into()),
                }
            }
            Err(e) => {
                self.cache.invalidate(source);
                UnitOutcome::Failed(e)
            }
        }
    }

    async fn build_package(&mut self, manifest: &Path) -> UnitOutcome {
        info!(
            manifest = %self.mapper.relative_to_project(manifest).display(),
            "building scarb package"
        );
        match scarb::build_package(
            manifest,
            &self.mapper,
            &self.options.scarb,
            self.invoker.as_ref(),
            &self.rewriter,
        )
        .await
        {
            Ok(sets) => UnitOutcome::Compiled(sets),
            Err(e) => UnitOutcome::Failed(e),
        }
    }
}
