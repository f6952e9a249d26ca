//! Canonical artifact layout.
//!
//! Every compiled unit gets its own directory under the artifacts root,
//! mirroring the unit's location relative to the project root:
//!
//! ```text
//! contracts/account/wallet.cairo
//!   -> starknet-artifacts/contracts/account/wallet.cairo/wallet.json
//!   -> starknet-artifacts/contracts/account/wallet.cairo/wallet_abi.json
//! ```

use std::fs::File;
use std::path::{Path, PathBuf};

use cairn_common::{ArtifactKind, ArtifactSet};

use crate::error::CompileError;

/// Derives output paths for compiled units.
#[derive(Debug, Clone)]
pub struct ArtifactPathMapper {
    project_root: PathBuf,
    artifacts_root: PathBuf,
}

impl ArtifactPathMapper {
    /// Creates a mapper. A relative `artifacts_root` is taken relative to
    /// `project_root`.
    pub fn new(project_root: &Path, artifacts_root: &Path) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            artifacts_root: project_root.join(artifacts_root),
        }
    }

    /// Root of the artifact tree.
    pub fn artifacts_root(&self) -> &Path {
        &self.artifacts_root
    }

    /// Path of `path` relative to the project root, or just its file name if
    /// it lies outside the project.
    pub fn relative_to_project(&self, path: &Path) -> PathBuf {
        match path.strip_prefix(&self.project_root) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => path.file_name().map(PathBuf::from).unwrap_or_default(),
        }
    }

    /// Unit directory for a Cairo source file.
    pub fn unit_dir(&self, source: &Path) -> PathBuf {
        self.artifacts_root.join(self.relative_to_project(source))
    }

    /// Outputs of a Cairo 0 compilation of `source`.
    pub fn legacy_outputs(&self, source: &Path) -> ArtifactSet {
        self.source_outputs(source, &[ArtifactKind::LegacyBytecode, ArtifactKind::Abi])
    }

    /// Outputs of a Sierra + CASM compilation of `source`.
    pub fn sierra_outputs(&self, source: &Path) -> ArtifactSet {
        self.source_outputs(
            source,
            &[ArtifactKind::Sierra, ArtifactKind::Casm, ArtifactKind::Abi],
        )
    }

    /// Outputs of one contract of a Scarb package.
    ///
    /// The unit directory sits next to where the manifest directory would be
    /// mirrored and is named `<package>_<contract>`.
    pub fn scarb_outputs(&self, manifest_dir: &Path, package: &str, contract: &str) -> ArtifactSet {
        let base = format!("{package}_{contract}");
        let dir = self
            .artifacts_root
            .join(self.relative_to_project(manifest_dir))
            .join(&base);
        let mut set = ArtifactSet::new();
        for kind in [ArtifactKind::Sierra, ArtifactKind::Casm, ArtifactKind::Abi] {
            set.insert(kind, dir.join(kind.file_name(&base)));
        }
        set
    }

    /// Path of one output file of a Cairo source in its unit directory.
    pub fn source_file(&self, source: &Path, kind: ArtifactKind) -> PathBuf {
        let base = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.unit_dir(source).join(kind.file_name(&base))
    }

    fn source_outputs(&self, source: &Path, kinds: &[ArtifactKind]) -> ArtifactSet {
        let mut set = ArtifactSet::new();
        for kind in kinds {
            set.insert(*kind, self.source_file(source, *kind));
        }
        set
    }
}

/// Recreates each file empty, creating parent directories as needed.
///
/// Called before a compiler step writes the files, so that a failed step
/// never leaves a previous run's content behind.
pub fn truncate_outputs<'a>(paths: impl IntoIterator<Item = &'a Path>) -> Result<(), CompileError> {
    for path in paths {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CompileError::io(parent, e))?;
        }
        File::create(path).map_err(|e| CompileError::io(path, e))?;
    }
    Ok(())
}
