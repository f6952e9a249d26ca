//! Compilation pipelines.
//!
//! Cairo 0 and Cairo 1 sources are compiled one file at a time as a
//! [`CompileUnit`]; Scarb packages are built one manifest at a time by
//! [`scarb::build_package`].

pub mod legacy;
pub mod scarb;
pub mod sierra;

use std::path::Path;

use cairn_cache::InvocationSignature;
use cairn_common::{ArtifactSet, Dialect};

use crate::error::CompileError;
use crate::invoker::{CompilerInvoker, OutputRewriter};
use crate::layout::ArtifactPathMapper;
use crate::options::CompileOptions;

pub use legacy::LegacyUnit;
pub use sierra::SierraUnit;

/// One source file planned for compilation by a per-file pipeline.
#[derive(Debug, Clone)]
pub enum CompileUnit {
    /// Cairo 0 single-pass compilation.
    Legacy(LegacyUnit),
    /// Cairo 1 two-stage compilation.
    Sierra(SierraUnit),
}

impl CompileUnit {
    /// Plans the compilation of `source`. Returns `None` for
    /// [`Dialect::Scarb`], which is built per package instead.
    pub fn plan(
        dialect: Dialect,
        source: &Path,
        mapper: &ArtifactPathMapper,
        options: &CompileOptions,
    ) -> Option<Self> {
        match dialect {
            Dialect::Legacy => Some(CompileUnit::Legacy(LegacyUnit::new(
                source,
                mapper,
                &options.legacy,
            ))),
            Dialect::Sierra => Some(CompileUnit::Sierra(SierraUnit::new(
                source,
                mapper,
                &options.sierra,
            ))),
            Dialect::Scarb => None,
        }
    }

    /// The source file.
    pub fn source(&self) -> &Path {
        match self {
            CompileUnit::Legacy(u) => &u.source,
            CompileUnit::Sierra(u) => &u.source,
        }
    }

    /// The pipeline this unit runs through.
    pub fn dialect(&self) -> Dialect {
        match self {
            CompileUnit::Legacy(_) => Dialect::Legacy,
            CompileUnit::Sierra(_) => Dialect::Sierra,
        }
    }

    /// Cache signature of every compiler call the unit makes.
    pub fn signature(&self) -> InvocationSignature {
        match self {
            CompileUnit::Legacy(u) => u.signature(),
            CompileUnit::Sierra(u) => u.signature(),
        }
    }

    /// Files the unit writes.
    pub fn artifacts(&self) -> &ArtifactSet {
        match self {
            CompileUnit::Legacy(u) => &u.artifacts,
            CompileUnit::Sierra(u) => &u.artifacts,
        }
    }

    /// Runs the unit's compiler calls.
    pub async fn compile(
        &self,
        invoker: &dyn CompilerInvoker,
        rewriter: &OutputRewriter,
    ) -> Result<(), CompileError> {
        match self {
            CompileUnit::Legacy(u) => u.compile(invoker, rewriter).await,
            CompileUnit::Sierra(u) => u.compile(invoker, rewriter).await,
        }
    }
}

/// Extracts the `abi` member of a Sierra contract class into its own file.
///
/// The ABI is pretty-printed and followed by a newline. Some compiler
/// versions embed it as a JSON-encoded string; it is decoded first.
pub fn write_abi(class_path: &Path, abi_path: &Path) -> Result<(), CompileError> {
    let invalid = |reason: String| CompileError::Json {
        path: class_path.to_path_buf(),
        reason,
    };

    let content = std::fs::read_to_string(class_path).map_err(|e| CompileError::io(class_path, e))?;
    let mut class: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))?;
    let abi = match class.get_mut("abi").map(serde_json::Value::take) {
        Some(serde_json::Value::String(encoded)) => {
            serde_json::from_str(&encoded).map_err(|e| invalid(format!("embedded abi: {e}")))?
        }
        Some(abi) => abi,
        None => return Err(invalid("contract class has no abi member".to_string())),
    };

    let mut pretty = serde_json::to_string_pretty(&abi).map_err(|e| invalid(e.to_string()))?;
    pretty.push('\n');
    std::fs::write(abi_path, pretty).map_err(|e| CompileError::io(abi_path, e))
}
