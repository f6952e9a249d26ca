//! Cairo 1 pipeline.
//!
//! Stage 1 compiles the source to a Sierra contract class, whose ABI is
//! then written to its own file. Stage 2 compiles the Sierra class to CASM.
//! If stage 1 fails, neither the CASM nor the ABI file is touched.

use std::path::{Path, PathBuf};

use cairn_cache::InvocationSignature;
use cairn_common::{ArtifactKind, ArtifactSet};
use tracing::debug;

use super::write_abi;
use crate::error::CompileError;
use crate::invoker::{run_step, CompilerInvoker, InvocationSpec, OutputRewriter};
use crate::layout::{truncate_outputs, ArtifactPathMapper};
use crate::options::SierraOptions;

const SIERRA_COMPILER: &str = "starknet-compile";
const CASM_COMPILER: &str = "starknet-sierra-compile";

/// A planned Cairo 1 compilation.
#[derive(Debug, Clone)]
pub struct SierraUnit {
    pub(crate) source: PathBuf,
    pub(crate) artifacts: ArtifactSet,
    sierra: PathBuf,
    casm: PathBuf,
    abi: PathBuf,
    to_sierra: InvocationSpec,
    to_casm: InvocationSpec,
}

impl SierraUnit {
    /// Plans the compilation of `source`.
    pub fn new(source: &Path, mapper: &ArtifactPathMapper, options: &SierraOptions) -> Self {
        let sierra = mapper.source_file(source, ArtifactKind::Sierra);
        let casm = mapper.source_file(source, ArtifactKind::Casm);
        let abi = mapper.source_file(source, ArtifactKind::Abi);

        let mut to_sierra = InvocationSpec::new(options.program(SIERRA_COMPILER));
        if let Some(list) = &options.allowed_libfuncs_list_name {
            to_sierra = to_sierra.arg("--allowed-libfuncs-list-name").arg(list);
        }
        let to_sierra = to_sierra
            .flag_if(options.single_file, "--single-file")
            .flag_if(options.replace_ids, "--replace-ids")
            .path_arg(source)
            .path_arg(&sierra);

        let mut to_casm = InvocationSpec::new(options.program(CASM_COMPILER));
        if let Some(list) = &options.allowed_libfuncs_list_name {
            to_casm = to_casm.arg("--allowed-libfuncs-list-name").arg(list);
        }
        let to_casm = to_casm
            .flag_if(options.add_pythonic_hints, "--add-pythonic-hints")
            .path_arg(&sierra)
            .path_arg(&casm);

        let mut artifacts = ArtifactSet::new();
        artifacts.insert(ArtifactKind::Sierra, sierra.clone());
        artifacts.insert(ArtifactKind::Casm, casm.clone());
        artifacts.insert(ArtifactKind::Abi, abi.clone());

        Self {
            source: source.to_path_buf(),
            artifacts,
            sierra,
            casm,
            abi,
            to_sierra,
            to_casm,
        }
    }

    /// The source-to-Sierra call.
    pub fn stage1(&self) -> &InvocationSpec {
        &self.to_sierra
    }

    /// The Sierra-to-CASM call.
    pub fn stage2(&self) -> &InvocationSpec {
        &self.to_casm
    }

    /// Cache signature over both stages.
    pub fn signature(&self) -> InvocationSignature {
        InvocationSignature::combine(&[self.to_sierra.signature(), self.to_casm.signature()])
    }

    /// Runs both stages and extracts the ABI between them.
    pub async fn compile(
        &self,
        invoker: &dyn CompilerInvoker,
        rewriter: &OutputRewriter,
    ) -> Result<(), CompileError> {
        truncate_outputs([self.sierra.as_path()])?;
        run_step(invoker, rewriter, &self.to_sierra, &self.source).await?;

        truncate_outputs([self.casm.as_path(), self.abi.as_path()])?;
        write_abi(&self.sierra, &self.abi)?;
        debug!(abi = %self.abi.display(), "extracted abi");

        run_step(invoker, rewriter, &self.to_casm, &self.source).await?;
        Ok(())
    }
}
