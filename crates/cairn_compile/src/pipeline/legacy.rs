//! Cairo 0 pipeline: one `starknet-compile-deprecated` call per source.

use std::path::{Path, PathBuf};

use cairn_cache::InvocationSignature;
use cairn_common::{ArtifactKind, ArtifactSet};

use crate::error::CompileError;
use crate::invoker::{run_step, CompilerInvoker, InvocationSpec, OutputRewriter};
use crate::layout::{truncate_outputs, ArtifactPathMapper};
use crate::options::LegacyOptions;

/// A planned Cairo 0 compilation.
#[derive(Debug, Clone)]
pub struct LegacyUnit {
    pub(crate) source: PathBuf,
    pub(crate) artifacts: ArtifactSet,
    invocation: InvocationSpec,
}

impl LegacyUnit {
    /// Plans the compilation of `source`.
    pub fn new(source: &Path, mapper: &ArtifactPathMapper, options: &LegacyOptions) -> Self {
        let output = mapper.source_file(source, ArtifactKind::LegacyBytecode);
        let abi = mapper.source_file(source, ArtifactKind::Abi);

        let mut invocation = InvocationSpec::new(&options.compiler)
            .path_arg(source)
            .arg("--output")
            .path_arg(&output)
            .arg("--abi")
            .path_arg(&abi);
        if !options.cairo_path.is_empty() {
            let joined = options
                .cairo_path
                .iter()
                .map(|p| p.to_string_lossy())
                .collect::<Vec<_>>()
                .join(":");
            invocation = invocation.arg("--cairo_path").arg(joined);
        }
        let invocation = invocation
            .flag_if(options.account_contract, "--account_contract")
            .flag_if(options.disable_hint_validation, "--disable_hint_validation");

        let mut artifacts = ArtifactSet::new();
        artifacts.insert(ArtifactKind::LegacyBytecode, output);
        artifacts.insert(ArtifactKind::Abi, abi);

        Self {
            source: source.to_path_buf(),
            artifacts,
            invocation,
        }
    }

    /// The compiler call.
    pub fn invocation(&self) -> &InvocationSpec {
        &self.invocation
    }

    /// Cache signature of the compiler call.
    pub fn signature(&self) -> InvocationSignature {
        self.invocation.signature()
    }

    /// Truncates both outputs, then runs the compiler.
    pub async fn compile(
        &self,
        invoker: &dyn CompilerInvoker,
        rewriter: &OutputRewriter,
    ) -> Result<(), CompileError> {
        truncate_outputs(self.artifacts.iter().map(|(_, p)| p))?;
        run_step(invoker, rewriter, &self.invocation, &self.source).await?;
        Ok(())
    }
}
