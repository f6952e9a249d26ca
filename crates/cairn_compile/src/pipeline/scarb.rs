//! Scarb pipeline: one `scarb build` per package, then normalization of
//! Scarb's own output layout into the canonical one.

use std::path::Path;

use cairn_common::{ArtifactKind, ArtifactSet};
use tracing::{debug, warn};

use super::write_abi;
use crate::error::CompileError;
use crate::invoker::{run_step, CompilerInvoker, InvocationSpec, OutputRewriter};
use crate::layout::{truncate_outputs, ArtifactPathMapper};
use crate::manifest::PackageManifest;
use crate::options::ScarbOptions;
use crate::report::BuildReport;

/// The `scarb build` call for `manifest_path`.
pub fn build_invocation(manifest_path: &Path, options: &ScarbOptions) -> InvocationSpec {
    InvocationSpec::new(&options.command)
        .arg("--manifest-path")
        .path_arg(manifest_path)
        .arg("build")
        .current_dir(manifest_dir(manifest_path))
}

/// Builds one Scarb package and copies its contracts into the artifact tree.
///
/// The manifest is validated (unless disabled) before Scarb runs. Contracts
/// for which Scarb emitted no Sierra or no CASM are skipped with a warning.
/// Returns the artifact set of every copied contract.
pub async fn build_package(
    manifest_path: &Path,
    mapper: &ArtifactPathMapper,
    options: &ScarbOptions,
    invoker: &dyn CompilerInvoker,
    rewriter: &OutputRewriter,
) -> Result<Vec<ArtifactSet>, CompileError> {
    let manifest = PackageManifest::load(manifest_path)?;
    if options.skip_validate {
        debug!(manifest = %manifest_path.display(), "manifest validation skipped");
    } else {
        manifest.validate(manifest_path)?;
    }

    let dir = manifest_dir(manifest_path);
    run_step(
        invoker,
        rewriter,
        &build_invocation(manifest_path, options),
        manifest_path,
    )
    .await?;

    let report_path = BuildReport::path_for(dir, &options.profile, &manifest.package.name);
    let report = BuildReport::load(&report_path)?;
    let report_dir = report_path.parent().unwrap_or(dir);

    let mut outputs = Vec::new();
    for contract in &report.contracts {
        let (Some(sierra), Some(casm)) = (&contract.artifacts.sierra, &contract.artifacts.casm)
        else {
            warn!(
                package = %contract.package_name,
                contract = %contract.contract_name,
                "skipping contract without both sierra and casm output"
            );
            continue;
        };
        let sierra = report_dir.join(sierra);
        let casm = report_dir.join(casm);

        let set = mapper.scarb_outputs(dir, &contract.package_name, &contract.contract_name);
        truncate_outputs(set.iter().map(|(_, p)| p))?;
        for (kind, dest) in set.iter() {
            match kind {
                ArtifactKind::Sierra => copy(&sierra, dest)?,
                ArtifactKind::Casm => copy(&casm, dest)?,
                ArtifactKind::Abi => write_abi(&sierra, dest)?,
                ArtifactKind::LegacyBytecode => {}
            }
        }
        debug!(contract = %contract.contract_name, "copied scarb artifacts");
        outputs.push(set);
    }
    Ok(outputs)
}

fn manifest_dir(manifest_path: &Path) -> &Path {
    manifest_path.parent().unwrap_or_else(|| Path::new("."))
}

fn copy(from: &Path, to: &Path) -> Result<(), CompileError> {
    if !from.is_file() {
        return Err(CompileError::NotFound {
            path: from.to_path_buf(),
        });
    }
    std::fs::copy(from, to)
        .map(|_| ())
        .map_err(|e| CompileError::io(to, e))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::invoker::testing::{failed, ok, ScriptedInvoker};
    use crate::invoker::ProcessResult;
    use std::path::PathBuf;

    pub(crate) const VALID_MANIFEST: &str = r#"
[package]
name = "vault"
version = "0.1.0"

[[target.starknet-contract]]
sierra = true
casm = true
"#;

    const REPORT: &str = r#"{
  "version": 1,
  "contracts": [
    {
      "id": "1",
      "package_name": "vault",
      "contract_name": "Vault",
      "artifacts": {
        "sierra": "vault_Vault.contract_class.json",
        "casm": "vault_Vault.compiled_contract_class.json"
      }
    },
    {
      "id": "2",
      "package_name": "vault",
      "contract_name": "Partial",
      "artifacts": { "sierra": "vault_Partial.contract_class.json" }
    }
  ]
}"#;

    /// Stands in for `scarb build`: writes the report and class files into
    /// `target/dev` next to the manifest.
    pub(crate) fn fake_scarb(spec: &InvocationSpec) -> ProcessResult {
        let manifest = PathBuf::from(spec.value_of("--manifest-path").unwrap());
        let target = manifest.parent().unwrap().join("target/dev");
        std::fs::create_dir_all(&target).unwrap();
        std::fs::write(target.join("vault.starknet_artifacts.json"), REPORT).unwrap();
        std::fs::write(
            target.join("vault_Vault.contract_class.json"),
            r#"{"sierra_program":[],"abi":[{"type":"constructor"}]}"#,
        )
        .unwrap();
        std::fs::write(
            target.join("vault_Vault.compiled_contract_class.json"),
            r#"{"bytecode":["0x1"]}"#,
        )
        .unwrap();
        std::fs::write(
            target.join("vault_Partial.contract_class.json"),
            r#"{"sierra_program":[],"abi":[]}"#,
        )
        .unwrap();
        ok()
    }

    fn options() -> ScarbOptions {
        ScarbOptions {
            command: "scarb".to_string(),
            profile: "dev".to_string(),
            skip_validate: false,
        }
    }

    fn package(root: &Path, manifest: &str) -> PathBuf {
        let path = root.join("packages/vault/Scarb.toml");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, manifest).unwrap();
        path
    }

    #[test]
    fn invocation_runs_in_manifest_dir() {
        let spec = build_invocation(Path::new("/proj/vault/Scarb.toml"), &options());
        assert_eq!(spec.to_string(), "scarb --manifest-path /proj/vault/Scarb.toml build");
        assert_eq!(spec.cwd.as_deref(), Some(Path::new("/proj/vault")));
    }

    #[tokio::test]
    async fn copies_complete_contracts_and_skips_partial() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = package(dir.path(), VALID_MANIFEST);
        let mapper = ArtifactPathMapper::new(dir.path(), Path::new("out"));
        let invoker = ScriptedInvoker::new(fake_scarb);

        let sets = build_package(
            &manifest,
            &mapper,
            &options(),
            &invoker,
            &OutputRewriter::new(dir.path()),
        )
        .await
        .unwrap();

        assert_eq!(sets.len(), 1);
        let unit = dir.path().join("out/packages/vault/vault_Vault");
        assert_eq!(
            std::fs::read_to_string(unit.join("vault_Vault.casm")).unwrap(),
            r#"{"bytecode":["0x1"]}"#
        );
        assert_eq!(
            std::fs::read_to_string(unit.join("vault_Vault_abi.json")).unwrap(),
            "[\n  {\n    \"type\": \"constructor\"\n  }\n]\n"
        );
        assert!(unit.join("vault_Vault.json").is_file());
        assert!(!dir.path().join("out/packages/vault/vault_Partial").exists());
    }

    #[tokio::test]
    async fn invalid_manifest_rejected_before_invocation() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = package(
            dir.path(),
            "[package]\nname = \"vault\"\n\n[[target.starknet-contract]]\nname = \"other\"\ncasm = true\n",
        );
        let mapper = ArtifactPathMapper::new(dir.path(), Path::new("out"));
        let invoker = ScriptedInvoker::new(fake_scarb);

        let err = build_package(
            &manifest,
            &mapper,
            &options(),
            &invoker,
            &OutputRewriter::new(dir.path()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CompileError::ManifestValidation { .. }));
        assert_eq!(invoker.call_count(), 0);
    }

    #[tokio::test]
    async fn skip_validate_lets_scarb_decide() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = package(dir.path(), "[package]\nname = \"vault\"\n");
        let mapper = ArtifactPathMapper::new(dir.path(), Path::new("out"));
        let invoker = ScriptedInvoker::new(fake_scarb);
        let mut opts = options();
        opts.skip_validate = true;

        build_package(&manifest, &mapper, &opts, &invoker, &OutputRewriter::new(dir.path()))
            .await
            .unwrap();
        assert_eq!(invoker.call_count(), 1);
    }

    #[tokio::test]
    async fn missing_report_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = package(dir.path(), VALID_MANIFEST);
        let mapper = ArtifactPathMapper::new(dir.path(), Path::new("out"));
        let invoker = ScriptedInvoker::new(|_| ok());

        let err = build_package(
            &manifest,
            &mapper,
            &options(),
            &invoker,
            &OutputRewriter::new(dir.path()),
        )
        .await
        .unwrap_err();
        match err {
            CompileError::BuildReportMissing { path } => assert!(path
                .ends_with("packages/vault/target/dev/vault.starknet_artifacts.json")),
            other => panic!("expected BuildReportMissing, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn scarb_failure_is_compilation_error() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = package(dir.path(), VALID_MANIFEST);
        let mapper = ArtifactPathMapper::new(dir.path(), Path::new("out"));
        let invoker = ScriptedInvoker::new(|_| failed("error: could not compile `vault`"));

        let err = build_package(
            &manifest,
            &mapper,
            &options(),
            &invoker,
            &OutputRewriter::new(dir.path()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CompileError::Compilation { .. }));
    }
}
