//! `cairn build`: compile every contract under the given sources paths.
//!
//! Each sources path is processed as one batch: units are compiled in
//! order, a failure is reported and the batch continues, and the
//! recompilation cache is flushed once the batch is done. The command
//! fails at the end if any unit failed.

use std::path::Path;
use std::sync::Arc;

use cairn_common::Dialect;
use cairn_compile::{BuildSession, BuildSummary, CompilerInvoker, ProcessInvoker};
use cairn_config::ProjectConfig;

use crate::pipeline::{build_paths, compile_options, load_project};
use crate::{BuildArgs, GlobalArgs};

/// Version recorded in the recompilation cache.
const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Runs the `cairn build` command.
///
/// Returns exit code 0 if every unit compiled or was up to date; any
/// failure is returned as a single error.
pub async fn run(args: &BuildArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let (project_dir, config) = load_project(global)?;
    let summary = build(
        &project_dir,
        &config,
        args,
        Arc::new(ProcessInvoker),
        global.quiet,
    )
    .await?;
    summary.check()?;
    Ok(0)
}

/// Builds every sources path with `invoker` and prints progress to stderr.
pub async fn build(
    project_dir: &Path,
    config: &ProjectConfig,
    args: &BuildArgs,
    invoker: Arc<dyn CompilerInvoker>,
    quiet: bool,
) -> Result<BuildSummary, Box<dyn std::error::Error>> {
    let dialect = Dialect::from(args.dialect);
    let options = compile_options(config, project_dir, args)?;
    let paths = build_paths(args, config)?;

    let mut session = BuildSession::new(project_dir, config, options, invoker, TOOL_VERSION);
    let summary = session
        .build_with_progress(&paths, dialect, |batch| {
            if !quiet {
                eprintln!(
                    "   Compiling {} ({dialect}, {} unit(s))",
                    display_path(project_dir, &batch.root),
                    batch.units.len()
                );
            }
        })
        .await?;

    for (_, err) in &summary.failures {
        eprintln!("error: {err}");
    }
    if !quiet {
        eprintln!(
            "    Finished compiled {}, up to date {}, failed {}",
            summary.compiled,
            summary.up_to_date,
            summary.failed()
        );
    }
    Ok(summary)
}

fn display_path(project_dir: &Path, path: &Path) -> String {
    path.strip_prefix(project_dir)
        .unwrap_or(path)
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DialectArg;
    use async_trait::async_trait;
    use cairn_compile::{CompileError, InvocationSpec, ProcessResult};
    use cairn_config::load_config_from_str;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Cairo 0 compiler stand-in: writes both outputs unless the source
    /// contains `syntax error`.
    #[derive(Default)]
    struct FakeLegacyCompiler {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CompilerInvoker for FakeLegacyCompiler {
        async fn invoke(&self, spec: &InvocationSpec) -> Result<ProcessResult, CompileError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let source = fs::read_to_string(&spec.args[0]).unwrap();
            if source.contains("syntax error") {
                return Ok(ProcessResult {
                    code: Some(1),
                    stdout: String::new(),
                    stderr: format!("{}:1:1: unexpected token", spec.args[0]),
                });
            }
            fs::write(spec.value_of("--output").unwrap(), "{\"program\": {}}\n").unwrap();
            fs::write(spec.value_of("--abi").unwrap(), "[]\n").unwrap();
            Ok(ProcessResult {
                code: Some(0),
                ..ProcessResult::default()
            })
        }
    }

    fn args() -> BuildArgs {
        BuildArgs {
            paths: Vec::new(),
            dialect: DialectArg::Legacy,
            cairo_path: Vec::new(),
            account_contract: false,
            disable_hint_validation: false,
            single_file: false,
            add_pythonic_hints: false,
            skip_validate: false,
            force: false,
        }
    }

    fn project(files: &[(&str, &str)]) -> (TempDir, ProjectConfig) {
        let tmp = TempDir::new().unwrap();
        for (rel, content) in files {
            let path = tmp.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        let config = load_config_from_str("[project]\nname = \"token\"\n").unwrap();
        (tmp, config)
    }

    #[tokio::test]
    async fn builds_then_reuses_cache() {
        let (tmp, config) = project(&[
            ("contracts/token.cairo", "%lang starknet\n"),
            ("contracts/account/account.cairo", "%lang starknet\n"),
        ]);
        let compiler = Arc::new(FakeLegacyCompiler::default());

        let first = build(tmp.path(), &config, &args(), compiler.clone(), true)
            .await
            .unwrap();
        assert_eq!(first.compiled, 2);
        assert_eq!(first.failed(), 0);
        assert!(tmp
            .path()
            .join("starknet-artifacts/contracts/token.cairo/token.json")
            .is_file());
        assert!(tmp
            .path()
            .join("starknet-artifacts/contracts/account/account.cairo/account_abi.json")
            .is_file());
        assert!(tmp.path().join("cache/compile-cache.json").is_file());

        let second = build(tmp.path(), &config, &args(), compiler.clone(), true)
            .await
            .unwrap();
        assert_eq!(second.compiled, 0);
        assert_eq!(second.up_to_date, 2);
        assert_eq!(compiler.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn force_recompiles_everything() {
        let (tmp, config) = project(&[("contracts/token.cairo", "%lang starknet\n")]);
        let compiler = Arc::new(FakeLegacyCompiler::default());
        build(tmp.path(), &config, &args(), compiler.clone(), true)
            .await
            .unwrap();

        let mut forced = args();
        forced.force = true;
        let summary = build(tmp.path(), &config, &forced, compiler.clone(), true)
            .await
            .unwrap();
        assert_eq!(summary.compiled, 1);
        assert_eq!(compiler.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failure_is_reported_once_at_the_end() {
        let (tmp, config) = project(&[
            ("contracts/a.cairo", "%lang starknet\n"),
            ("contracts/b.cairo", "syntax error\n"),
            ("contracts/c.cairo", "%lang starknet\n"),
        ]);
        let summary = build(
            tmp.path(),
            &config,
            &args(),
            Arc::new(FakeLegacyCompiler::default()),
            true,
        )
        .await
        .unwrap();
        assert_eq!(summary.compiled, 2);
        assert_eq!(summary.failures.len(), 1);
        assert!(summary.failures[0].0.ends_with("contracts/b.cairo"));
        assert_eq!(
            summary.check().unwrap_err().to_string(),
            "1 file(s) failed to compile"
        );
    }

    #[tokio::test]
    async fn explicit_paths_limit_the_build() {
        let (tmp, config) = project(&[
            ("contracts/token.cairo", "%lang starknet\n"),
            ("vendor/lib.cairo", "%lang starknet\n"),
        ]);
        let mut only_vendor = args();
        only_vendor.paths = vec![tmp.path().join("vendor")];
        let summary = build(
            tmp.path(),
            &config,
            &only_vendor,
            Arc::new(FakeLegacyCompiler::default()),
            true,
        )
        .await
        .unwrap();
        assert_eq!(summary.compiled, 1);
        assert!(!tmp
            .path()
            .join("starknet-artifacts/contracts/token.cairo")
            .exists());
    }

    #[tokio::test]
    async fn missing_sources_path_is_fatal() {
        let (tmp, config) = project(&[]);
        let mut missing = args();
        missing.paths = vec![tmp.path().join("nowhere")];
        let err = build(
            tmp.path(),
            &config,
            &missing,
            Arc::new(FakeLegacyCompiler::default()),
            true,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("path not found"));
    }

    #[test]
    fn display_path_is_project_relative() {
        assert_eq!(
            display_path(Path::new("/proj"), Path::new("/proj/contracts")),
            "contracts"
        );
        assert_eq!(
            display_path(Path::new("/proj"), Path::new("/elsewhere/lib")),
            "/elsewhere/lib"
        );
    }
}
