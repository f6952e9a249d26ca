//! External compiler invocation.
//!
//! Pipelines never spawn processes directly. They describe each call as an
//! [`InvocationSpec`] and hand it to a [`CompilerInvoker`], which production
//! code backs with real processes and tests back with scripted results.

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use cairn_cache::InvocationSignature;
use tracing::{debug, info, warn};

use crate::error::CompileError;

/// One external program call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationSpec {
    /// Program name or path.
    pub program: String,
    /// Arguments, in order.
    pub args: Vec<String>,
    /// Working directory, if different from the current one.
    pub cwd: Option<PathBuf>,
}

impl InvocationSpec {
    /// Creates a call of `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends a path argument.
    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy())
    }

    /// Appends `flag` if `enabled`.
    pub fn flag_if(self, enabled: bool, flag: &str) -> Self {
        if enabled {
            self.arg(flag)
        } else {
            self
        }
    }

    /// Sets the working directory.
    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.cwd = Some(dir.to_path_buf());
        self
    }

    /// Value following `flag` in the argument list.
    pub fn value_of(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }

    /// Cache signature over the program and every argument.
    pub fn signature(&self) -> InvocationSignature {
        InvocationSignature::from_command(&self.program, &self.args)
    }
}

impl fmt::Display for InvocationSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured outcome of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessResult {
    /// Exit code, `None` if the process was killed by a signal.
    pub code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl ProcessResult {
    /// Returns `true` if the process exited with status 0.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Capability to run an external compiler or build tool.
#[async_trait]
pub trait CompilerInvoker: Send + Sync {
    /// Runs `spec` to completion and captures its output.
    ///
    /// A non-zero exit is reported through [`ProcessResult::code`], not as an
    /// error; `Err` means the program could not be run at all.
    async fn invoke(&self, spec: &InvocationSpec) -> Result<ProcessResult, CompileError>;
}

/// Invoker that spawns real OS processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessInvoker;

#[async_trait]
impl CompilerInvoker for ProcessInvoker {
    async fn invoke(&self, spec: &InvocationSpec) -> Result<ProcessResult, CompileError> {
        debug!(command = %spec, "invoking");
        let mut command = tokio::process::Command::new(&spec.program);
        command.args(&spec.args).stdin(std::process::Stdio::null());
        if let Some(dir) = &spec.cwd {
            command.current_dir(dir);
        }
        let output = command.output().await.map_err(|e| CompileError::Launch {
            program: spec.program.clone(),
            source: e,
        })?;
        Ok(ProcessResult {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Compiler flag spellings and the CLI spellings users should see instead.
const FLAG_SPELLINGS: &[(&str, &str)] = &[
    ("--account_contract", "--account-contract"),
    ("--disable_hint_validation", "--disable-hint-validation"),
    ("--cairo_path", "--cairo-path"),
    ("--add_pythonic_hints", "--add-pythonic-hints"),
];

/// Rewrites compiler output for readability before it reaches the user.
#[derive(Debug, Clone)]
pub struct OutputRewriter {
    root_prefix: String,
}

impl OutputRewriter {
    /// Creates a rewriter that shortens paths under `project_root`.
    pub fn new(project_root: &Path) -> Self {
        let mut root_prefix = project_root.to_string_lossy().into_owned();
        if !root_prefix.ends_with(std::path::MAIN_SEPARATOR) {
            root_prefix.push(std::path::MAIN_SEPARATOR);
        }
        Self { root_prefix }
    }

    /// Makes project paths relative and maps compiler flags to CLI flags.
    pub fn rewrite(&self, text: &str) -> String {
        let mut out = text.replace(&self.root_prefix, "");
        for (from, to) in FLAG_SPELLINGS {
            out = out.replace(from, to);
        }
        out
    }

    /// Logs captured output: stdout at `info`, stderr at `warn`.
    pub fn forward(&self, program: &str, result: &ProcessResult) {
        for line in self.rewrite(&result.stdout).lines().filter(|l| !l.trim().is_empty()) {
            info!(target: "cairn::compiler", program, "{line}");
        }
        for line in self.rewrite(&result.stderr).lines().filter(|l| !l.trim().is_empty()) {
            warn!(target: "cairn::compiler", program, "{line}");
        }
    }

    /// Builds the message reported when `result` signals failure.
    pub fn failure_message(&self, program: &str, result: &ProcessResult) -> String {
        let status = match result.code {
            Some(code) => format!("exit code {code}"),
            None => "terminated by signal".to_string(),
        };
        let output = if result.stderr.trim().is_empty() {
            &result.stdout
        } else {
            &result.stderr
        };
        let output = self.rewrite(output.trim());
        if output.is_empty() {
            format!("{program} failed with {status}")
        } else {
            format!("{program} failed with {status}:\n{output}")
        }
    }
}

/// Runs `spec`, forwards its output, and converts a non-zero exit into
/// [`CompileError::Compilation`] for `unit`.
pub(crate) async fn run_step(
    invoker: &dyn CompilerInvoker,
    rewriter: &OutputRewriter,
    spec: &InvocationSpec,
    unit: &Path,
) -> Result<ProcessResult, CompileError> {
    let result = invoker.invoke(spec).await?;
    rewriter.forward(&spec.program, &result);
    if result.success() {
        Ok(result)
    } else {
        Err(CompileError::Compilation {
            unit: unit.to_path_buf(),
            message: rewriter.failure_message(&spec.program, &result),
        })
    }
}
