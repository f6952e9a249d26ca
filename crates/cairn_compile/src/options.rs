//! Effective compiler settings for one build.
//!
//! Built from `cairn.toml` and then overridden by CLI flags.

use std::path::{Path, PathBuf};

use cairn_config::ProjectConfig;

/// Settings for every pipeline of one build invocation.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Cairo 0 settings.
    pub legacy: LegacyOptions,
    /// Cairo 1 settings.
    pub sierra: SierraOptions,
    /// Scarb settings.
    pub scarb: ScarbOptions,
    /// Compile every unit even if the cache says it is up to date.
    pub force: bool,
}

/// Cairo 0 compiler settings.
#[derive(Debug, Clone)]
pub struct LegacyOptions {
    /// Compiler executable.
    pub compiler: String,
    /// Import roots passed as `--cairo_path`, in order.
    pub cairo_path: Vec<PathBuf>,
    /// Compile as an account contract.
    pub account_contract: bool,
    /// Allow unwhitelisted hints.
    pub disable_hint_validation: bool,
}

/// Cairo 1 compiler settings.
#[derive(Debug, Clone, Default)]
pub struct SierraOptions {
    /// Directory holding `starknet-compile` and `starknet-sierra-compile`;
    /// `None` resolves them through `PATH`.
    pub compiler_dir: Option<PathBuf>,
    /// Allowed libfuncs list passed to both stages.
    pub allowed_libfuncs_list_name: Option<String>,
    /// Compile a single file instead of a crate.
    pub single_file: bool,
    /// Replace ids with debug names in the Sierra output.
    pub replace_ids: bool,
    /// Emit Python hints in the CASM output.
    pub add_pythonic_hints: bool,
}

/// Scarb settings.
#[derive(Debug, Clone)]
pub struct ScarbOptions {
    /// Scarb executable.
    pub command: String,
    /// Build profile whose target directory holds the build report.
    pub profile: String,
    /// Skip manifest validation.
    pub skip_validate: bool,
}

impl CompileOptions {
    /// Derives settings from the project configuration.
    ///
    /// The Cairo 0 import path starts with the project root and every
    /// sources root, followed by `legacy.cairo_path`.
    pub fn from_config(config: &ProjectConfig, project_root: &Path) -> Self {
        let mut cairo_path = vec![project_root.to_path_buf()];
        cairo_path.extend(config.paths.sources.iter().map(|s| project_root.join(s)));
        cairo_path.extend(config.legacy.cairo_path.iter().map(|p| project_root.join(p)));

        Self {
            legacy: LegacyOptions {
                compiler: config.legacy.compiler.clone(),
                cairo_path,
                account_contract: config.legacy.account_contract,
                disable_hint_validation: config.legacy.disable_hint_validation,
            },
            sierra: SierraOptions {
                compiler_dir: config.sierra.compiler_dir.as_ref().map(|d| project_root.join(d)),
                allowed_libfuncs_list_name: config.sierra.allowed_libfuncs_list_name.clone(),
                single_file: config.sierra.single_file,
                replace_ids: config.sierra.replace_ids,
                add_pythonic_hints: config.sierra.add_pythonic_hints,
            },
            scarb: ScarbOptions {
                command: config.scarb.command.clone(),
                profile: config.scarb.profile.clone(),
                skip_validate: config.scarb.skip_validate,
            },
            force: false,
        }
    }
}

impl SierraOptions {
    /// Program name or path of a Cairo 1 compiler binary.
    pub fn program(&self, binary: &str) -> String {
        match &self.compiler_dir {
            Some(dir) => dir.join(binary).to_string_lossy().into_owned(),
            None => binary.to_string(),
        }
    }
}
