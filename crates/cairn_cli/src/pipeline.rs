//! Shared helpers for CLI commands.
//!
//! Project root resolution, configuration loading, and the merge of
//! `cairn build` flags over configured compiler settings.

use std::path::{Path, PathBuf};

use cairn_compile::CompileOptions;
use cairn_config::{load_config, load_config_from_str, ProjectConfig, CONFIG_FILE};

use crate::{BuildArgs, GlobalArgs};

/// Walks up from `start` looking for the nearest directory containing `cairn.toml`.
///
/// Returns the directory containing `cairn.toml`, or an error if none is found.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Resolves the project root directory from global CLI args.
///
/// If `--config` is specified, uses that path (file → parent dir, dir → itself).
/// Otherwise walks up from the current directory looking for `cairn.toml`.
pub fn resolve_project_root(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(ref config_path) = global.config {
        let p = PathBuf::from(config_path);
        if p.is_file() {
            Ok(p.parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")))
        } else {
            Ok(p)
        }
    } else {
        find_project_root(&std::env::current_dir()?)
    }
}

/// Resolves the project root and loads its configuration.
///
/// A `--config` file is read as-is, whatever its name; otherwise
/// `<root>/cairn.toml` is loaded.
pub fn load_project(
    global: &GlobalArgs,
) -> Result<(PathBuf, ProjectConfig), Box<dyn std::error::Error>> {
    let root = resolve_project_root(global)?;
    let config = match global.config.as_deref().map(Path::new) {
        Some(file) if file.is_file() => {
            let content = std::fs::read_to_string(file)
                .map_err(|e| format!("failed to read {}: {e}", file.display()))?;
            load_config_from_str(&content)?
        }
        _ => load_config(&root)?,
    };
    Ok((absolute(&root)?, config))
}

/// Sources paths for a build: the ones given on the command line, made
/// absolute against the working directory, or else `paths.sources`
/// relative to the project root.
pub fn build_paths(
    args: &BuildArgs,
    config: &ProjectConfig,
) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    if args.paths.is_empty() {
        return Ok(config.paths.sources.iter().map(PathBuf::from).collect());
    }
    let paths = args
        .paths
        .iter()
        .map(|p| absolute(p))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(paths)
}

/// Configured compiler settings with `cairn build` flags applied on top.
///
/// Boolean flags can only switch a setting on; `--cairo-path` entries are
/// appended after the configured import roots.
pub fn compile_options(
    config: &ProjectConfig,
    project_root: &Path,
    args: &BuildArgs,
) -> Result<CompileOptions, Box<dyn std::error::Error>> {
    let mut options = CompileOptions::from_config(config, project_root);
    for path in &args.cairo_path {
        options.legacy.cairo_path.push(absolute(path)?);
    }
    options.legacy.account_contract |= args.account_contract;
    options.legacy.disable_hint_validation |= args.disable_hint_validation;
    options.sierra.single_file |= args.single_file;
    options.sierra.add_pythonic_hints |= args.add_pythonic_hints;
    options.scarb.skip_validate |= args.skip_validate;
    options.force = args.force;
    Ok(options)
}

fn absolute(path: &Path) -> Result<PathBuf, std::io::Error> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
