//! Scarb build report (`<package>.starknet_artifacts.json`).

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::CompileError;

/// Contracts emitted by one `scarb build`.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildReport {
    /// Report format version.
    #[serde(default)]
    pub version: u32,
    /// One entry per compiled contract.
    #[serde(default)]
    pub contracts: Vec<ContractEntry>,
}

/// One contract in a build report.
#[derive(Debug, Clone, Deserialize)]
pub struct ContractEntry {
    /// Scarb's identifier for the contract.
    #[serde(default)]
    pub id: String,
    /// Package that defines the contract.
    pub package_name: String,
    /// Contract module name.
    pub contract_name: String,
    /// Emitted files, relative to the report's directory.
    #[serde(default)]
    pub artifacts: ContractArtifacts,
}

/// Files emitted for one contract.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContractArtifacts {
    /// Sierra contract class.
    pub sierra: Option<PathBuf>,
    /// Compiled CASM class.
    pub casm: Option<PathBuf>,
}

impl BuildReport {
    /// Where Scarb writes the report for `package` built with `profile`.
    pub fn path_for(manifest_dir: &Path, profile: &str, package: &str) -> PathBuf {
        manifest_dir
            .join("target")
            .join(profile)
            .join(format!("{package}.starknet_artifacts.json"))
    }

    /// Reads a report, failing with [`CompileError::BuildReportMissing`] if
    /// it does not exist.
    pub fn load(path: &Path) -> Result<Self, CompileError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CompileError::BuildReportMissing {
                    path: path.to_path_buf(),
                })
            }
            Err(e) => return Err(CompileError::io(path, e)),
        };
        serde_json::from_str(&content).map_err(|e| CompileError::Json {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}
