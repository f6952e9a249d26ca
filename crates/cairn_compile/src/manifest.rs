//! `Scarb.toml` package manifests.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::CompileError;

/// The parts of a `Scarb.toml` the Scarb pipeline looks at.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageManifest {
    /// `[package]` section.
    pub package: PackageSection,
    /// `[target]` section.
    #[serde(default)]
    pub target: TargetSection,
}

/// `[package]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageSection {
    /// Package name; prefixes every contract's artifact directory.
    pub name: String,
}

/// `[target]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TargetSection {
    /// `[[target.starknet-contract]]` entries.
    #[serde(rename = "starknet-contract", default)]
    pub starknet_contract: Vec<ContractTarget>,
}

/// One `[[target.starknet-contract]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ContractTarget {
    /// Target name. An unnamed target applies unconditionally.
    pub name: Option<String>,
    /// Whether Sierra output is emitted. Scarb defaults this to `true`.
    #[serde(default = "default_true")]
    pub sierra: bool,
    /// Whether CASM output is emitted. Scarb defaults this to `false`.
    #[serde(default)]
    pub casm: bool,
}

fn default_true() -> bool {
    true
}

impl PackageManifest {
    /// Reads and parses a manifest file.
    pub fn load(path: &Path) -> Result<Self, CompileError> {
        let content = std::fs::read_to_string(path).map_err(|e| CompileError::io(path, e))?;
        Self::parse(&content, path)
    }

    /// Parses manifest text; `path` is used for error messages only.
    pub fn parse(content: &str, path: &Path) -> Result<Self, CompileError> {
        toml::from_str(content).map_err(|e| CompileError::ManifestParse {
            manifest: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Returns the target configuration Scarb will use for this package.
    ///
    /// A target applies if it is unnamed or named after the package. When
    /// several apply, the first one in document order is used.
    pub fn applicable_target(&self) -> Option<&ContractTarget> {
        let mut applicable = self
            .target
            .starknet_contract
            .iter()
            .filter(|t| t.name.as_deref().map_or(true, |n| n == self.package.name));
        let first = applicable.next();
        let ignored = applicable.count();
        if first.is_some() && ignored > 0 {
            debug!(
                package = %self.package.name,
                ignored,
                "several starknet-contract targets apply, using the first"
            );
        }
        first
    }

    /// Checks that the package emits both Sierra and CASM for its contracts.
    pub fn validate(&self, path: &Path) -> Result<&ContractTarget, CompileError> {
        let reject = |reason: String| CompileError::ManifestValidation {
            manifest: path.to_path_buf(),
            reason,
        };

        if self.target.starknet_contract.is_empty() {
            return Err(reject(
                "no [[target.starknet-contract]] section".to_string(),
            ));
        }
        let target = self.applicable_target().ok_or_else(|| {
            reject(format!(
                "no starknet-contract target is unnamed or named '{}'",
                self.package.name
            ))
        })?;
        if !target.sierra {
            return Err(reject("sierra output is disabled; set sierra = true".to_string()));
        }
        if !target.casm {
            return Err(reject("casm output is not enabled; set casm = true".to_string()));
        }
        Ok(target)
    }
}
