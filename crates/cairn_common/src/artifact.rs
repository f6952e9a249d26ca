//! Dialects and the artifact kinds each compilation unit produces.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Which compilation pipeline applies to a source file or project.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Cairo 0: one compiler call emits the compiled contract and its ABI.
    Legacy,
    /// Cairo 1: source to Sierra, then Sierra to CASM.
    Sierra,
    /// Scarb packages built by the external `scarb` tool.
    Scarb,
}

impl Dialect {
    /// Default glob used to discover units of this dialect under a sources root.
    pub fn default_pattern(self) -> &'static str {
        match self {
            Dialect::Legacy | Dialect::Sierra => "**/*.cairo",
            Dialect::Scarb => "**/Scarb.toml",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dialect::Legacy => "legacy",
            Dialect::Sierra => "sierra",
            Dialect::Scarb => "scarb",
        };
        f.write_str(name)
    }
}

/// The kind of an output file in the canonical artifact layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Compiled Cairo 0 contract (`<name>.json`).
    LegacyBytecode,
    /// Sierra intermediate representation (`<name>.json`).
    Sierra,
    /// CASM assembly (`<name>.casm`).
    Casm,
    /// Standalone ABI (`<name>_abi.json`).
    Abi,
}

impl ArtifactKind {
    /// File name for this kind, given the unit's base name.
    pub fn file_name(self, base: &str) -> String {
        match self {
            ArtifactKind::LegacyBytecode | ArtifactKind::Sierra => format!("{base}.json"),
            ArtifactKind::Casm => format!("{base}.casm"),
            ArtifactKind::Abi => format!("{base}_abi.json"),
        }
    }
}

/// Output files of one compiled unit, keyed by kind.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactSet(BTreeMap<ArtifactKind, PathBuf>);

impl ArtifactSet {
    /// Creates an empty artifact set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the path of one artifact kind, replacing any earlier path.
    pub fn insert(&mut self, kind: ArtifactKind, path: PathBuf) {
        self.0.insert(kind, path);
    }

    /// Returns the path recorded for `kind`, if any.
    pub fn get(&self, kind: ArtifactKind) -> Option<&Path> {
        self.0.get(&kind).map(PathBuf::as_path)
    }

    /// Iterates over `(kind, path)` pairs in kind order.
    pub fn iter(&self) -> impl Iterator<Item = (ArtifactKind, &Path)> {
        self.0.iter().map(|(k, p)| (*k, p.as_path()))
    }

    /// Returns `true` if every recorded file exists on disk.
    pub fn all_exist(&self) -> bool {
        self.0.values().all(|p| p.is_file())
    }

    /// Number of recorded artifacts.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no artifact is recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_per_kind() {
        assert_eq!(ArtifactKind::LegacyBytecode.file_name("token"), "token.json");
        assert_eq!(ArtifactKind::Sierra.file_name("token"), "token.json");
        assert_eq!(ArtifactKind::Casm.file_name("token"), "token.casm");
        assert_eq!(ArtifactKind::Abi.file_name("token"), "token_abi.json");
    }

    #[test]
    fn default_patterns() {
        assert_eq!(Dialect::Legacy.default_pattern(), "**/*.cairo");
        assert_eq!(Dialect::Sierra.default_pattern(), "**/*.cairo");
        assert_eq!(Dialect::Scarb.default_pattern(), "**/Scarb.toml");
    }

    #[test]
    fn dialect_display_matches_serde_name() {
        for dialect in [Dialect::Legacy, Dialect::Sierra, Dialect::Scarb] {
            let json = serde_json::to_string(&dialect).unwrap();
            assert_eq!(json, format!("\"{dialect}\""));
        }
    }

    #[test]
    fn artifact_set_serializes_as_map() {
        let mut set = ArtifactSet::new();
        set.insert(ArtifactKind::Abi, PathBuf::from("a/token_abi.json"));
        set.insert(ArtifactKind::Sierra, PathBuf::from("a/token.json"));
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(
            json,
            r#"{"sierra":"a/token.json","abi":"a/token_abi.json"}"#
        );
        let back: ArtifactSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn all_exist_checks_disk() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("present.json");
        std::fs::write(&present, "{}").unwrap();

        let mut set = ArtifactSet::new();
        set.insert(ArtifactKind::Sierra, present);
        assert!(set.all_exist());

        set.insert(ArtifactKind::Casm, dir.path().join("missing.casm"));
        assert!(!set.all_exist());
    }
}
