//! Configuration types deserialized from `cairn.toml`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// The top-level project configuration parsed from `cairn.toml`.
///
/// Every section except `[project]` is optional and falls back to the
/// defaults documented on the individual section types.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    /// Core project metadata.
    pub project: ProjectMeta,
    /// Source, artifact, and cache directory locations.
    #[serde(default)]
    pub paths: PathsConfig,
    /// Cairo 0 compiler settings.
    #[serde(default)]
    pub legacy: LegacyConfig,
    /// Cairo 1 (Sierra/CASM) compiler settings.
    #[serde(default)]
    pub sierra: SierraConfig,
    /// Scarb build settings.
    #[serde(default)]
    pub scarb: ScarbConfig,
    /// Which network test/run actions target by default.
    #[serde(default)]
    pub network: NetworkSelection,
    /// User-defined networks, added to (and overriding) the built-in ones.
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkDef>,
    /// Integrated devnet settings.
    #[serde(default)]
    pub devnet: DevnetConfig,
    /// Test action settings.
    #[serde(default)]
    pub test: TestConfig,
}

/// Core project metadata required in every `cairn.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// The project version string.
    #[serde(default)]
    pub version: String,
    /// A brief description of the project.
    #[serde(default)]
    pub description: String,
}

/// Directory layout of the project, relative to the project root.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// Directories (or single files) searched for sources.
    #[serde(
        default = "default_sources",
        deserialize_with = "deserialize_string_or_vec"
    )]
    pub sources: Vec<String>,
    /// Root of the canonical artifact layout.
    #[serde(default = "default_artifacts")]
    pub artifacts: String,
    /// Directory holding the persisted recompilation cache.
    #[serde(default = "default_cache")]
    pub cache: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            artifacts: default_artifacts(),
            cache: default_cache(),
        }
    }
}

fn default_sources() -> Vec<String> {
    vec!["contracts".to_string()]
}

fn default_artifacts() -> String {
    "starknet-artifacts".to_string()
}

fn default_cache() -> String {
    "cache".to_string()
}

/// Settings for the Cairo 0 compiler.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyConfig {
    /// Compiler executable.
    #[serde(default = "default_legacy_compiler")]
    pub compiler: String,
    /// Extra import roots passed through `--cairo_path`.
    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub cairo_path: Vec<String>,
    /// Compile every source as an account contract.
    #[serde(default)]
    pub account_contract: bool,
    /// Skip the compiler's hint whitelist check.
    #[serde(default)]
    pub disable_hint_validation: bool,
}

impl Default for LegacyConfig {
    fn default() -> Self {
        Self {
            compiler: default_legacy_compiler(),
            cairo_path: Vec::new(),
            account_contract: false,
            disable_hint_validation: false,
        }
    }
}

fn default_legacy_compiler() -> String {
    "starknet-compile-deprecated".to_string()
}

/// Settings for the Cairo 1 compiler pair.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SierraConfig {
    /// Directory holding `starknet-compile` and `starknet-sierra-compile`.
    /// When absent the binaries are looked up on `PATH`.
    pub compiler_dir: Option<PathBuf>,
    /// Name of the allowed libfuncs list passed to both stages.
    pub allowed_libfuncs_list_name: Option<String>,
    /// Emit Python hints in the CASM output.
    #[serde(default)]
    pub add_pythonic_hints: bool,
    /// Compile a single file instead of a crate.
    #[serde(default)]
    pub single_file: bool,
    /// Replace Sierra ids with human-readable ones.
    #[serde(default)]
    pub replace_ids: bool,
}

/// Settings for Scarb package builds.
#[derive(Debug, Clone, Deserialize)]
pub struct ScarbConfig {
    /// Scarb executable.
    #[serde(default = "default_scarb_command")]
    pub command: String,
    /// Build profile whose `target/<profile>` directory holds the outputs.
    #[serde(default = "default_scarb_profile")]
    pub profile: String,
    /// Skip the `[[target.starknet-contract]]` shape check.
    #[serde(default)]
    pub skip_validate: bool,
}

impl Default for ScarbConfig {
    fn default() -> Self {
        Self {
            command: default_scarb_command(),
            profile: default_scarb_profile(),
            skip_validate: false,
        }
    }
}

fn default_scarb_command() -> String {
    "scarb".to_string()
}

fn default_scarb_profile() -> String {
    "dev".to_string()
}

/// The `[network]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkSelection {
    /// Network used when no `--starknet-network` flag is given.
    pub default: Option<String>,
}

/// A user-defined network entry under `[networks.<name>]`.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkDef {
    /// Gateway or RPC base URL.
    pub url: String,
    /// Chain identity (e.g. `SN_GOERLI`).
    pub chain_id: Option<String>,
    /// Endpoint accepting contract verification uploads.
    pub verification_url: Option<String>,
    /// Base URL of the explorer page for verified contracts.
    pub verified_url: Option<String>,
}

/// Settings for the supervised local devnet.
#[derive(Debug, Clone, Deserialize)]
pub struct DevnetConfig {
    /// Address the devnet listens on.
    #[serde(default = "default_devnet_url")]
    pub url: String,
    /// Devnet executable for the command launcher.
    #[serde(default = "default_devnet_command")]
    pub command: String,
    /// When set, the devnet runs as `shardlabs/starknet-devnet:<tag>` in docker.
    pub docker_tag: Option<String>,
    /// Extra arguments appended to the devnet command line.
    #[serde(default)]
    pub args: Vec<String>,
    /// Where the devnet's stdout goes.
    #[serde(default)]
    pub stdout: OutputSink,
    /// Where the devnet's stderr goes.
    #[serde(default)]
    pub stderr: OutputSink,
    /// How long to wait for the devnet to report ready.
    #[serde(default = "default_startup_timeout_ms")]
    pub startup_timeout_ms: u64,
}

impl Default for DevnetConfig {
    fn default() -> Self {
        Self {
            url: default_devnet_url(),
            command: default_devnet_command(),
            docker_tag: None,
            args: Vec::new(),
            stdout: OutputSink::default(),
            stderr: OutputSink::default(),
            startup_timeout_ms: default_startup_timeout_ms(),
        }
    }
}

fn default_devnet_url() -> String {
    "http://127.0.0.1:5050".to_string()
}

fn default_devnet_command() -> String {
    "starknet-devnet".to_string()
}

fn default_startup_timeout_ms() -> u64 {
    30_000
}

/// Destination of a supervised process's output stream.
///
/// Written in `cairn.toml` as `"ignore"`, `"STDOUT"`, `"STDERR"`, or a file path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum OutputSink {
    /// Discard the stream.
    #[default]
    Ignore,
    /// Forward to this process's stdout.
    Stdout,
    /// Forward to this process's stderr.
    Stderr,
    /// Append to a file.
    File(PathBuf),
}

impl From<String> for OutputSink {
    fn from(value: String) -> Self {
        match value.as_str() {
            "ignore" | "" => OutputSink::Ignore,
            "STDOUT" => OutputSink::Stdout,
            "STDERR" => OutputSink::Stderr,
            _ => OutputSink::File(PathBuf::from(value)),
        }
    }
}

/// The `[test]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestConfig {
    /// Command line run by `cairn test` when none is given on the CLI.
    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub command: Vec<String>,
}

/// Deserializes a field that can be either a single string or a list of strings.
///
/// Allows TOML config to accept both `sources = "contracts"` (string) and
/// `sources = ["contracts", "vendor"]` (array of strings).
fn deserialize_string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut vec = Vec::new();
            while let Some(val) = seq.next_element::<String>()? {
                vec.push(val);
            }
            Ok(vec)
        }
    }

    deserializer.deserialize_any(StringOrVec)
}
