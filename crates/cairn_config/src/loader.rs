//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use std::path::Path;

/// Name of the project configuration file.
pub const CONFIG_FILE: &str = "cairn.toml";

/// Loads and validates a `cairn.toml` configuration from a project directory.
///
/// Reads `<project_dir>/cairn.toml`, parses it, and validates required fields.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE);
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `cairn.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and configuration values are consistent.
fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }
    if config.paths.sources.is_empty() || config.paths.sources.iter().any(String::is_empty) {
        return Err(ConfigError::ValidationError(
            "paths.sources must list at least one non-empty path".to_string(),
        ));
    }
    if config.paths.artifacts.is_empty() {
        return Err(ConfigError::MissingField("paths.artifacts".to_string()));
    }

    let devnet_url = url::Url::parse(&config.devnet.url).map_err(|e| {
        ConfigError::ValidationError(format!("devnet.url '{}': {e}", config.devnet.url))
    })?;
    if devnet_url.host_str().is_none() || devnet_url.port_or_known_default().is_none() {
        return Err(ConfigError::ValidationError(format!(
            "devnet.url '{}' must name a host and port",
            config.devnet.url
        )));
    }

    for (name, network) in &config.networks {
        if network.url.is_empty() {
            return Err(ConfigError::MissingField(format!("networks.{name}.url")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
[project]
name = "token"
version = "0.1.0"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.project.name, "token");
        assert_eq!(config.project.version, "0.1.0");
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[project]
name = "token"
version = "0.1.0"
description = "ERC20 on StarkNet"

[paths]
sources = ["contracts", "cairo1"]
artifacts = "build/artifacts"
cache = "build/cache"

[legacy]
compiler = "/venv/bin/starknet-compile-deprecated"
cairo_path = ["lib/cairo-contracts/src"]
disable_hint_validation = true

[sierra]
compiler_dir = "cairo/target/release"
replace_ids = true

[scarb]
command = "/usr/local/bin/scarb"
skip_validate = true

[network]
default = "integrated-devnet"

[networks.staging]
url = "https://staging.example.org"
chain_id = "SN_STAGING"

[devnet]
url = "http://127.0.0.1:5060"
docker_tag = "0.5.5"
args = ["--seed", "42"]
stderr = "STDERR"
startup_timeout_ms = 60000

[test]
command = "npx mocha"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.paths.sources.len(), 2);
        assert_eq!(config.paths.artifacts, "build/artifacts");
        assert_eq!(config.legacy.cairo_path, vec!["lib/cairo-contracts/src"]);
        assert!(config.legacy.disable_hint_validation);
        assert!(!config.legacy.account_contract);
        assert!(config.sierra.replace_ids);
        assert!(config.scarb.skip_validate);
        assert_eq!(
            config.network.default.as_deref(),
            Some("integrated-devnet")
        );
        assert!(config.networks.contains_key("staging"));
        assert_eq!(config.devnet.docker_tag.as_deref(), Some("0.5.5"));
        assert_eq!(config.devnet.args, vec!["--seed", "42"]);
        assert_eq!(config.devnet.startup_timeout_ms, 60_000);
        assert_eq!(config.test.command, vec!["npx mocha"]);
    }

    #[test]
    fn missing_name_errors() {
        let toml = r#"
[project]
name = ""
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn empty_sources_errors() {
        let toml = r#"
[project]
name = "token"

[paths]
sources = []
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn empty_artifacts_errors() {
        let toml = r#"
[project]
name = "token"

[paths]
artifacts = ""
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn bad_devnet_url_errors() {
        let toml = r#"
[project]
name = "token"

[devnet]
url = "not a url"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn network_without_url_errors() {
        let toml = r#"
[project]
name = "token"

[networks.broken]
url = ""
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(err.to_string().contains("networks.broken.url"));
    }

    #[test]
    fn invalid_toml_errors() {
        let toml = "this is not valid toml {{{}}}";
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn io_error_from_nonexistent_dir() {
        let err = load_config(Path::new("/nonexistent/dir")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
