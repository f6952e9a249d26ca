//! Error types for configuration loading, validation, and network resolution.

use crate::network::NetworkOrigin;

/// Errors that can occur when loading a `cairn.toml` or resolving a network.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A required field is missing from the configuration.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A configuration value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// The selected network name has no registry entry.
    #[error("unknown network '{name}' (from {origin}); known networks: {known}")]
    UnknownNetwork {
        /// The unresolvable name.
        name: String,
        /// Which precedence level supplied the name.
        origin: NetworkOrigin,
        /// Comma-separated list of registered names.
        known: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_missing_field() {
        let err = ConfigError::MissingField("project.name".to_string());
        assert_eq!(format!("{err}"), "missing required field: project.name");
    }

    #[test]
    fn display_parse_error() {
        let err = ConfigError::ParseError("expected '=' at line 3".to_string());
        assert_eq!(
            format!("{err}"),
            "failed to parse configuration: expected '=' at line 3"
        );
    }

    #[test]
    fn display_validation_error() {
        let err = ConfigError::ValidationError("paths.artifacts is empty".to_string());
        assert_eq!(
            format!("{err}"),
            "validation error: paths.artifacts is empty"
        );
    }

    #[test]
    fn display_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = ConfigError::IoError(io_err);
        assert!(format!("{err}").starts_with("failed to read configuration:"));
    }

    #[test]
    fn display_unknown_network_names_origin() {
        let err = ConfigError::UnknownNetwork {
            name: "alpha-sepolia".to_string(),
            origin: NetworkOrigin::CliFlag,
            known: "alpha-goerli, integrated-devnet".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'alpha-sepolia'"));
        assert!(msg.contains("--starknet-network"));
        assert!(msg.contains("integrated-devnet"));
    }
}
