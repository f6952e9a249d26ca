//! Parsing and validation of `cairn.toml` project configuration files.
//!
//! This crate reads the project configuration file into a strongly-typed
//! [`ProjectConfig`] and resolves the network a test or run action targets.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod network;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE};
pub use network::{
    resolve_network, NetworkConfig, NetworkOrigin, NetworkRegistry, DEFAULT_NETWORK,
    INTEGRATED_DEVNET,
};
pub use types::*;
