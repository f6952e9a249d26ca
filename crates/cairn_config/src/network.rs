//! Network registry and name resolution.
//!
//! Test and run actions target one named network. The name comes from the
//! `--starknet-network` flag, else from `network.default` in `cairn.toml`,
//! else from the built-in fallback, and must match an entry of the registry
//! (built-in networks plus `[networks.<name>]` entries).

use std::collections::BTreeMap;
use std::fmt;

use crate::error::ConfigError;
use crate::types::ProjectConfig;

/// Name of the locally supervised devnet.
pub const INTEGRATED_DEVNET: &str = "integrated-devnet";

/// Network used when neither the CLI nor the config names one.
pub const DEFAULT_NETWORK: &str = "alpha-goerli";

/// A fully resolved network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Registry name.
    pub name: String,
    /// Base URL of the network endpoint.
    pub url: String,
    /// Chain identity.
    pub chain_id: String,
    /// Endpoint accepting contract verification uploads.
    pub verification_url: Option<String>,
    /// Base URL of the explorer page for verified contracts.
    pub verified_url: Option<String>,
}

impl NetworkConfig {
    /// Returns `true` for the devnet that Cairn starts and stops itself.
    pub fn is_integrated_devnet(&self) -> bool {
        self.name == INTEGRATED_DEVNET
    }
}

/// Which precedence level supplied a network name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkOrigin {
    /// The `--starknet-network` flag.
    CliFlag,
    /// `network.default` in `cairn.toml`.
    ConfigField,
    /// The built-in fallback.
    BuiltInDefault,
}

impl fmt::Display for NetworkOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkOrigin::CliFlag => f.write_str("--starknet-network flag"),
            NetworkOrigin::ConfigField => f.write_str("network.default in cairn.toml"),
            NetworkOrigin::BuiltInDefault => f.write_str("built-in default"),
        }
    }
}

/// All networks a name can resolve to.
#[derive(Debug, Clone, Default)]
pub struct NetworkRegistry {
    networks: BTreeMap<String, NetworkConfig>,
}

impl NetworkRegistry {
    /// Creates a registry holding only the built-in networks.
    pub fn builtin(devnet_url: &str) -> Self {
        let mut registry = Self::default();
        registry.insert(public_network(
            "alpha-goerli",
            "https://alpha4.starknet.io",
            "SN_GOERLI",
            "https://goerli.voyager.online",
        ));
        registry.insert(public_network(
            "alpha-goerli2",
            "https://alpha4-2.starknet.io",
            "SN_GOERLI2",
            "https://goerli-2.voyager.online",
        ));
        registry.insert(public_network(
            "alpha-mainnet",
            "https://alpha-mainnet.starknet.io",
            "SN_MAIN",
            "https://voyager.online",
        ));
        registry.insert(NetworkConfig {
            name: INTEGRATED_DEVNET.to_string(),
            url: devnet_url.to_string(),
            chain_id: "SN_GOERLI".to_string(),
            verification_url: None,
            verified_url: None,
        });
        registry
    }

    /// Creates a registry of the built-in networks overlaid with the
    /// project's `[networks.<name>]` entries.
    pub fn from_config(config: &ProjectConfig) -> Self {
        let mut registry = Self::builtin(&config.devnet.url);
        for (name, def) in &config.networks {
            let chain_id = def
                .chain_id
                .clone()
                .or_else(|| registry.get(name).map(|n| n.chain_id.clone()))
                .unwrap_or_else(|| "SN_GOERLI".to_string());
            registry.insert(NetworkConfig {
                name: name.clone(),
                url: def.url.clone(),
                chain_id,
                verification_url: def.verification_url.clone(),
                verified_url: def.verified_url.clone(),
            });
        }
        registry
    }

    /// Adds a network, replacing any entry with the same name.
    pub fn insert(&mut self, network: NetworkConfig) {
        self.networks.insert(network.name.clone(), network);
    }

    /// Looks up a network by name.
    pub fn get(&self, name: &str) -> Option<&NetworkConfig> {
        self.networks.get(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.networks.keys().map(String::as_str)
    }

    /// Resolves a network name by precedence: explicit > configured > fallback.
    ///
    /// Fails with [`ConfigError::UnknownNetwork`] naming the origin of the
    /// chosen name if the registry has no entry for it. A lower-precedence
    /// name is never consulted once a higher one is present, even if the
    /// higher one is unknown.
    pub fn resolve(
        &self,
        explicit: Option<&str>,
        configured: Option<&str>,
        fallback: &str,
    ) -> Result<NetworkConfig, ConfigError> {
        let (name, origin) = match (explicit, configured) {
            (Some(name), _) => (name, NetworkOrigin::CliFlag),
            (None, Some(name)) => (name, NetworkOrigin::ConfigField),
            (None, None) => (fallback, NetworkOrigin::BuiltInDefault),
        };

        self.get(name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownNetwork {
                name: name.to_string(),
                origin,
                known: self.names().collect::<Vec<_>>().join(", "),
            })
    }
}

/// Resolves the network a test/run action targets.
///
/// Combines the project's registry and `network.default` with the optional
/// CLI flag, falling back to [`DEFAULT_NETWORK`].
pub fn resolve_network(
    config: &ProjectConfig,
    cli_network: Option<&str>,
) -> Result<NetworkConfig, ConfigError> {
    NetworkRegistry::from_config(config).resolve(
        cli_network,
        config.network.default.as_deref(),
        DEFAULT_NETWORK,
    )
}

fn public_network(name: &str, url: &str, chain_id: &str, explorer: &str) -> NetworkConfig {
    NetworkConfig {
        name: name.to_string(),
        url: url.to_string(),
        chain_id: chain_id.to_string(),
        verification_url: Some(format!("{explorer}/api/contract/")),
        verified_url: Some(format!("{explorer}/contract/")),
    }
}
