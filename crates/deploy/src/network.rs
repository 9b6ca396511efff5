//! Network profiles and the registry that holds them.
//!
//! A [`NetworkProfile`] describes how to reach and authenticate against one
//! chain. Profiles are registered once at startup into a [`NetworkRegistry`]
//! and shared read-only afterwards.

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use alloy_core::primitives::Address;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{ChainshipConfig, DeployError, NetworkConfig};

/// Default environment variable holding the deployer private key.
pub const DEFAULT_PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";

/// Default HTTP request timeout towards an RPC endpoint.
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(20);

/// Where the deployer's signing key comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignerSource {
    /// A hex-encoded private key stored in the named environment variable.
    Env(String),
    /// A BIP-39 phrase stored in the named environment variable, derived at
    /// `m/44'/60'/0'/0/{index}`.
    Mnemonic {
        env: String,
        #[serde(default)]
        index: u32,
    },
}

impl Default for SignerSource {
    fn default() -> Self {
        SignerSource::Env(DEFAULT_PRIVATE_KEY_ENV.to_string())
    }
}

impl SignerSource {
    /// The environment variable this source reads.
    pub fn env_var(&self) -> &str {
        match self {
            SignerSource::Env(var) => var,
            SignerSource::Mnemonic { env, .. } => env,
        }
    }
}

/// Block explorer endpoints used for contract verification.
///
/// Both URLs are mandatory: an explorer is either fully described or absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerConfig {
    /// Etherscan-compatible API endpoint.
    pub api_url: Url,
    /// Human-facing explorer root.
    pub browser_url: Url,
    /// API key. Some explorers accept any placeholder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl ExplorerConfig {
    /// Link to a contract page on the explorer.
    pub fn address_url(&self, address: Address) -> String {
        format!(
            "{}/address/{}",
            self.browser_url.as_str().trim_end_matches('/'),
            address
        )
    }
}

/// Everything needed to deploy to one named network.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkProfile {
    pub name: String,
    pub rpc_url: Url,
    pub signer: SignerSource,
    pub chain_id: Option<u64>,
    pub explorer: Option<ExplorerConfig>,
    /// Fixed gas price in wei. Queried from the node when unset.
    pub gas_price: Option<u128>,
    /// Fixed gas limit. Estimated by the node when unset.
    pub gas_limit: Option<u64>,
    /// Factor applied to the node's gas estimate.
    pub gas_multiplier: f64,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
}

impl NetworkProfile {
    /// Create a profile with default gas settings.
    ///
    /// Fails with [`DeployError::InvalidProfile`] if the name is empty or the
    /// URL is not an absolute `http(s)` URL.
    pub fn new(
        name: impl Into<String>,
        rpc_url: &str,
        signer: SignerSource,
    ) -> Result<Self, DeployError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DeployError::InvalidProfile {
                network: name,
                reason: "network name must not be empty".to_string(),
            });
        }
        let rpc_url = parse_rpc_url(&name, rpc_url)?;

        Ok(Self {
            name,
            rpc_url,
            signer,
            chain_id: None,
            explorer: None,
            gas_price: None,
            gas_limit: None,
            gas_multiplier: 1.0,
            timeout: DEFAULT_RPC_TIMEOUT,
        })
    }

    /// Build a profile from its configuration entry.
    pub fn from_config(name: &str, config: &NetworkConfig) -> Result<Self, DeployError> {
        let mut profile = Self::new(name, &config.url, config.accounts.clone())?;
        profile.chain_id = config.chain_id;
        profile.explorer = config.explorer.clone();
        profile.gas_price = config.gas_price.map(u128::from);
        profile.gas_limit = config.gas;

        if let Some(multiplier) = config.gas_multiplier {
            if !multiplier.is_finite() || multiplier < 1.0 {
                return Err(DeployError::InvalidProfile {
                    network: name.to_string(),
                    reason: format!("gas_multiplier must be >= 1.0, got {multiplier}"),
                });
            }
            profile.gas_multiplier = multiplier;
        }
        if let Some(timeout_ms) = config.timeout_ms {
            profile.timeout = Duration::from_millis(timeout_ms);
        }

        Ok(profile)
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn with_explorer(mut self, explorer: ExplorerConfig) -> Self {
        self.explorer = Some(explorer);
        self
    }
}

fn parse_rpc_url(network: &str, raw: &str) -> Result<Url, DeployError> {
    // url strips surrounding whitespace and control characters on its own.
    let url = Url::parse(raw).map_err(|e| DeployError::InvalidProfile {
        network: network.to_string(),
        reason: format!("invalid RPC URL '{}': {}", raw.trim(), e),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(DeployError::InvalidProfile {
            network: network.to_string(),
            reason: format!("unsupported RPC URL scheme '{other}'"),
        }),
    }
}

/// In-memory registry of network profiles, keyed by name.
#[derive(Debug, Default)]
pub struct NetworkRegistry {
    profiles: BTreeMap<String, Arc<NetworkProfile>>,
}

impl NetworkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from every network declared in the configuration.
    pub fn from_config(config: &ChainshipConfig) -> Result<Self, DeployError> {
        let mut registry = Self::new();
        for (name, network) in &config.networks {
            registry.register(NetworkProfile::from_config(name, network)?)?;
        }
        tracing::debug!(networks = registry.len(), "Network registry loaded");
        Ok(registry)
    }

    /// Register a profile. An existing entry with the same name is kept as is.
    pub fn register(&mut self, profile: NetworkProfile) -> Result<(), DeployError> {
        if self.profiles.contains_key(&profile.name) {
            return Err(DeployError::DuplicateNetwork(profile.name));
        }
        self.profiles
            .insert(profile.name.clone(), Arc::new(profile));
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<NetworkProfile>, DeployError> {
        self.profiles
            .get(name)
            .cloned()
            .ok_or_else(|| DeployError::UnknownNetwork(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NetworkProfile> {
        self.profiles.values().map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
