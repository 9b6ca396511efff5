//! Configuration file loading.
//!
//! The configuration is read from a TOML file (`Chainship.toml` by default)
//! and can be overridden from the environment with `CHAINSHIP_`-prefixed
//! variables, nested keys separated by `__`
//! (e.g. `CHAINSHIP_CONFIRMATION_TIMEOUT_SECS=600`).

use std::{collections::BTreeMap, path::{Path, PathBuf}};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::{DeployError, ExplorerConfig, SignerSource};

/// The default name for the configuration file.
pub const CONFIG_FILENAME: &str = "Chainship.toml";

/// Prefix of environment variables overriding configuration values.
pub const ENV_PREFIX: &str = "CHAINSHIP_";

/// Configuration entry for one network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// RPC endpoint.
    pub url: String,
    /// Signer source. Required for every network.
    pub accounts: SignerSource,
    /// Expected chain id. Checked against the endpoint before submitting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    /// Block explorer used for verification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explorer: Option<ExplorerConfig>,
    /// Fixed gas price in wei.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<u64>,
    /// Fixed gas limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_multiplier: Option<f64>,
    /// HTTP request timeout in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainshipConfig {
    /// Directory holding compiled contract artifacts.
    pub artifacts: PathBuf,
    /// Number of blocks (including the inclusion block) before a deployment
    /// counts as confirmed.
    pub confirmations: u64,
    /// Upper bound on the wait for confirmation.
    pub confirmation_timeout_secs: u64,
    /// Interval between receipt polls.
    pub poll_interval_ms: u64,
    /// Networks keyed by name.
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkConfig>,
}

impl Default for ChainshipConfig {
    fn default() -> Self {
        Self {
            artifacts: PathBuf::from("artifacts"),
            confirmations: 1,
            confirmation_timeout_secs: 300,
            poll_interval_ms: 2000,
            networks: BTreeMap::new(),
        }
    }
}

impl ChainshipConfig {
    /// Load the configuration from a file, layered over defaults and under
    /// environment overrides.
    ///
    /// If `path` is a directory, [`CONFIG_FILENAME`] inside it is used. A
    /// missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, DeployError> {
        let config_path = if path.is_dir() {
            path.join(CONFIG_FILENAME)
        } else {
            path.to_path_buf()
        };

        if !config_path.exists() {
            tracing::warn!(path = %config_path.display(), "Configuration file not found, using defaults");
        }

        let config: Self = Self::figment()
            .merge(Toml::file(&config_path))
            .merge(env_provider())
            .extract()?;

        tracing::debug!(
            path = %config_path.display(),
            networks = config.networks.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Parse a configuration from a TOML string, layered over defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, DeployError> {
        Ok(Self::figment().merge(Toml::string(content)).extract()?)
    }

    fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
    }
}

fn env_provider() -> Env {
    // CLI-only variables share the prefix but are not configuration keys.
    Env::prefixed(ENV_PREFIX)
        .ignore(&["config", "verbosity", "network"])
        .split("__")
}
