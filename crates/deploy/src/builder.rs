//! Builder module for creating a [`Deployer`].
//!
//! [`DeployerBuilder`] gathers the process-wide state a deployment needs (the
//! network registry, the artifact store, a snapshot of credentials and the
//! confirmation options) and freezes it into a [`Deployer`].
//!
//! # Example
//!
//! ```no_run
//! use chainship_deploy::{ChainshipConfig, DeployerBuilder, DeploymentRequest};
//!
//! # async fn example() -> Result<(), chainship_deploy::DeployError> {
//! let config = ChainshipConfig::load("Chainship.toml".as_ref())?;
//! let deployer = DeployerBuilder::from_config(&config)?.build();
//!
//! let result = deployer
//!     .deploy(DeploymentRequest::new("mantleTest", "Zapper").args([
//!         "0x0937F4F81f407E1bfACA1FDaA3fDE724d1e727c3",
//!         "0xd00ae08403B9bbb9124bB305C09058E32C39A48c",
//!         "0xd7f655E3376cE2D7A2b08fF01Eb3B1023191A901",
//!     ]))
//!     .await?;
//! println!("Contract deployed to {}", result.contract_address);
//! # Ok(())
//! # }
//! ```

use std::{path::PathBuf, sync::Arc, time::Duration};

use crate::{
    ArtifactStore, ChainshipConfig, Credentials, DeployError, DeployOptions, Deployer,
    HttpConnector, NetworkRegistry, rpc::Connector,
};

/// Builder for a [`Deployer`].
#[derive(Debug)]
pub struct DeployerBuilder<C = HttpConnector> {
    registry: NetworkRegistry,
    artifacts: ArtifactStore,
    credentials: Option<Credentials>,
    connector: C,
    options: DeployOptions,
}

impl Default for DeployerBuilder<HttpConnector> {
    fn default() -> Self {
        Self::new()
    }
}

impl DeployerBuilder<HttpConnector> {
    /// Create a new [`DeployerBuilder`] with an empty registry and HTTP transport.
    pub fn new() -> Self {
        Self {
            registry: NetworkRegistry::new(),
            artifacts: ArtifactStore::new(),
            credentials: None,
            connector: HttpConnector,
            options: DeployOptions::default(),
        }
    }

    /// Seed the builder from a loaded configuration: networks, artifacts
    /// directory and confirmation options.
    pub fn from_config(config: &ChainshipConfig) -> Result<Self, DeployError> {
        Ok(Self {
            registry: NetworkRegistry::from_config(config)?,
            artifacts: ArtifactStore::from_dir(&config.artifacts),
            options: DeployOptions::from(config),
            ..Self::new()
        })
    }
}

impl<C: Connector> DeployerBuilder<C> {
    /// Replace the network registry.
    pub fn registry(mut self, registry: NetworkRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the artifact store.
    pub fn artifacts(mut self, artifacts: ArtifactStore) -> Self {
        self.artifacts = artifacts;
        self
    }

    /// Read artifacts from a directory.
    pub fn artifacts_dir(self, path: impl Into<PathBuf>) -> Self {
        self.artifacts(ArtifactStore::from_dir(path))
    }

    /// Use these credentials instead of the process environment.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn confirmations(mut self, confirmations: u64) -> Self {
        self.options.confirmations = confirmations.max(1);
        self
    }

    pub fn confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.options.confirmation_timeout = timeout;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.options.poll_interval = interval;
        self
    }

    /// Swap the transport used to reach networks.
    pub fn connector<C2: Connector>(self, connector: C2) -> DeployerBuilder<C2> {
        DeployerBuilder {
            registry: self.registry,
            artifacts: self.artifacts,
            credentials: self.credentials,
            connector,
            options: self.options,
        }
    }

    /// Freeze the configuration. Credentials default to a snapshot of the
    /// process environment taken now.
    pub fn build(self) -> Deployer<C> {
        Deployer {
            registry: Arc::new(self.registry),
            artifacts: self.artifacts,
            credentials: self.credentials.unwrap_or_else(Credentials::from_env),
            connector: self.connector,
            options: self.options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = DeployerBuilder::new();
        assert!(builder.registry.is_empty());
        assert!(builder.credentials.is_none());
        assert_eq!(builder.options, DeployOptions::default());
        assert_eq!(builder.options.confirmations, 1);
        assert_eq!(builder.options.confirmation_timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_builder_with_options() {
        let deployer = DeployerBuilder::new()
            .confirmations(3)
            .confirmation_timeout(Duration::from_secs(5))
            .poll_interval(Duration::from_millis(50))
            .credentials(Credentials::default())
            .build();

        assert_eq!(deployer.options().confirmations, 3);
        assert_eq!(deployer.options().confirmation_timeout, Duration::from_secs(5));
        assert_eq!(deployer.options().poll_interval, Duration::from_millis(50));
    }

    #[test]
    fn test_builder_from_config() {
        let config = ChainshipConfig::from_toml_str(
            r#"
confirmations = 2

[networks.mantle]
url = "https://rpc.mantle.xyz"
accounts = { env = "PRIVATE_KEY" }
"#,
        )
        .unwrap();

        let deployer = DeployerBuilder::from_config(&config).unwrap().build();
        assert_eq!(deployer.options().confirmations, 2);
        assert!(deployer.registry().resolve("mantle").is_ok());
    }
}
