//! chainship-deploy - Contract deployment library for EVM-compatible networks.
//!
//! This crate resolves named network profiles, encodes constructor arguments
//! against compiled artifacts, and submits contract-creation transactions,
//! waiting for them to be confirmed.

mod artifact;
pub use artifact::{ArtifactStore, ContractArtifact};

mod builder;
pub use builder::DeployerBuilder;

mod config;
pub use config::{CONFIG_FILENAME, ChainshipConfig, ENV_PREFIX, NetworkConfig};

mod deployer;
pub use deployer::{DeployOptions, Deployer, DeploymentRequest, DeploymentResult};

mod error;
pub use error::{DeployError, TransportError};

mod network;
pub use network::{
    DEFAULT_PRIVATE_KEY_ENV, DEFAULT_RPC_TIMEOUT, ExplorerConfig, NetworkProfile, NetworkRegistry,
    SignerSource,
};

pub mod rpc;
pub use rpc::{Connector, HttpConnector, HttpTransport, RpcTransport};

pub mod scripts;
pub use scripts::DeployScript;

mod signer;
pub use signer::{Credentials, resolve_signer_with};

pub mod tx;
