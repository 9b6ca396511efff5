//! Error types for network resolution and contract deployment.

use std::time::Duration;

use alloy_core::primitives::B256;
use thiserror::Error;

/// Failures surfaced by the RPC transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The endpoint could not be reached (DNS, connect, timeout).
    #[error("endpoint unreachable: {0}")]
    Unreachable(String),

    /// The node answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The node answered with something that is not a valid JSON-RPC response.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Errors produced while resolving networks or deploying contracts.
///
/// Every variant terminates the run; nothing is retried locally.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("unknown network '{0}'")]
    UnknownNetwork(String),

    #[error("network '{0}' is already registered")]
    DuplicateNetwork(String),

    #[error("invalid profile for network '{network}': {reason}")]
    InvalidProfile { network: String, reason: String },

    #[error("no compiled artifact found for contract '{0}'")]
    UnknownContract(String),

    #[error("invalid artifact for contract '{contract}': {reason}")]
    InvalidArtifact { contract: String, reason: String },

    #[error("constructor arguments do not match '{contract}': {reason}")]
    ArgumentMismatch { contract: String, reason: String },

    #[error("missing credential: environment variable '{0}' is not set")]
    MissingCredential(String),

    #[error("invalid credential in '{var}': {reason}")]
    InvalidCredential { var: String, reason: String },

    #[error("network '{network}' expects chain id {expected}, but the endpoint reports {actual}")]
    ChainIdMismatch {
        network: String,
        expected: u64,
        actual: u64,
    },

    #[error("deployment submission to '{network}' failed: {source}")]
    SubmissionFailed {
        network: String,
        #[source]
        source: TransportError,
    },

    #[error("transaction {tx_hash} was not confirmed within {waited:?}")]
    ConfirmationTimeout { tx_hash: B256, waited: Duration },

    #[error("deployment transaction {tx_hash} reverted")]
    Reverted { tx_hash: B256 },

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<figment::Error> for DeployError {
    fn from(err: figment::Error) -> Self {
        DeployError::Config(err.to_string())
    }
}
