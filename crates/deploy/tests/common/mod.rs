//! Shared test infrastructure: an in-process JSON-RPC node and fixtures.

#![allow(dead_code)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicU64, Ordering},
};

use alloy_core::primitives::{Bytes, keccak256};
use chainship_deploy::{
    ContractArtifact, Credentials, DeployError, NetworkProfile, RpcTransport, SignerSource,
    TransportError, rpc::Connector,
};
use serde_json::{Value, json};

/// Development key (account #0 of the default test mnemonic).
pub const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
/// Address of [`DEV_KEY`].
pub const DEV_ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";
/// CREATE address of [`DEV_ADDRESS`] at nonce 0.
pub const FIRST_CREATE_ADDRESS: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";

pub const MASTERCHEF_ARTIFACT: &str = r#"{
    "_format": "hh-sol-artifact-1",
    "contractName": "Masterchef",
    "sourceName": "contracts/Masterchef.sol",
    "abi": [
        {
            "type": "constructor",
            "stateMutability": "nonpayable",
            "inputs": [
                { "name": "initialOwner", "type": "address", "internalType": "address" },
                { "name": "_nativeToken", "type": "address", "internalType": "contract IERC20" },
                { "name": "_devAddress", "type": "address", "internalType": "address" },
                { "name": "_feeAddress", "type": "address", "internalType": "address" },
                { "name": "_nativeTokenPerBlock", "type": "uint256", "internalType": "uint256" },
                { "name": "_startBlock", "type": "uint256", "internalType": "uint256" }
            ]
        },
        {
            "type": "function",
            "name": "poolLength",
            "stateMutability": "view",
            "inputs": [],
            "outputs": [{ "name": "", "type": "uint256", "internalType": "uint256" }]
        }
    ],
    "bytecode": "0x608060405234801561001057600080fd5b50",
    "deployedBytecode": "0x6080604052"
}"#;

pub const ZAPPER_ARTIFACT: &str = r#"{
    "_format": "hh-sol-artifact-1",
    "contractName": "Zapper",
    "sourceName": "contracts/Zapper.sol",
    "abi": [
        {
            "type": "constructor",
            "stateMutability": "nonpayable",
            "inputs": [
                { "name": "_masterchef", "type": "address", "internalType": "address" },
                { "name": "_wrappedAsset", "type": "address", "internalType": "address" },
                { "name": "_router", "type": "address", "internalType": "address" }
            ]
        }
    ],
    "bytecode": "0x608060405234801561001057600080fd5b50",
    "deployedBytecode": "0x6080604052"
}"#;

pub fn masterchef_artifact() -> ContractArtifact {
    ContractArtifact::from_json(MASTERCHEF_ARTIFACT).unwrap()
}

pub fn zapper_artifact() -> ContractArtifact {
    ContractArtifact::from_json(ZAPPER_ARTIFACT).unwrap()
}

/// `testnetA` profile signing with `KEY_A`.
pub fn testnet_a() -> NetworkProfile {
    NetworkProfile::new(
        "testnetA",
        "https://rpc.example/a",
        SignerSource::Env("KEY_A".to_string()),
    )
    .unwrap()
}

pub fn credentials() -> Credentials {
    Credentials::default().with("KEY_A", DEV_KEY)
}

/// How the simulated node reacts to a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeBehavior {
    /// Include the transaction in the next block.
    ConfirmImmediately,
    /// Every request fails as if the endpoint were down.
    Unreachable,
    /// Accept the transaction but never include it.
    NeverConfirm,
    /// Include the transaction with a failed status.
    Revert,
    /// Reject `eth_sendRawTransaction` with the given message.
    RejectSubmission(&'static str),
}

/// Connector handing out [`ScriptedNode`] transports that share one call log.
#[derive(Debug, Clone)]
pub struct ScriptedConnector {
    pub behavior: NodeBehavior,
    pub chain_id: u64,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub head: Arc<AtomicU64>,
}

impl ScriptedConnector {
    pub fn new(behavior: NodeBehavior) -> Self {
        Self {
            behavior,
            chain_id: 599,
            calls: Arc::new(Mutex::new(Vec::new())),
            head: Arc::new(AtomicU64::new(100)),
        }
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    /// Methods called so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn count_of(&self, method: &str) -> usize {
        self.calls().iter().filter(|m| *m == method).count()
    }
}

impl Connector for ScriptedConnector {
    type Transport = ScriptedNode;

    fn connect(&self, _profile: &NetworkProfile) -> Result<ScriptedNode, DeployError> {
        Ok(ScriptedNode {
            config: self.clone(),
            included_at: Arc::new(Mutex::new(None)),
            last_tx: Arc::new(Mutex::new(None)),
        })
    }
}

/// Simulated JSON-RPC node.
#[derive(Debug)]
pub struct ScriptedNode {
    config: ScriptedConnector,
    included_at: Arc<Mutex<Option<u64>>>,
    last_tx: Arc<Mutex<Option<String>>>,
}

impl ScriptedNode {
    fn respond(&self, method: &str, params: &[Value]) -> Result<Value, TransportError> {
        match method {
            "eth_chainId" => Ok(json!(format!("0x{:x}", self.config.chain_id))),
            "eth_getTransactionCount" => Ok(json!("0x0")),
            "eth_gasPrice" => Ok(json!("0x3b9aca00")),
            "eth_estimateGas" => Ok(json!("0x1e8480")),
            "eth_blockNumber" => {
                let head = self.config.head.fetch_add(1, Ordering::SeqCst);
                Ok(json!(format!("0x{head:x}")))
            }
            "eth_sendRawTransaction" => {
                if let NodeBehavior::RejectSubmission(message) = self.config.behavior {
                    return Err(TransportError::Rpc {
                        code: -32000,
                        message: message.to_string(),
                    });
                }
                let raw: Bytes = serde_json::from_value(params[0].clone())
                    .map_err(|e| TransportError::Malformed(e.to_string()))?;
                let hash = json!(keccak256(&raw));
                *self.last_tx.lock().unwrap() = hash.as_str().map(str::to_string);
                Ok(hash)
            }
            "eth_getTransactionReceipt" => self.receipt(),
            other => Err(TransportError::Rpc {
                code: -32601,
                message: format!("method {other} not found"),
            }),
        }
    }

    fn receipt(&self) -> Result<Value, TransportError> {
        let Some(tx_hash) = self.last_tx.lock().unwrap().clone() else {
            return Ok(Value::Null);
        };

        let block = {
            let mut included_at = self.included_at.lock().unwrap();
            *included_at.get_or_insert_with(|| self.config.head.load(Ordering::SeqCst))
        };

        match self.config.behavior {
            NodeBehavior::NeverConfirm => Ok(Value::Null),
            NodeBehavior::Revert => Ok(json!({
                "transactionHash": tx_hash,
                "blockNumber": format!("0x{block:x}"),
                "contractAddress": null,
                "status": "0x0",
                "gasUsed": "0x5208",
            })),
            _ => Ok(json!({
                "transactionHash": tx_hash,
                "blockNumber": format!("0x{block:x}"),
                "contractAddress": FIRST_CREATE_ADDRESS,
                "status": "0x1",
                "gasUsed": "0x1a2b3c",
            })),
        }
    }
}

impl RpcTransport for ScriptedNode {
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, TransportError> {
        self.config.calls.lock().unwrap().push(method.to_string());

        if self.config.behavior == NodeBehavior::Unreachable {
            return Err(TransportError::Unreachable(
                "error sending request for url (https://rpc.example/a): connection refused"
                    .to_string(),
            ));
        }

        self.respond(method, &params)
    }
}
