//! JSON-RPC plumbing for talking to Ethereum-compatible endpoints.
//!
//! The [`RpcTransport`] trait is the seam between the deployment flow and the
//! network: [`HttpTransport`] speaks JSON-RPC 2.0 over HTTP, tests substitute
//! an in-process implementation.

use std::{future::Future, time::Duration};

use alloy_core::primitives::{Address, B256, Bytes};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use url::Url;

use crate::{DeployError, NetworkProfile, TransportError};

/// A JSON-RPC request/response channel to one endpoint.
pub trait RpcTransport: Send + Sync {
    /// Send a request and return the raw `result` value.
    fn request(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> impl Future<Output = Result<Value, TransportError>> + Send;
}

/// Builds a transport bound to a network profile.
pub trait Connector: Send + Sync {
    type Transport: RpcTransport;

    fn connect(&self, profile: &NetworkProfile) -> Result<Self::Transport, DeployError>;
}

/// Connects over HTTP using the profile's RPC URL and timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpConnector;

impl Connector for HttpConnector {
    type Transport = HttpTransport;

    fn connect(&self, profile: &NetworkProfile) -> Result<HttpTransport, DeployError> {
        HttpTransport::new(profile.rpc_url.clone(), profile.timeout).map_err(|source| {
            DeployError::SubmissionFailed {
                network: profile.name.clone(),
                source,
            }
        })
    }
}

/// JSON-RPC 2.0 over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: Url,
}

impl HttpTransport {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Unreachable(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client, url })
    }
}

impl RpcTransport for HttpTransport {
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, TransportError> {
        let response = self
            .client
            .post(self.url.clone())
            .json(&serde_json::json!({
                "jsonrpc": "2.0",
                "method": method,
                "params": params,
                "id": 1
            }))
            .send()
            .await
            .map_err(|e| TransportError::Unreachable(error_chain(&e)))?;

        let status = response.status();
        let body: Value = response.json().await.map_err(|e| {
            TransportError::Malformed(format!("{method} response (HTTP {status}): {e}"))
        })?;

        parse_response(method, body)
    }
}

/// Extract the `result` of a JSON-RPC response body, surfacing `error` objects.
pub fn parse_response(method: &str, mut body: Value) -> Result<Value, TransportError> {
    if let Some(error) = body.get("error") {
        return Err(TransportError::Rpc {
            code: error.get("code").and_then(Value::as_i64).unwrap_or_default(),
            message: error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string(),
        });
    }

    body.get_mut("result")
        .map(Value::take)
        .ok_or_else(|| TransportError::Malformed(format!("no result in {method} response")))
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Make a call and deserialize its result.
pub async fn call<T, R>(transport: &T, method: &str, params: Vec<Value>) -> Result<R, TransportError>
where
    T: RpcTransport,
    R: DeserializeOwned,
{
    let value = transport.request(method, params).await?;
    serde_json::from_value(value)
        .map_err(|e| TransportError::Malformed(format!("failed to deserialize {method} result: {e}")))
}

/// Parse a hex quantity (`0x`-prefixed, no leading zeros required).
pub fn parse_quantity(raw: &str) -> Result<u128, TransportError> {
    let digits = raw
        .strip_prefix("0x")
        .ok_or_else(|| TransportError::Malformed(format!("quantity '{raw}' is not 0x-prefixed")))?;
    if digits.is_empty() {
        return Ok(0);
    }
    u128::from_str_radix(digits, 16)
        .map_err(|e| TransportError::Malformed(format!("invalid quantity '{raw}': {e}")))
}

fn quantity_u64(raw: &str) -> Result<u64, TransportError> {
    let value = parse_quantity(raw)?;
    u64::try_from(value)
        .map_err(|_| TransportError::Malformed(format!("quantity '{raw}' overflows u64")))
}

fn deserialize_opt_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Deserialize::deserialize(deserializer)?;
    raw.map(|s| quantity_u64(&s).map_err(serde::de::Error::custom))
        .transpose()
}

/// The subset of a transaction receipt needed to finish a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    #[serde(default, deserialize_with = "deserialize_opt_u64")]
    pub block_number: Option<u64>,
    #[serde(default)]
    pub contract_address: Option<Address>,
    /// `Some(1)` on success, `Some(0)` on revert. Absent on pre-Byzantium chains.
    #[serde(default, deserialize_with = "deserialize_opt_u64")]
    pub status: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_opt_u64")]
    pub gas_used: Option<u64>,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        self.status != Some(0)
    }
}

/// Typed wrapper over the handful of `eth_` methods a deployment needs.
#[derive(Debug)]
pub struct EthClient<T> {
    transport: T,
}

impl<T: RpcTransport> EthClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub async fn chain_id(&self) -> Result<u64, TransportError> {
        let raw: String = call(&self.transport, "eth_chainId", vec![]).await?;
        quantity_u64(&raw)
    }

    /// Nonce including pending transactions.
    pub async fn pending_nonce(&self, address: Address) -> Result<u64, TransportError> {
        let raw: String = call(
            &self.transport,
            "eth_getTransactionCount",
            vec![serde_json::json!(address), serde_json::json!("pending")],
        )
        .await?;
        quantity_u64(&raw)
    }

    pub async fn gas_price(&self) -> Result<u128, TransportError> {
        let raw: String = call(&self.transport, "eth_gasPrice", vec![]).await?;
        parse_quantity(&raw)
    }

    /// Estimate gas for a contract-creation transaction.
    pub async fn estimate_creation_gas(
        &self,
        from: Address,
        data: &Bytes,
    ) -> Result<u64, TransportError> {
        let raw: String = call(
            &self.transport,
            "eth_estimateGas",
            vec![serde_json::json!({
                "from": from,
                "data": data,
                "value": "0x0",
            })],
        )
        .await?;
        quantity_u64(&raw)
    }

    pub async fn send_raw_transaction(&self, raw_tx: &Bytes) -> Result<B256, TransportError> {
        call(
            &self.transport,
            "eth_sendRawTransaction",
            vec![serde_json::json!(raw_tx)],
        )
        .await
    }

    /// `None` while the transaction is still pending.
    pub async fn transaction_receipt(
        &self,
        tx_hash: B256,
    ) -> Result<Option<TransactionReceipt>, TransportError> {
        call(
            &self.transport,
            "eth_getTransactionReceipt",
            vec![serde_json::json!(tx_hash)],
        )
        .await
    }

    pub async fn block_number(&self) -> Result<u64, TransportError> {
        let raw: String = call(&self.transport, "eth_blockNumber", vec![]).await?;
        quantity_u64(&raw)
    }
}
