use std::{sync::Arc, time::Duration};

use alloy_core::primitives::{Address, B256};

use crate::{
    ArtifactStore, ChainshipConfig, Credentials, DeployError, HttpConnector, NetworkProfile,
    NetworkRegistry, TransportError,
    rpc::{Connector, EthClient, RpcTransport, TransactionReceipt},
    tx::CreationTx,
};

/// Timing of the confirmation wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOptions {
    /// Blocks, counting the inclusion block, before a deployment is confirmed.
    pub confirmations: u64,
    /// Upper bound on the wait after submission.
    pub confirmation_timeout: Duration,
    /// Delay between receipt polls.
    pub poll_interval: Duration,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self::from(&ChainshipConfig::default())
    }
}

impl From<&ChainshipConfig> for DeployOptions {
    fn from(config: &ChainshipConfig) -> Self {
        Self {
            confirmations: config.confirmations.max(1),
            confirmation_timeout: Duration::from_secs(config.confirmation_timeout_secs),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        }
    }
}

/// What to deploy, and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentRequest {
    /// Name of a registered network.
    pub network: String,
    /// Name of a compiled contract artifact.
    pub contract: String,
    /// Constructor arguments, in declaration order.
    pub args: Vec<String>,
}

impl DeploymentRequest {
    pub fn new(network: impl Into<String>, contract: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            contract: contract.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

/// Outcome of a confirmed deployment.
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentResult {
    pub contract_address: Address,
    pub transaction_hash: B256,
    pub network: Arc<NetworkProfile>,
    /// Address of the account that paid for the deployment.
    pub deployer: Address,
    pub block_number: u64,
    pub gas_used: Option<u64>,
}

impl DeploymentResult {
    /// Explorer page of the deployed contract, if the network has an explorer.
    pub fn explorer_url(&self) -> Option<String> {
        self.network
            .explorer
            .as_ref()
            .map(|explorer| explorer.address_url(self.contract_address))
    }
}

/// Deploys contracts to registered networks.
///
/// All validation (network, artifact, constructor arguments, credentials)
/// happens before the first RPC call.
#[derive(Debug)]
pub struct Deployer<C = HttpConnector> {
    pub(crate) registry: Arc<NetworkRegistry>,
    pub(crate) artifacts: ArtifactStore,
    pub(crate) credentials: Credentials,
    pub(crate) connector: C,
    pub(crate) options: DeployOptions,
}

impl<C: Connector> Deployer<C> {
    pub fn registry(&self) -> &NetworkRegistry {
        &self.registry
    }

    pub fn options(&self) -> &DeployOptions {
        &self.options
    }

    /// Deploy one contract and wait for it to be confirmed.
    pub async fn deploy(&self, request: DeploymentRequest) -> Result<DeploymentResult, DeployError> {
        let profile = self.registry.resolve(&request.network)?;
        let artifact = self.artifacts.get(&request.contract)?;
        let data = artifact.encode_deploy_data(&request.args)?;
        let signer = self.credentials.signer(&profile.signer)?;
        let deployer = signer.address();

        tracing::info!(
            network = %profile.name,
            contract = %request.contract,
            deployer = %deployer,
            args = ?request.args,
            "Deploying contract..."
        );

        let client = EthClient::new(self.connector.connect(&profile)?);
        let submission_failed = |source: TransportError| DeployError::SubmissionFailed {
            network: profile.name.clone(),
            source,
        };

        let chain_id = client.chain_id().await.map_err(submission_failed)?;
        if let Some(expected) = profile.chain_id {
            if expected != chain_id {
                return Err(DeployError::ChainIdMismatch {
                    network: profile.name.clone(),
                    expected,
                    actual: chain_id,
                });
            }
        }

        let nonce = client
            .pending_nonce(deployer)
            .await
            .map_err(submission_failed)?;

        let gas_price = match profile.gas_price {
            Some(price) => price,
            None => client.gas_price().await.map_err(submission_failed)?,
        };

        let gas_limit = match profile.gas_limit {
            Some(limit) => limit,
            None => {
                let estimate = client
                    .estimate_creation_gas(deployer, &data)
                    .await
                    .map_err(submission_failed)?;
                apply_gas_multiplier(estimate, profile.gas_multiplier)
            }
        };

        let tx = CreationTx {
            chain_id,
            nonce,
            gas_price,
            gas_limit,
            data,
        };
        let signed = tx.sign(&signer)?;

        tracing::debug!(
            chain_id,
            nonce,
            gas_price,
            gas_limit,
            expected_address = %signed.contract_address,
            "Submitting contract-creation transaction"
        );

        let tx_hash = client
            .send_raw_transaction(&signed.raw)
            .await
            .map_err(submission_failed)?;

        if tx_hash != signed.hash {
            tracing::warn!(
                returned = %tx_hash,
                computed = %signed.hash,
                "Node returned an unexpected transaction hash"
            );
        }

        tracing::info!(tx_hash = %tx_hash, "Deployment transaction sent, waiting for confirmation...");

        let receipt = self.wait_for_confirmation(&client, tx_hash).await?;

        if !receipt.succeeded() {
            return Err(DeployError::Reverted { tx_hash });
        }

        let contract_address = receipt.contract_address.ok_or_else(|| {
            submission_failed(TransportError::Malformed(format!(
                "receipt for {tx_hash} has no contractAddress"
            )))
        })?;

        if contract_address != signed.contract_address {
            tracing::warn!(
                reported = %contract_address,
                derived = %signed.contract_address,
                "Receipt contract address differs from the derived CREATE address"
            );
        }

        tracing::info!(
            network = %profile.name,
            contract = %request.contract,
            contract_address = %contract_address,
            "Contract deployed"
        );

        Ok(DeploymentResult {
            contract_address,
            transaction_hash: tx_hash,
            network: profile.clone(),
            deployer,
            block_number: receipt.block_number.unwrap_or_default(),
            gas_used: receipt.gas_used,
        })
    }

    /// Poll for the receipt until it is confirmed or the timeout elapses.
    async fn wait_for_confirmation<T: RpcTransport>(
        &self,
        client: &EthClient<T>,
        tx_hash: B256,
    ) -> Result<TransactionReceipt, DeployError> {
        let timeout = self.options.confirmation_timeout;

        tokio::time::timeout(timeout, async {
            loop {
                match self.poll_confirmation(client, tx_hash).await {
                    Ok(Some(receipt)) => return receipt,
                    Ok(None) => {
                        tracing::trace!(tx_hash = %tx_hash, "Transaction not confirmed yet");
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, tx_hash = %tx_hash, "Receipt poll failed, retrying...");
                    }
                }
                tokio::time::sleep(self.options.poll_interval).await;
            }
        })
        .await
        .map_err(|_| DeployError::ConfirmationTimeout {
            tx_hash,
            waited: timeout,
        })
    }

    async fn poll_confirmation<T: RpcTransport>(
        &self,
        client: &EthClient<T>,
        tx_hash: B256,
    ) -> Result<Option<TransactionReceipt>, TransportError> {
        let Some(receipt) = client.transaction_receipt(tx_hash).await? else {
            return Ok(None);
        };
        let Some(included_at) = receipt.block_number else {
            return Ok(None);
        };

        if self.options.confirmations <= 1 || !receipt.succeeded() {
            return Ok(Some(receipt));
        }

        let head = client.block_number().await?;
        let confirmations = head.saturating_sub(included_at) + 1;
        Ok((confirmations >= self.options.confirmations).then_some(receipt))
    }
}

fn apply_gas_multiplier(estimate: u64, multiplier: f64) -> u64 {
    if multiplier <= 1.0 {
        return estimate;
    }
    (estimate as f64 * multiplier).ceil() as u64
}
