//! Contract-creation transactions.
//!
//! Deployments are sent as EIP-155 legacy transactions, which every
//! EVM-compatible chain we target accepts.

use alloy_core::{
    primitives::{Address, B256, Bytes, U256, keccak256},
    rlp::{Encodable, Header},
};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;

use crate::DeployError;

/// An unsigned contract-creation transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationTx {
    pub chain_id: u64,
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
    /// Creation code followed by the encoded constructor arguments.
    pub data: Bytes,
}

/// A signed transaction ready for `eth_sendRawTransaction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedCreationTx {
    pub raw: Bytes,
    pub hash: B256,
    /// Address the contract will be created at.
    pub contract_address: Address,
}

impl CreationTx {
    /// RLP payload signed over, per EIP-155.
    pub fn signing_payload(&self) -> Vec<u8> {
        let chain_id = U256::from(self.chain_id);
        let zero = U256::ZERO;
        let mut out = Vec::new();
        self.encode_list(&[&chain_id, &zero, &zero], &mut out);
        out
    }

    pub fn signing_hash(&self) -> B256 {
        keccak256(self.signing_payload())
    }

    /// Sign with `signer` and RLP-encode the result.
    pub fn sign(&self, signer: &PrivateKeySigner) -> Result<SignedCreationTx, DeployError> {
        let signature = signer
            .sign_hash_sync(&self.signing_hash())
            .map_err(|e| DeployError::InvalidCredential {
                var: "<signer>".to_string(),
                reason: format!("failed to sign transaction: {e}"),
            })?;

        let v = U256::from(self.chain_id) * U256::from(2) + U256::from(35 + u64::from(signature.v()));
        let r = signature.r();
        let s = signature.s();

        let mut out = Vec::new();
        self.encode_list(&[&v, &r, &s], &mut out);

        Ok(SignedCreationTx {
            hash: keccak256(&out),
            raw: Bytes::from(out),
            contract_address: signer.address().create(self.nonce),
        })
    }

    /// `[nonce, gasPrice, gasLimit, to, value, data, ...tail]` with an empty `to`.
    fn encode_list(&self, tail: &[&U256], out: &mut Vec<u8>) {
        let to: &[u8] = &[];
        let value = U256::ZERO;

        let payload_length = self.nonce.length()
            + self.gas_price.length()
            + self.gas_limit.length()
            + to.length()
            + value.length()
            + self.data.length()
            + tail.iter().map(|field| field.length()).sum::<usize>();

        Header {
            list: true,
            payload_length,
        }
        .encode(out);
        self.nonce.encode(out);
        self.gas_price.encode(out);
        self.gas_limit.encode(out);
        to.encode(out);
        value.encode(out);
        self.data.encode(out);
        for field in tail {
            field.encode(out);
        }
    }
}
