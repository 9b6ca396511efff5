//! Canned deployments.
//!
//! Each script pins a contract and its constructor arguments, so deploying
//! it only needs a target network.

use crate::DeploymentRequest;

/// Owner, dev and fee address of the Masterchef deployment.
pub const MASTERCHEF_OWNER: &str = "0xFc931A1246024068b3b398bD0B546d36151530D2";
/// Reward token distributed by the Masterchef.
pub const MASTERCHEF_NATIVE_TOKEN: &str = "0x63CB893bA22e3017A23C41d8388dFFdF984cd8bc";
/// Rewards per block, in wei (2 tokens with 18 decimals).
pub const MASTERCHEF_REWARDS_PER_BLOCK: &str = "2000000000000000000";
pub const MASTERCHEF_START_BLOCK: &str = "1";

/// Masterchef the Zapper stakes into.
pub const ZAPPER_MASTERCHEF: &str = "0x0937F4F81f407E1bfACA1FDaA3fDE724d1e727c3";
/// Wrapped native asset.
pub const ZAPPER_WRAPPED_ASSET: &str = "0xd00ae08403B9bbb9124bB305C09058E32C39A48c";
/// DEX router used for swaps and liquidity.
pub const ZAPPER_ROUTER: &str = "0xd7f655E3376cE2D7A2b08fF01Eb3B1023191A901";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum DeployScript {
    Masterchef,
    Zapper,
}

impl DeployScript {
    /// Name of the compiled contract this script deploys.
    pub fn contract(&self) -> &'static str {
        match self {
            DeployScript::Masterchef => "Masterchef",
            DeployScript::Zapper => "Zapper",
        }
    }

    /// Constructor arguments, in declaration order.
    pub fn args(&self) -> Vec<&'static str> {
        match self {
            DeployScript::Masterchef => vec![
                MASTERCHEF_OWNER,
                MASTERCHEF_NATIVE_TOKEN,
                MASTERCHEF_OWNER,
                MASTERCHEF_OWNER,
                MASTERCHEF_REWARDS_PER_BLOCK,
                MASTERCHEF_START_BLOCK,
            ],
            DeployScript::Zapper => vec![ZAPPER_MASTERCHEF, ZAPPER_WRAPPED_ASSET, ZAPPER_ROUTER],
        }
    }

    /// Build the deployment request for `network`.
    pub fn request(&self, network: impl Into<String>) -> DeploymentRequest {
        DeploymentRequest::new(network, self.contract()).args(self.args())
    }
}
