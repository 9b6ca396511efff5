//! chainship is a CLI tool to deploy compiled contracts to EVM-compatible networks.

mod cli;

use std::time::Duration;

use anyhow::{Context, Result};
use chainship_deploy::{ChainshipConfig, DeployerBuilder, DeploymentRequest, NetworkRegistry};
use clap::Parser;
use comfy_table::{Table, presets::UTF8_FULL};

use cli::{Cli, Command, DeployOverrides};

#[tokio::main]
async fn main() -> Result<()> {
    // Secrets and CLI defaults may live in a local .env file.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Logs go to stderr so stdout only carries the deployed address.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .with_writer(std::io::stderr)
        .init();

    let config = ChainshipConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;

    match cli.command {
        Command::Deploy(args) => {
            let request = DeploymentRequest::new(args.network, args.contract).args(args.args);
            deploy(&config, request, &args.overrides).await
        }
        Command::Run(args) => {
            tracing::info!(script = %args.script, network = %args.network, "Running deployment script");
            deploy(&config, args.script.request(args.network), &args.overrides).await
        }
        Command::Networks => {
            let registry = NetworkRegistry::from_config(&config)?;
            println!("{}", networks_table(&registry));
            Ok(())
        }
    }
}

async fn deploy(
    config: &ChainshipConfig,
    request: DeploymentRequest,
    overrides: &DeployOverrides,
) -> Result<()> {
    let mut builder = DeployerBuilder::from_config(config)?;

    if let Some(artifacts) = &overrides.artifacts {
        builder = builder.artifacts_dir(artifacts);
    }
    if let Some(confirmations) = overrides.confirmations {
        builder = builder.confirmations(confirmations);
    }
    if let Some(timeout) = overrides.timeout {
        builder = builder.confirmation_timeout(Duration::from_secs(timeout));
    }

    let deployer = builder.build();

    let contract = request.contract.clone();
    let network = request.network.clone();
    let result = deployer
        .deploy(request)
        .await
        .with_context(|| format!("Failed to deploy {contract} to {network}"))?;

    println!("Contract deployed to {}", result.contract_address);

    if let Some(url) = result.explorer_url() {
        tracing::info!(explorer = %url, "View the contract on the block explorer");
    }

    Ok(())
}

fn networks_table(registry: &NetworkRegistry) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Network", "RPC URL", "Chain ID", "Signer", "Explorer"]);

    for profile in registry.iter() {
        table.add_row(vec![
            profile.name.clone(),
            profile.rpc_url.to_string(),
            profile
                .chain_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string()),
            profile.signer.env_var().to_string(),
            profile
                .explorer
                .as_ref()
                .map(|explorer| explorer.browser_url.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_networks_table_lists_profiles() {
        let config = ChainshipConfig::from_toml_str(
            r#"
[networks.mantle]
url = "https://rpc.mantle.xyz"
accounts = { env = "PRIVATE_KEY" }

[networks.metisGoerli]
url = "https://goerli.gateway.metisdevops.link"
accounts = { mnemonic = { env = "MNEMONIC" } }
chain_id = 599
"#,
        )
        .unwrap();
        let registry = NetworkRegistry::from_config(&config).unwrap();

        let rendered = networks_table(&registry).to_string();
        assert!(rendered.contains("mantle"));
        assert!(rendered.contains("https://goerli.gateway.metisdevops.link/"));
        assert!(rendered.contains("599"));
        assert!(rendered.contains("PRIVATE_KEY"));
        assert!(rendered.contains("MNEMONIC"));
    }
}
