use std::path::PathBuf;

use chainship_deploy::{CONFIG_FILENAME, DeployScript};
use clap::{Args, Parser, Subcommand};
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "chainship")]
#[command(
    author,
    version,
    about = "Deploy compiled contracts to EVM-compatible networks"
)]
pub struct Cli {
    /// The verbosity level.
    #[arg(short, long, global = true, env = "CHAINSHIP_VERBOSITY", default_value_t = LevelFilter::INFO)]
    pub verbosity: LevelFilter,

    /// Path to the configuration file, or a directory containing Chainship.toml.
    #[arg(long, alias = "conf", global = true, env = "CHAINSHIP_CONFIG", default_value = CONFIG_FILENAME)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Deploy a compiled contract with the given constructor arguments.
    Deploy(DeployArgs),

    /// Run a predefined deployment script (masterchef, zapper).
    Run(RunArgs),

    /// List the configured networks.
    Networks,
}

#[derive(Debug, Args)]
pub struct DeployArgs {
    /// The name of the target network.
    #[arg(short, long, env = "CHAINSHIP_NETWORK")]
    pub network: String,

    /// The name of the compiled contract.
    #[arg(short, long)]
    pub contract: String,

    /// Constructor arguments, in declaration order.
    #[arg(allow_negative_numbers = true)]
    pub args: Vec<String>,

    #[clap(flatten)]
    pub overrides: DeployOverrides,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// The script to run.
    pub script: DeployScript,

    /// The name of the target network.
    #[arg(short, long, env = "CHAINSHIP_NETWORK")]
    pub network: String,

    #[clap(flatten)]
    pub overrides: DeployOverrides,
}

/// Per-run overrides of configuration values.
#[derive(Debug, Clone, Args)]
pub struct DeployOverrides {
    /// Directory holding compiled contract artifacts.
    #[arg(long)]
    pub artifacts: Option<PathBuf>,

    /// Number of confirmations to wait for.
    #[arg(long)]
    pub confirmations: Option<u64>,

    /// Maximum time to wait for confirmation, in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,
}
