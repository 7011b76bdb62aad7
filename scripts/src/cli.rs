//! Definitions of CLI arguments and commands for deploy scripts

use std::{env, path::PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::{
    commands::{deploy, export_abi},
    constants::{DEFAULT_ABI_DIR, DEFAULT_ARTIFACTS_DIR},
    errors::ScriptError,
    utils::{deployer_key_env_var, resolve_network_name, setup_client},
};

/// Management scripts for the Notional contract system
#[derive(Parser)]
pub struct Cli {
    /// Private key of the deployer, falling back to the per-network
    /// `<NETWORK>_DEPLOYER_PK` environment variable
    #[arg(short, long)]
    pub priv_key: Option<String>,

    /// Network RPC URL
    #[arg(short, long)]
    pub rpc_url: String,

    /// Name of the target network; fork and pinned-block aliases resolve to
    /// their canonical name
    #[arg(short, long)]
    pub network: String,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

/// The deploy-script commands
#[derive(Subcommand)]
pub enum Command {
    /// Deploy the Notional contract system
    Deploy(DeployArgs),
    /// Export the public contract ABIs
    ExportAbi(ExportAbiArgs),
}

/// Deploy the Notional contract system.
///
/// Runs the full deployment sequence: libraries, action contracts, the pause
/// router, the router, beacon implementations, and authorized callbacks.
/// Each step is idempotent against the per-network deployments file, so the
/// command can be re-run after a partial failure or a bytecode change.
#[derive(Args)]
pub struct DeployArgs {
    /// Directory containing compiled contract artifacts
    #[arg(short, long, default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts_dir: PathBuf,

    /// Directory holding the per-network deployments files
    #[arg(short, long, default_value = ".")]
    pub deployments_dir: PathBuf,

    /// Send real transactions instead of performing a dry run
    #[arg(long)]
    pub broadcast: bool,

    /// Skip the interactive broadcast confirmation
    #[arg(long, requires = "broadcast")]
    pub yes: bool,
}

/// Export the public contract ABIs as formatted JSON files
#[derive(Args)]
pub struct ExportAbiArgs {
    /// Directory containing compiled contract artifacts
    #[arg(short, long, default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts_dir: PathBuf,

    /// Directory to write the ABI files to
    #[arg(short, long, default_value = DEFAULT_ABI_DIR)]
    pub output_dir: PathBuf,
}

impl Cli {
    /// Runs the selected command
    pub async fn run(self) -> Result<(), ScriptError> {
        let network = resolve_network_name(&self.network);

        match self.command {
            Command::Deploy(args) => {
                let priv_key = match self.priv_key {
                    Some(key) => key,
                    None => {
                        let var = deployer_key_env_var(&network);
                        env::var(&var)
                            .map_err(|_| ScriptError::ClientInitialization(format!(
                                "no private key given and {} is unset",
                                var
                            )))?
                    }
                };

                let (deployer, client) = setup_client(&priv_key, &self.rpc_url).await?;
                info!("Deployer Address: {:#x}", deployer);

                deploy(args, client, &network).await
            }
            Command::ExportAbi(args) => export_abi(args),
        }
    }
}
