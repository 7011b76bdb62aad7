//! Implementations of the deploy and ABI-export commands

use std::{
    fs,
    io::{self, Write},
};

use alloy::providers::DynProvider;
use tracing::info;

use crate::{
    artifacts::load_artifact,
    cli::{DeployArgs, ExportAbiArgs},
    constants::{ABI_EXPORTS, CONFIRMATION_PHRASE},
    deployer::NotionalDeployer,
    errors::ScriptError,
    utils::{deployments_file_path, to_json_pretty},
};

/// Runs the full deployment sequence against the given network
pub(crate) async fn deploy(
    args: DeployArgs,
    client: DynProvider,
    network: &str,
) -> Result<(), ScriptError> {
    if args.broadcast && !args.yes {
        confirm_broadcast()?;
    }

    let dry_run = !args.broadcast;
    if dry_run {
        info!("dry run: no transactions will be sent");
    }

    let deployments_path = deployments_file_path(&args.deployments_dir, network);
    let mut deployer =
        NotionalDeployer::new(client, args.artifacts_dir, deployments_path, dry_run)?;

    deployer.deploy_libs().await?;
    deployer.deploy_actions().await?;
    deployer.deploy_pause_router().await?;
    deployer.deploy_router().await?;
    deployer.deploy_beacon_implementations().await?;
    deployer.deploy_authorized_callbacks().await?;

    Ok(())
}

/// Requires the operator to type the confirmation phrase before real
/// transactions are sent
fn confirm_broadcast() -> Result<(), ScriptError> {
    print!(
        "Will execute REAL transactions, are you sure (type '{}'): ",
        CONFIRMATION_PHRASE
    );
    io::stdout()
        .flush()
        .map_err(|e| ScriptError::Prompt(e.to_string()))?;

    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .map_err(|e| ScriptError::Prompt(e.to_string()))?;

    if line.trim() != CONFIRMATION_PHRASE {
        return Err(ScriptError::Aborted);
    }

    Ok(())
}

/// Exports the public contract ABIs as formatted JSON files
pub(crate) fn export_abi(args: ExportAbiArgs) -> Result<(), ScriptError> {
    fs::create_dir_all(&args.output_dir).map_err(|e| ScriptError::AbiExport(e.to_string()))?;

    for (artifact_name, export_name) in ABI_EXPORTS {
        let artifact = load_artifact(&args.artifacts_dir, artifact_name)?;
        let rendered =
            to_json_pretty(&artifact.abi).map_err(|e| ScriptError::AbiExport(e.to_string()))?;

        let path = args.output_dir.join(format!("{}.json", export_name));
        fs::write(&path, rendered).map_err(|e| ScriptError::AbiExport(e.to_string()))?;
        info!("exported {}", path.display());
    }

    Ok(())
}
