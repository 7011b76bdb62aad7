//! The Notional system deployer.
//!
//! Deployment is a fixed sequence: libraries, then the action contracts that
//! link them, then the pause router, the router, the beacon implementations,
//! and finally the authorized callbacks. Every deployed address is recorded
//! in the per-network deployments file along with the hash of the init code
//! it shipped with, so a re-run only touches contracts whose bytecode
//! changed.

use std::path::PathBuf;

use alloy::{
    network::TransactionBuilder, providers::DynProvider, providers::Provider,
    rpc::types::TransactionRequest,
};
use alloy_primitives::{keccak256, Address, Bytes};
use tracing::{info, warn};

use crate::{
    artifacts::load_artifact,
    constants::{
        ACTION_CONTRACTS, AUTHORIZED_CALLBACKS, BEACON_IMPLEMENTATIONS, LIBRARY_CONTRACTS,
        NOTIONAL_PROXY_KEY, PAUSE_ROUTER_CONSTRUCTOR, PAUSE_ROUTER_CONTRACT, ROUTER_CONSTRUCTOR,
        ROUTER_CONTRACT,
    },
    errors::ScriptError,
    utils::DeploymentsFile,
};

/// Deploys the Notional contract system step by step
pub struct NotionalDeployer {
    /// The RPC client transactions are sent through
    client: DynProvider,
    /// The directory compiled artifacts are loaded from
    artifacts_dir: PathBuf,
    /// The path of the per-network deployments file
    deployments_path: PathBuf,
    /// The recorded deployment state, updated as contracts land
    deployments: DeploymentsFile,
    /// Whether to log intended transactions instead of sending them
    dry_run: bool,
}

impl NotionalDeployer {
    /// Creates a deployer over the recorded deployment state at
    /// `deployments_path`
    pub fn new(
        client: DynProvider,
        artifacts_dir: PathBuf,
        deployments_path: PathBuf,
        dry_run: bool,
    ) -> Result<Self, ScriptError> {
        let deployments = DeploymentsFile::load(&deployments_path)?;

        Ok(Self {
            client,
            artifacts_dir,
            deployments_path,
            deployments,
            dry_run,
        })
    }

    /// Deploys the external library contracts
    pub async fn deploy_libs(&mut self) -> Result<(), ScriptError> {
        for name in LIBRARY_CONTRACTS {
            self.deploy_contract(name, Vec::new()).await?;
        }

        Ok(())
    }

    /// Deploys the action contracts, linking them against the recorded
    /// library addresses
    pub async fn deploy_actions(&mut self) -> Result<(), ScriptError> {
        for name in ACTION_CONTRACTS {
            self.deploy_contract(name, Vec::new()).await?;
        }

        Ok(())
    }

    /// Deploys the pause router against the recorded action addresses
    pub async fn deploy_pause_router(&mut self) -> Result<(), ScriptError> {
        let args = self.resolve_addresses(&PAUSE_ROUTER_CONSTRUCTOR)?;
        self.deploy_contract(PAUSE_ROUTER_CONTRACT, encode_address_args(&args))
            .await?;

        Ok(())
    }

    /// Deploys the router against the recorded action addresses
    pub async fn deploy_router(&mut self) -> Result<(), ScriptError> {
        let args = self.resolve_addresses(&ROUTER_CONSTRUCTOR)?;
        self.deploy_contract(ROUTER_CONTRACT, encode_address_args(&args))
            .await?;

        Ok(())
    }

    /// Deploys the beacon implementation contracts against the Notional
    /// proxy address
    pub async fn deploy_beacon_implementations(&mut self) -> Result<(), ScriptError> {
        let proxy = self.require_address(NOTIONAL_PROXY_KEY)?;
        for name in BEACON_IMPLEMENTATIONS {
            self.deploy_contract(name, encode_address_args(&[proxy]))
                .await?;
        }

        Ok(())
    }

    /// Deploys the authorized callback contracts against the Notional proxy
    /// address
    pub async fn deploy_authorized_callbacks(&mut self) -> Result<(), ScriptError> {
        let proxy = self.require_address(NOTIONAL_PROXY_KEY)?;
        for name in AUTHORIZED_CALLBACKS {
            self.deploy_contract(name, encode_address_args(&[proxy]))
                .await?;
        }

        Ok(())
    }

    /// Resolves a list of recorded contract addresses by name
    fn resolve_addresses(&self, names: &[&str]) -> Result<Vec<Address>, ScriptError> {
        names.iter().map(|name| self.require_address(name)).collect()
    }

    /// The recorded address of `name`.
    ///
    /// During a dry run a missing address degrades to the zero address so
    /// later steps can still describe what they would do.
    fn require_address(&self, name: &str) -> Result<Address, ScriptError> {
        match self.deployments.address_of(name) {
            Some(address) => Ok(address),
            None if self.dry_run => {
                warn!("{} not deployed, using zero address for dry run", name);
                Ok(Address::ZERO)
            }
            None => Err(ScriptError::MissingDeployment(name.to_string())),
        }
    }

    /// Deploys a single contract unless its recorded init-code hash already
    /// matches, recording the result
    async fn deploy_contract(
        &mut self,
        name: &str,
        constructor_args: Vec<u8>,
    ) -> Result<Address, ScriptError> {
        let artifact = load_artifact(&self.artifacts_dir, name)?;
        let mut init_code = artifact.init_code(&self.deployments.deployments)?;
        init_code.extend_from_slice(&constructor_args);
        let hash = keccak256(&init_code);

        if let Some(address) = self.deployments.address_of(name) {
            if self.deployments.hashes.get(name) == Some(&hash) {
                info!("{} unchanged at {:#x}, skipping", name, address);
                return Ok(address);
            }
        }

        if self.dry_run {
            info!(
                "DRY RUN: would deploy {} ({} bytes of init code)",
                name,
                init_code.len()
            );
            return Ok(self.deployments.address_of(name).unwrap_or(Address::ZERO));
        }

        let tx = TransactionRequest::default().with_deploy_code(Bytes::from(init_code));
        let receipt = self
            .client
            .send_transaction(tx)
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;

        let address = receipt.contract_address.ok_or_else(|| {
            ScriptError::ContractDeployment(format!("no contract address in receipt for {}", name))
        })?;
        info!("{} deployed at {:#x}", name, address);

        self.deployments.record(name, address, hash);
        self.deployments.save(&self.deployments_path)?;

        Ok(address)
    }
}

/// ABI-encodes a list of address constructor arguments, one 32-byte word per
/// address
pub fn encode_address_args(addresses: &[Address]) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(addresses.len() * 32);
    for address in addresses {
        encoded.extend_from_slice(&[0u8; 12]);
        encoded.extend_from_slice(address.as_slice());
    }

    encoded
}
