//! Utilities for the deploy scripts.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use alloy::{
    network::EthereumWallet,
    providers::{DynProvider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

use crate::{
    constants::{DEPLOYER_KEY_ENV_SUFFIX, DEPLOYMENTS_FILE_PREFIX},
    errors::ScriptError,
};

/// Sets up the client with which to deploy and call contracts, returning the
/// deployer's address alongside it
pub async fn setup_client(
    priv_key: &str,
    rpc_url: &str,
) -> Result<(Address, DynProvider), ScriptError> {
    let signer: PrivateKeySigner = priv_key
        .trim()
        .parse()
        .map_err(|e: alloy::signers::local::LocalSignerError| {
            ScriptError::ClientInitialization(e.to_string())
        })?;
    let deployer = signer.address();

    let url =
        Url::parse(rpc_url).map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let provider = ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .on_http(url);

    Ok((deployer, DynProvider::new(provider)))
}

/// Collapses fork and pinned-block network aliases to their canonical
/// network name
pub fn resolve_network_name(name: &str) -> String {
    match name {
        "mainnet-fork" | "mainnet-current" => "mainnet".to_string(),
        "arbitrum-fork" | "arbitrum-current" => "arbitrum-one".to_string(),
        other => other.to_string(),
    }
}

/// The environment variable holding the deployer key for the given network
pub fn deployer_key_env_var(network: &str) -> String {
    format!(
        "{}{}",
        network.to_uppercase().replace('-', "_"),
        DEPLOYER_KEY_ENV_SUFFIX
    )
}

/// The path of the deployments file for the given network
pub fn deployments_file_path(dir: &Path, network: &str) -> PathBuf {
    dir.join(format!("{}.{}.json", DEPLOYMENTS_FILE_PREFIX, network))
}

/// The recorded deployment state of a single network.
///
/// The `hashes` map holds the keccak hash of the init code each contract was
/// last deployed with; a matching hash is what lets a re-run skip the
/// contract.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DeploymentsFile {
    /// Contract name to deployed address
    #[serde(default)]
    pub deployments: BTreeMap<String, Address>,
    /// Contract name to init-code hash at deployment time
    #[serde(default)]
    pub hashes: BTreeMap<String, B256>,
}

impl DeploymentsFile {
    /// Loads the deployments file at `path`, defaulting to an empty record
    /// if the file does not exist yet
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents =
            fs::read_to_string(path).map_err(|e| ScriptError::ReadDeployments(e.to_string()))?;
        serde_json::from_str(&contents).map_err(|e| ScriptError::ReadDeployments(e.to_string()))
    }

    /// Writes the deployments file to `path`
    pub fn save(&self, path: &Path) -> Result<(), ScriptError> {
        let json =
            to_json_pretty(self).map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
        fs::write(path, json).map_err(|e| ScriptError::WriteDeployments(e.to_string()))
    }

    /// The recorded address of `name`, if any
    pub fn address_of(&self, name: &str) -> Option<Address> {
        self.deployments.get(name).copied()
    }

    /// Records a deployment of `name` and the init-code hash it shipped with
    pub fn record(&mut self, name: &str, address: Address, hash: B256) {
        self.deployments.insert(name.to_string(), address);
        self.hashes.insert(name.to_string(), hash);
    }
}

/// Parses a contract address from the deployments file at `file_path`
pub fn parse_addr_from_deployments_file(
    file_path: &Path,
    contract_key: &str,
) -> Result<Address, ScriptError> {
    let deployments = DeploymentsFile::load(file_path)?;
    deployments
        .address_of(contract_key)
        .ok_or_else(|| ScriptError::MissingDeployment(contract_key.to_string()))
}

/// Serializes a value as JSON with 4-space indentation.
///
/// Map keys come out sorted, so the output is byte-stable across runs.
pub fn to_json_pretty<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;

    // serde_json only emits valid UTF-8
    Ok(String::from_utf8(out).unwrap())
}
