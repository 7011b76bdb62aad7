//! Definitions of errors that can occur during the execution of the contract management scripts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Errors that can occur during the execution of the contract management scripts
#[derive(Debug)]
pub enum ScriptError {
    /// Error reading a compiled contract artifact
    ReadArtifact(String),
    /// Error parsing a compiled contract artifact
    ArtifactParsing(String),
    /// Bytecode still contains unresolved library placeholders
    UnlinkedBytecode(String),
    /// Error initializing the RPC client
    ClientInitialization(String),
    /// Error deploying a contract
    ContractDeployment(String),
    /// Error reading the deployments file
    ReadDeployments(String),
    /// Error writing the deployments file
    WriteDeployments(String),
    /// A contract address required by the current step has not been deployed
    /// or recorded
    MissingDeployment(String),
    /// Error writing an exported ABI file
    AbiExport(String),
    /// Error reading the broadcast confirmation prompt
    Prompt(String),
    /// The broadcast confirmation prompt was declined
    Aborted,
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::ReadArtifact(s) => write!(f, "error reading artifact: {}", s),
            ScriptError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            ScriptError::UnlinkedBytecode(s) => {
                write!(f, "bytecode has unresolved library placeholders: {}", s)
            }
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::ContractDeployment(s) => write!(f, "error deploying contract: {}", s),
            ScriptError::ReadDeployments(s) => write!(f, "error reading deployments: {}", s),
            ScriptError::WriteDeployments(s) => write!(f, "error writing deployments: {}", s),
            ScriptError::MissingDeployment(s) => write!(f, "missing deployment for: {}", s),
            ScriptError::AbiExport(s) => write!(f, "error exporting ABI: {}", s),
            ScriptError::Prompt(s) => write!(f, "error reading confirmation: {}", s),
            ScriptError::Aborted => write!(f, "aborted by user"),
        }
    }
}

impl Error for ScriptError {}
