//! Loading and library-linking of compiled contract artifacts.
//!
//! Artifacts are the JSON files emitted by the contract build: an `abi`
//! array, the unlinked creation `bytecode`, and a `linkReferences` map
//! locating the library placeholders within it. Linking substitutes the
//! placeholders with deployed library addresses before the init code is
//! sent.

use std::{collections::BTreeMap, fs, path::Path};

use serde::Deserialize;
use serde_json::Value;

use alloy_primitives::Address;

use crate::errors::ScriptError;

/// The number of hex characters a library placeholder occupies
const PLACEHOLDER_LEN: usize = 40;

/// The location of a single library placeholder within unlinked bytecode,
/// in byte (not hex-character) offsets
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct LinkOffset {
    /// The byte offset of the placeholder
    pub start: usize,
    /// The byte length of the placeholder, always an address width
    pub length: usize,
}

/// A compiled contract artifact
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractArtifact {
    /// The contract's ABI, kept opaque for re-serialization
    pub abi: Value,
    /// The hex-encoded unlinked creation bytecode
    pub bytecode: String,
    /// Source file to library name to placeholder locations
    #[serde(default)]
    pub link_references: BTreeMap<String, BTreeMap<String, Vec<LinkOffset>>>,
}

/// Loads the artifact for `name` from the artifacts directory
pub fn load_artifact(dir: &Path, name: &str) -> Result<ContractArtifact, ScriptError> {
    let path = dir.join(format!("{}.json", name));
    let contents = fs::read_to_string(&path)
        .map_err(|e| ScriptError::ReadArtifact(format!("{}: {}", path.display(), e)))?;

    serde_json::from_str(&contents)
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", name, e)))
}

impl ContractArtifact {
    /// Produces the deployable init code, substituting every library
    /// placeholder with its deployed address.
    ///
    /// Placeholders located by `linkReferences` are resolved first; any
    /// legacy `__LibraryName__...`-padded placeholders remaining in the
    /// bytecode are resolved by name. Unresolvable placeholders are an
    /// error, the chain would reject the malformed code anyway.
    pub fn init_code(
        &self,
        libraries: &BTreeMap<String, Address>,
    ) -> Result<Vec<u8>, ScriptError> {
        let mut code = self
            .bytecode
            .strip_prefix("0x")
            .unwrap_or(&self.bytecode)
            .to_string();

        for library_offsets in self.link_references.values() {
            for (library, offsets) in library_offsets {
                let address = libraries
                    .get(library)
                    .ok_or_else(|| ScriptError::MissingDeployment(library.clone()))?;

                for offset in offsets {
                    let start = offset.start * 2;
                    let end = start + offset.length * 2;
                    if end > code.len() {
                        return Err(ScriptError::ArtifactParsing(format!(
                            "link reference for {} out of bounds",
                            library
                        )));
                    }
                    code.replace_range(start..end, &hex::encode(address));
                }
            }
        }

        while let Some(index) = code.find("__") {
            if index + PLACEHOLDER_LEN > code.len() {
                return Err(ScriptError::UnlinkedBytecode(self.bytecode.clone()));
            }

            let placeholder = &code[index..index + PLACEHOLDER_LEN];
            if placeholder.contains('$') {
                // A solc hash placeholder that linkReferences did not cover
                return Err(ScriptError::UnlinkedBytecode(placeholder.to_string()));
            }

            let library = placeholder.trim_matches('_');
            let address = libraries
                .get(library)
                .ok_or_else(|| ScriptError::MissingDeployment(library.to_string()))?;
            code.replace_range(index..index + PLACEHOLDER_LEN, &hex::encode(address));
        }

        hex::decode(&code).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))
    }
}
