//! Compiled contract artifacts and constructor argument encoding.
//!
//! Artifacts follow the Hardhat `hh-sol-artifact-1` layout: one JSON file per
//! contract under `artifacts/contracts/<Source>.sol/<Name>.json`, carrying at
//! least `contractName`, `abi` and `bytecode`.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use alloy_core::{
    dyn_abi::{DynSolType, DynSolValue},
    json_abi::JsonAbi,
    primitives::Bytes,
};
use serde::Deserialize;

use crate::DeployError;

/// A compiled contract ready to be deployed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractArtifact {
    pub contract_name: String,
    #[serde(default)]
    pub source_name: Option<String>,
    pub abi: JsonAbi,
    /// Creation bytecode, hex encoded. May contain unlinked library
    /// placeholders, which are rejected at encoding time.
    pub bytecode: String,
}

impl ContractArtifact {
    /// Parse an artifact from its JSON representation.
    pub fn from_json(content: &str) -> Result<Self, DeployError> {
        serde_json::from_str(content).map_err(|e| DeployError::InvalidArtifact {
            contract: "<unknown>".to_string(),
            reason: format!("failed to parse artifact JSON: {e}"),
        })
    }

    /// Solidity types of the constructor parameters, in declaration order.
    pub fn constructor_types(&self) -> Result<Vec<DynSolType>, DeployError> {
        let Some(constructor) = &self.abi.constructor else {
            return Ok(Vec::new());
        };

        constructor
            .inputs
            .iter()
            .map(|param| {
                DynSolType::parse(&param.selector_type()).map_err(|e| {
                    DeployError::InvalidArtifact {
                        contract: self.contract_name.clone(),
                        reason: format!("unsupported constructor parameter '{}': {e}", param.name),
                    }
                })
            })
            .collect()
    }

    /// Coerce string arguments into typed ABI values.
    ///
    /// Fails with [`DeployError::ArgumentMismatch`] if the count differs from
    /// the constructor declaration or a value cannot be read as its type.
    pub fn coerce_args(&self, args: &[String]) -> Result<Vec<DynSolValue>, DeployError> {
        let types = self.constructor_types()?;

        if types.len() != args.len() {
            return Err(DeployError::ArgumentMismatch {
                contract: self.contract_name.clone(),
                reason: format!(
                    "expected {} constructor argument(s), got {}",
                    types.len(),
                    args.len()
                ),
            });
        }

        types
            .iter()
            .zip(args)
            .enumerate()
            .map(|(i, (ty, arg))| {
                ty.coerce_str(arg).map_err(|e| DeployError::ArgumentMismatch {
                    contract: self.contract_name.clone(),
                    reason: format!("argument {i} ('{arg}') is not a valid {ty}: {e}"),
                })
            })
            .collect()
    }

    /// Creation bytecode followed by the ABI-encoded constructor arguments.
    pub fn encode_deploy_data(&self, args: &[String]) -> Result<Bytes, DeployError> {
        let values = self.coerce_args(args)?;
        let mut data = self.creation_code()?;

        if !values.is_empty() {
            data.extend_from_slice(&DynSolValue::Tuple(values).abi_encode_params());
        }

        Ok(Bytes::from(data))
    }

    fn creation_code(&self) -> Result<Vec<u8>, DeployError> {
        let code = self.bytecode.trim().trim_start_matches("0x");

        if code.is_empty() {
            return Err(self.invalid("empty bytecode (abstract contract or interface?)"));
        }
        if code.contains("__") {
            return Err(self.invalid("bytecode has unlinked library references"));
        }

        hex::decode(code).map_err(|e| self.invalid(&format!("bytecode is not valid hex: {e}")))
    }

    fn invalid(&self, reason: &str) -> DeployError {
        DeployError::InvalidArtifact {
            contract: self.contract_name.clone(),
            reason: reason.to_string(),
        }
    }
}

/// Lookup of compiled artifacts by contract name.
///
/// Artifacts inserted in memory take precedence over those found on disk.
#[derive(Debug, Clone, Default)]
pub struct ArtifactStore {
    root: Option<PathBuf>,
    loaded: HashMap<String, ContractArtifact>,
}

impl ArtifactStore {
    /// An empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store backed by an artifacts directory.
    pub fn from_dir(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            loaded: HashMap::new(),
        }
    }

    pub fn insert(&mut self, artifact: ContractArtifact) {
        self.loaded
            .insert(artifact.contract_name.clone(), artifact);
    }

    pub fn with_artifact(mut self, artifact: ContractArtifact) -> Self {
        self.insert(artifact);
        self
    }

    /// Find the artifact for `name`.
    pub fn get(&self, name: &str) -> Result<ContractArtifact, DeployError> {
        if let Some(artifact) = self.loaded.get(name) {
            return Ok(artifact.clone());
        }

        let root = self
            .root
            .as_ref()
            .ok_or_else(|| DeployError::UnknownContract(name.to_string()))?;

        let mut candidates = Vec::new();
        collect_artifact_files(root, name, &mut candidates);

        // A same-named file may declare another contract; keep looking past it.
        let mut last_error = None;
        for path in candidates {
            match load_artifact_file(&path, name) {
                Ok(artifact) if artifact.contract_name == name => {
                    tracing::debug!(contract = name, path = %path.display(), "Loaded artifact");
                    return Ok(artifact);
                }
                Ok(artifact) => {
                    tracing::debug!(
                        path = %path.display(),
                        declared = %artifact.contract_name,
                        "Skipping artifact declaring another contract"
                    );
                }
                Err(e) => {
                    tracing::debug!(error = %e, path = %path.display(), "Skipping unreadable artifact");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DeployError::UnknownContract(name.to_string())))
    }
}

fn load_artifact_file(path: &Path, name: &str) -> Result<ContractArtifact, DeployError> {
    let content = std::fs::read_to_string(path).map_err(|e| DeployError::InvalidArtifact {
        contract: name.to_string(),
        reason: format!("failed to read {}: {e}", path.display()),
    })?;

    ContractArtifact::from_json(&content).map_err(|e| match e {
        DeployError::InvalidArtifact { reason, .. } => DeployError::InvalidArtifact {
            contract: name.to_string(),
            reason: format!("{}: {reason}", path.display()),
        },
        other => other,
    })
}

/// Depth-first collection of every `<name>.json`, in sorted order, skipping
/// `build-info`. Symlinked directories are not followed.
fn collect_artifact_files(dir: &Path, name: &str, found: &mut Vec<PathBuf>) {
    let file_name = format!("{name}.json");
    let Ok(read_dir) = std::fs::read_dir(dir) else {
        return;
    };
    let mut entries: Vec<_> = read_dir.flatten().collect();
    entries.sort_by_key(|entry| entry.file_name());

    let mut subdirs = Vec::new();
    for entry in entries {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            if entry.file_name() != "build-info" {
                subdirs.push(entry.path());
            }
        } else if entry.file_name().to_string_lossy() == file_name {
            found.push(entry.path());
        }
    }

    for subdir in subdirs {
        collect_artifact_files(&subdir, name, found);
    }
}
