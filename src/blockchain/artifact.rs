// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Compiled contract artifacts (JSON ABI + hex bytecode).
//!
//! Artifacts live side by side in a directory:
//!
//! ```text
//! contracts/
//!   erc20.abi         # JSON ABI
//!   erc20.bytecode    # hex creation code, may be wrapped over several lines
//!   erc721.abi
//!   erc721.bytecode
//! ```
//!
//! Everything here runs before the first RPC call, so a broken artifact
//! aborts the run without touching the chain.

use std::fs;
use std::path::{Path, PathBuf};

use alloy::{json_abi::JsonAbi, primitives::Bytes};

/// ABI and creation bytecode of one contract.
#[derive(Debug, Clone)]
pub struct ContractArtifact {
    /// Artifact name (file stem), e.g. `erc20`
    pub name: String,
    /// Parsed interface description
    pub abi: JsonAbi,
    /// Creation bytecode
    pub bytecode: Bytes,
}

impl ContractArtifact {
    /// Load `<dir>/<name>.abi` and `<dir>/<name>.bytecode`.
    pub fn load(dir: impl AsRef<Path>, name: &str) -> Result<Self, ArtifactError> {
        let dir = dir.as_ref();
        let abi_path = dir.join(format!("{name}.abi"));
        let bytecode_path = dir.join(format!("{name}.bytecode"));

        let abi_json = read_file(&abi_path)?;
        let abi = parse_abi(&abi_json).map_err(|reason| ArtifactError::MalformedAbi {
            path: abi_path.clone(),
            reason,
        })?;

        let bytecode_hex = read_file(&bytecode_path)?;
        let bytecode =
            parse_bytecode(&bytecode_hex).map_err(|reason| ArtifactError::MalformedBytecode {
                path: bytecode_path.clone(),
                reason,
            })?;

        tracing::debug!(
            artifact = %name,
            functions = abi.functions.len(),
            events = abi.events.len(),
            bytecode_len = bytecode.len(),
            "Loaded contract artifact"
        );

        Ok(Self {
            name: name.to_string(),
            abi,
            bytecode,
        })
    }

    /// Ensure the ABI declares every function in `names`.
    ///
    /// The typed bindings assume these selectors exist; an ABI that lacks
    /// one belongs to a different contract.
    pub fn require_functions(&self, names: &[&str]) -> Result<(), ArtifactError> {
        let missing: Vec<String> = names
            .iter()
            .filter(|name| self.abi.function(name).is_none())
            .map(|name| name.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ArtifactError::MissingFunctions {
                artifact: self.name.clone(),
                missing,
            })
        }
    }

    /// Ensure the contract can be created without constructor arguments.
    pub fn require_no_constructor_args(&self) -> Result<(), ArtifactError> {
        match &self.abi.constructor {
            Some(ctor) if !ctor.inputs.is_empty() => Err(ArtifactError::ConstructorArgs {
                artifact: self.name.clone(),
                count: ctor.inputs.len(),
            }),
            _ => Ok(()),
        }
    }
}

fn read_file(path: &Path) -> Result<String, ArtifactError> {
    fs::read_to_string(path).map_err(|source| ArtifactError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_abi(json: &str) -> Result<JsonAbi, String> {
    serde_json::from_str(json).map_err(|e| e.to_string())
}

/// Decode hex bytecode, ignoring line breaks, surrounding whitespace and an
/// optional `0x` prefix.
fn parse_bytecode(raw: &str) -> Result<Bytes, String> {
    let joined: String = raw.split_whitespace().collect();
    let hex = joined.strip_prefix("0x").unwrap_or(&joined);

    if hex.is_empty() {
        return Err("bytecode is empty".to_string());
    }

    alloy::hex::decode(hex)
        .map(Bytes::from)
        .map_err(|e| e.to_string())
}

/// Errors raised while loading contract artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed ABI in {path}: {reason}")]
    MalformedAbi { path: PathBuf, reason: String },

    #[error("Malformed bytecode in {path}: {reason}")]
    MalformedBytecode { path: PathBuf, reason: String },

    #[error("ABI of `{artifact}` is missing functions: {}", missing.join(", "))]
    MissingFunctions {
        artifact: String,
        missing: Vec<String>,
    },

    #[error("Constructor of `{artifact}` expects {count} argument(s); deployment passes none")]
    ConstructorArgs { artifact: String, count: usize },
}
