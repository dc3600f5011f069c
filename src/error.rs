// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use crate::blockchain::{ArtifactError, ChainClientError};
use crate::config::ConfigError;

/// Fatal errors that end a demo run.
///
/// Guard failures are not represented here; they end a run through
/// [`crate::workflow::FlowOutcome::Aborted`].
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error(transparent)]
    Chain(#[from] ChainClientError),
}

impl FlowError {
    /// Whether the error happened before anything was sent to the node.
    pub fn is_preflight(&self) -> bool {
        matches!(self, FlowError::Config(_) | FlowError::Artifact(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_keep_messages() {
        let err: FlowError = ConfigError::Missing("SENDER_PRIVATE_KEY").into();
        assert!(err.is_preflight());
        assert_eq!(
            err.to_string(),
            "Missing required environment variable SENDER_PRIVATE_KEY"
        );

        let err: FlowError = ChainClientError::TransactionReverted {
            tx_hash: "0xabc".to_string(),
        }
        .into();
        assert!(!err.is_preflight());
        assert_eq!(err.to_string(), "Transaction 0xabc reverted");
    }
}
