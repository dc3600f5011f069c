// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain integration module for EVM JSON-RPC nodes.
//!
//! This module provides functionality for:
//! - Loading compiled contract artifacts
//! - Deploying contracts and confirming transactions
//! - ERC-20 and ERC-721 contract bindings
//! - Filtered event log queries

pub mod artifact;
pub mod client;
pub mod erc20;
pub mod erc721;
pub mod events;
pub mod transactions;
pub mod types;

pub use artifact::{ArtifactError, ContractArtifact};
pub use client::{format_balance, format_ether, ChainClient, ChainClientError, SignerProvider};
pub use erc20::{Erc20Contract, IERC20};
pub use erc721::{Erc721Contract, IERC721};
pub use events::{EventLogs, EventQuery, EventRecord};
pub use transactions::{confirm, deploy_contract};
pub use types::*;
