// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain types and constants.

use alloy::{
    primitives::{Address, B256},
    rpc::types::TransactionReceipt,
    signers::local::PrivateKeySigner,
};

/// Default JSON-RPC endpoint (local dev node).
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";

/// Gas ceiling for contract-creation transactions.
pub const DEFAULT_DEPLOY_GAS_LIMIT: u64 = 5_000_000;

/// Gas ceiling for token calls (transfer, approve, transferFrom).
pub const DEFAULT_CALL_GAS_LIMIT: u64 = 100_000;

/// Network the demo talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// RPC endpoint URL
    pub rpc_url: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
        }
    }
}

/// Gas ceilings applied to outgoing transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasLimits {
    pub deploy: u64,
    pub call: u64,
}

impl Default for GasLimits {
    fn default() -> Self {
        Self {
            deploy: DEFAULT_DEPLOY_GAS_LIMIT,
            call: DEFAULT_CALL_GAS_LIMIT,
        }
    }
}

/// Role an account plays in a workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountRole {
    /// Deployer and initial token holder
    Sender,
    /// Intermediate holder, later acts as spender
    Recipient,
}

impl std::fmt::Display for AccountRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountRole::Sender => f.write_str("sender"),
            AccountRole::Recipient => f.write_str("recipient"),
        }
    }
}

/// An address together with the key that signs for it.
#[derive(Debug, Clone)]
pub struct Account {
    pub role: AccountRole,
    pub signer: PrivateKeySigner,
}

impl Account {
    pub fn new(role: AccountRole, signer: PrivateKeySigner) -> Self {
        Self { role, signer }
    }

    /// Address controlled by this account.
    pub fn address(&self) -> Address {
        self.signer.address()
    }
}

/// Confirmed transaction summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRecord {
    /// Transaction hash
    pub tx_hash: B256,
    /// Block number where transaction was included
    pub block_number: Option<u64>,
    /// Gas actually used
    pub gas_used: u64,
    /// Whether the transaction was successful
    pub success: bool,
    /// Number of logs emitted
    pub log_count: usize,
}

impl From<&TransactionReceipt> for TxRecord {
    fn from(receipt: &TransactionReceipt) -> Self {
        Self {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used as u64,
            success: receipt.status(),
            log_count: receipt.inner.logs().len(),
        }
    }
}

/// A contract that has been mined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    /// Contract address
    pub address: Address,
    /// Block the contract was created in
    pub block_number: u64,
    /// Contract-creation transaction
    pub receipt: TxRecord,
}
