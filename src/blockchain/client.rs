// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JSON-RPC client for an EVM node.

use alloy::{
    network::{Ethereum, EthereumWallet},
    primitives::{Address, Bytes, U256},
    providers::{
        fillers::{
            BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller,
            WalletFiller,
        },
        Identity, Provider, ProviderBuilder, RootProvider,
    },
    signers::local::PrivateKeySigner,
};

use super::types::{Account, NetworkConfig};

/// HTTP provider type with all fillers and a signing wallet.
pub type SignerProvider = FillProvider<
    JoinFill<
        JoinFill<
            Identity,
            JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
        >,
        WalletFiller<EthereumWallet>,
    >,
    RootProvider<Ethereum>,
>;

/// Client bound to one signing account.
///
/// Every account taking part in a workflow gets its own client so that
/// transactions are signed by the right key and nonces are tracked per
/// account.
pub struct ChainClient {
    /// Network configuration
    network: NetworkConfig,
    /// Address of the signing account
    address: Address,
    /// Alloy HTTP provider
    provider: SignerProvider,
}

impl ChainClient {
    /// Create a client that signs with `account`.
    pub fn connect(network: &NetworkConfig, account: &Account) -> Result<Self, ChainClientError> {
        let url: url::Url = network.rpc_url.parse().map_err(|e: url::ParseError| {
            ChainClientError::InvalidRpcUrl(e.to_string())
        })?;

        let wallet = Self::create_wallet(account.signer.clone());
        let provider = ProviderBuilder::new().wallet(wallet).connect_http(url);

        tracing::debug!(
            role = %account.role,
            address = %account.address(),
            rpc_url = %network.rpc_url,
            "Connected chain client"
        );

        Ok(Self {
            network: network.clone(),
            address: account.address(),
            provider,
        })
    }

    /// Address transactions from this client are signed by.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Underlying provider, for contract bindings.
    pub fn provider(&self) -> &SignerProvider {
        &self.provider
    }

    /// Get the native balance (wei) for an address.
    pub async fn get_native_balance(&self, address: Address) -> Result<U256, ChainClientError> {
        self.provider
            .get_balance(address)
            .await
            .map_err(|e| ChainClientError::RpcError(e.to_string()))
    }

    /// Get the runtime code deployed at an address (empty for accounts).
    pub async fn get_code(&self, address: Address) -> Result<Bytes, ChainClientError> {
        self.provider
            .get_code_at(address)
            .await
            .map_err(|e| ChainClientError::RpcError(e.to_string()))
    }

    /// Get the network configuration.
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// Create a signer from a hex-encoded private key (`0x` prefix optional).
    pub fn create_signer(private_key_hex: &str) -> Result<PrivateKeySigner, ChainClientError> {
        let key_bytes = alloy::hex::decode(private_key_hex.trim())
            .map_err(|e| ChainClientError::InvalidPrivateKey(e.to_string()))?;

        PrivateKeySigner::from_slice(&key_bytes)
            .map_err(|e| ChainClientError::InvalidPrivateKey(e.to_string()))
    }

    /// Create an Ethereum wallet from a signer.
    pub fn create_wallet(signer: PrivateKeySigner) -> EthereumWallet {
        EthereumWallet::from(signer)
    }
}

/// Format a balance with the specified number of decimals.
pub fn format_balance(balance: U256, decimals: u8) -> String {
    if balance.is_zero() {
        return "0".to_string();
    }

    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = balance / divisor;
    let remainder = balance % divisor;

    if remainder.is_zero() {
        whole.to_string()
    } else {
        // Format with up to 6 decimal places
        let decimal_str = format!("{:0>width$}", remainder, width = decimals as usize);
        let trimmed = decimal_str.trim_end_matches('0');
        if trimmed.is_empty() {
            whole.to_string()
        } else {
            format!("{}.{}", whole, &trimmed[..trimmed.len().min(6)])
        }
    }
}

/// Format a wei amount as ether.
pub fn format_ether(wei: U256) -> String {
    format_balance(wei, 18)
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, thiserror::Error)]
pub enum ChainClientError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Contract error: {0}")]
    ContractError(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Transaction {tx_hash} reverted")]
    TransactionReverted { tx_hash: String },

    #[error("Deployment transaction {tx_hash} produced no contract address")]
    MissingContractAddress { tx_hash: String },
}
