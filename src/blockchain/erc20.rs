// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ERC-20 token contract interactions.

use alloy::{
    primitives::{Address, U256},
    providers::Provider,
    sol,
};

use super::client::{ChainClient, ChainClientError, SignerProvider};
use super::events::{EventLogs, EventQuery};
use super::transactions::confirm;
use super::types::{Deployment, TxRecord};
use crate::workflow::FungibleToken;

// Define the ERC-20 interface using alloy's sol! macro
sol! {
    #[sol(rpc)]
    #[derive(Debug)]
    interface IERC20 {
        event Transfer(address indexed from, address indexed to, uint256 value);
        event Approval(address indexed owner, address indexed spender, uint256 value);

        function name() external view returns (string);
        function symbol() external view returns (string);
        function balanceOf(address account) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
        function approve(address spender, uint256 amount) external returns (bool);
        function transferFrom(address from, address to, uint256 amount) external returns (bool);
    }
}

/// Functions the ERC-20 workflow calls; the deployed ABI must declare them.
pub const ERC20_REQUIRED_FUNCTIONS: &[&str] = &["balanceOf", "transfer", "approve", "transferFrom"];

/// ERC-20 contract handle bound to one signing account.
pub struct Erc20Contract<P> {
    contract: IERC20::IERC20Instance<P>,
    signer: Address,
    deployed_at: u64,
    gas_limit: u64,
}

impl Erc20Contract<SignerProvider> {
    /// Handle on a deployed token that sends transactions as `client`'s account.
    pub fn connect(client: &ChainClient, deployment: &Deployment, gas_limit: u64) -> Self {
        Self::new(
            client.provider(),
            client.address(),
            deployment.address,
            deployment.block_number,
            gas_limit,
        )
    }
}

impl<P: Provider + Clone> Erc20Contract<P> {
    /// Create a new ERC-20 contract instance.
    pub fn new(
        provider: &P,
        signer: Address,
        address: Address,
        deployed_at: u64,
        gas_limit: u64,
    ) -> Self {
        let contract = IERC20::new(address, provider.clone());

        Self {
            contract,
            signer,
            deployed_at,
            gas_limit,
        }
    }

    /// Contract address.
    pub fn address(&self) -> Address {
        *self.contract.address()
    }

    /// Get the token name.
    pub async fn name(&self) -> Result<String, ChainClientError> {
        self.contract
            .name()
            .call()
            .await
            .map_err(|e| ChainClientError::ContractError(e.to_string()))
    }

    /// Get the token symbol.
    pub async fn symbol(&self) -> Result<String, ChainClientError> {
        self.contract
            .symbol()
            .call()
            .await
            .map_err(|e| ChainClientError::ContractError(e.to_string()))
    }
}

impl<P: Provider + Clone> FungibleToken for Erc20Contract<P> {
    fn holder(&self) -> Address {
        self.signer
    }

    async fn balance_of(&self, owner: Address) -> Result<U256, ChainClientError> {
        self.contract
            .balanceOf(owner)
            .call()
            .await
            .map_err(|e| ChainClientError::ContractError(e.to_string()))
    }

    async fn transfer(&self, to: Address, amount: U256) -> Result<TxRecord, ChainClientError> {
        let pending = self
            .contract
            .transfer(to, amount)
            .gas(self.gas_limit)
            .send()
            .await
            .map_err(|e| ChainClientError::TransactionFailed(format!("transfer: {}", e)))?;
        confirm(pending).await
    }

    async fn approve(&self, spender: Address, amount: U256) -> Result<TxRecord, ChainClientError> {
        let pending = self
            .contract
            .approve(spender, amount)
            .gas(self.gas_limit)
            .send()
            .await
            .map_err(|e| ChainClientError::TransactionFailed(format!("approve: {}", e)))?;
        confirm(pending).await
    }

    async fn transfer_from(
        &self,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<TxRecord, ChainClientError> {
        let pending = self
            .contract
            .transferFrom(from, to, amount)
            .gas(self.gas_limit)
            .send()
            .await
            .map_err(|e| ChainClientError::TransactionFailed(format!("transferFrom: {}", e)))?;
        confirm(pending).await
    }

    async fn transfer_events(
        &self,
        from: Address,
        to: Address,
    ) -> Result<EventLogs<IERC20::Transfer>, ChainClientError> {
        EventQuery::<IERC20::Transfer>::new(self.address())
            .from_block(self.deployed_at)
            .topic1(from)
            .topic2(to)
            .fetch(self.contract.provider())
            .await
    }

    async fn approval_events(
        &self,
        owner: Address,
        spender: Address,
    ) -> Result<EventLogs<IERC20::Approval>, ChainClientError> {
        EventQuery::<IERC20::Approval>::new(self.address())
            .from_block(self.deployed_at)
            .topic1(owner)
            .topic2(spender)
            .fetch(self.contract.provider())
            .await
    }
}
