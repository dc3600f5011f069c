// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ERC-721 (NFT) contract interactions.

use alloy::{
    primitives::{Address, B256, U256},
    providers::Provider,
    sol,
};

use super::client::{ChainClient, ChainClientError, SignerProvider};
use super::events::{EventLogs, EventQuery};
use super::transactions::confirm;
use super::types::{Deployment, TxRecord};
use crate::workflow::NonFungibleToken;

// Only the three-argument `safeTransferFrom` is declared so the binding
// keeps a single, unsuffixed method for it.
sol! {
    #[sol(rpc)]
    #[derive(Debug)]
    interface IERC721 {
        event Transfer(address indexed from, address indexed to, uint256 indexed tokenId);
        event Approval(address indexed owner, address indexed approved, uint256 indexed tokenId);

        function name() external view returns (string);
        function ownerOf(uint256 tokenId) external view returns (address);
        function getApproved(uint256 tokenId) external view returns (address);
        function approve(address to, uint256 tokenId) external;
        function safeTransferFrom(address from, address to, uint256 tokenId) external;
    }
}

/// Functions the ERC-721 workflow calls; the deployed ABI must declare them.
pub const ERC721_REQUIRED_FUNCTIONS: &[&str] =
    &["ownerOf", "approve", "safeTransferFrom", "getApproved"];

/// ERC-721 contract handle bound to one signing account.
pub struct Erc721Contract<P> {
    contract: IERC721::IERC721Instance<P>,
    signer: Address,
    deployed_at: u64,
    gas_limit: u64,
}

impl Erc721Contract<SignerProvider> {
    /// Handle on a deployed collection that sends transactions as `client`'s account.
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

impl<P: Provider + Clone> Erc721Contract<P> {
    /// Create a new ERC-721 contract instance.
    pub fn new(
        provider: &P,
        signer: Address,
        address: Address,
        deployed_at: u64,
        gas_limit: u64,
    ) -> Self {
        Self {
            contract: IERC721::new(address, provider.clone()),
            signer,
            deployed_at,
            gas_limit,
        }
    }

    /// Contract address.
    pub fn address(&self) -> Address {
        *self.contract.address()
    }

    /// Get the collection name.
    pub async fn name(&self) -> Result<String, ChainClientError> {
        self.contract
            .name()
            .call()
            .await
            .map_err(|e| ChainClientError::ContractError(e.to_string()))
    }

    /// Address currently approved to move `token_id`.
    pub async fn get_approved(&self, token_id: U256) -> Result<Address, ChainClientError> {
        self.contract
            .getApproved(token_id)
            .call()
            .await
            .map_err(|e| ChainClientError::ContractError(e.to_string()))
    }
}

impl<P: Provider + Clone> NonFungibleToken for Erc721Contract<P> {
    fn holder(&self) -> Address {
        self.signer
    }

    async fn owner_of(&self, token_id: U256) -> Result<Address, ChainClientError> {
        self.contract
            .ownerOf(token_id)
            .call()
            .await
            .map_err(|e| ChainClientError::ContractError(e.to_string()))
    }

    async fn approve(&self, to: Address, token_id: U256) -> Result<TxRecord, ChainClientError> {
        let pending = self
            .contract
            .approve(to, token_id)
            .gas(self.gas_limit)
            .send()
            .await
            .map_err(|e| ChainClientError::TransactionFailed(format!("approve: {}", e)))?;
        confirm(pending).await
    }

    async fn safe_transfer_from(
        &self,
        from: Address,
        to: Address,
        token_id: U256,
    ) -> Result<TxRecord, ChainClientError> {
        let pending = self
            .contract
            .safeTransferFrom(from, to, token_id)
            .gas(self.gas_limit)
            .send()
            .await
            .map_err(|e| {
                ChainClientError::TransactionFailed(format!("safeTransferFrom: {}", e))
            })?;
        confirm(pending).await
    }

    async fn transfer_events(
        &self,
        from: Address,
        to: Address,
        token_id: U256,
    ) -> Result<EventLogs<IERC721::Transfer>, ChainClientError> {
        EventQuery::<IERC721::Transfer>::new(self.address())
            .from_block(self.deployed_at)
            .topic1(from)
            .topic2(to)
            .topic3(token_topic(token_id))
            .fetch(self.contract.provider())
            .await
    }

    async fn approval_events(
        &self,
        owner: Address,
        approved: Address,
        token_id: U256,
    ) -> Result<EventLogs<IERC721::Approval>, ChainClientError> {
        EventQuery::<IERC721::Approval>::new(self.address())
            .from_block(self.deployed_at)
            .topic1(owner)
            .topic2(approved)
            .topic3(token_topic(token_id))
            .fetch(self.contract.provider())
            .await
    }
}

/// Topic value of an indexed `uint256 tokenId`.
fn token_topic(token_id: U256) -> B256 {
    B256::from(token_id.to_be_bytes::<32>())
}
