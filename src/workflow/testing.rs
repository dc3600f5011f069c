// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory token ledgers for workflow tests.
//!
//! Handles created with `connect` share one ledger and sign as a different
//! account, mirroring a contract binding re-attached to another wallet.
//! Emitted logs can be held back for a number of queries to imitate a node
//! whose log index lags behind its receipts.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use alloy::primitives::{address, Address, B256, U256};
use alloy::rpc::types::Log;
use alloy::sol_types::SolEvent;

use super::{FungibleToken, NonFungibleToken};
use crate::blockchain::{ChainClientError, EventLogs, TxRecord, IERC20, IERC721};

pub const SENDER: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
pub const RECIPIENT: Address = address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8");
pub const NEW_RECIPIENT: Address = address!("0x614561D2d143621E126e87831AEF287678B442b8");
pub const TOKEN: Address = address!("0x5FbDB2315678afecb367f032d93F642f64180aa3");

/// A log plus the number of queries it stays invisible for.
struct PendingLog<E> {
    event: E,
    log: Log,
    hidden_for: u32,
}

/// Chain-side bookkeeping shared by every fake ledger.
#[derive(Default)]
struct Chain {
    block: u64,
    submitted: usize,
    index_lag: u32,
}

impl Chain {
    fn mine(&mut self) -> TxRecord {
        self.block += 1;
        self.submitted += 1;
        TxRecord {
            tx_hash: B256::with_last_byte(self.submitted as u8),
            block_number: Some(self.block),
            gas_used: 21_000,
            success: true,
            log_count: 1,
        }
    }

    fn emit<E: SolEvent>(&self, logs: &mut Vec<PendingLog<E>>, event: E, tx: &TxRecord) {
        let log = Log {
            inner: alloy::primitives::Log {
                address: TOKEN,
                data: event.encode_log_data(),
            },
            transaction_hash: Some(tx.tx_hash),
            block_number: tx.block_number,
            ..Default::default()
        };
        logs.push(PendingLog {
            event,
            log,
            hidden_for: self.index_lag,
        });
    }
}

/// Return visible logs matching `keep`, then age every hidden log by one query.
fn query<E: SolEvent>(logs: &mut [PendingLog<E>], keep: impl Fn(&E) -> bool) -> EventLogs<E> {
    let visible = logs
        .iter()
        .filter(|pending| pending.hidden_for == 0 && keep(&pending.event))
        .map(|pending| pending.log.clone())
        .collect();
    for pending in logs.iter_mut() {
        pending.hidden_for = pending.hidden_for.saturating_sub(1);
    }
    EventLogs::from_logs(visible)
}

fn reverted(tx: u64) -> ChainClientError {
    ChainClientError::TransactionReverted {
        tx_hash: format!("fake-{tx}"),
    }
}

// =============================================================================
// ERC-20
// =============================================================================

#[derive(Default)]
struct Erc20State {
    chain: Chain,
    reverting: Option<&'static str>,
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
    transfers: Vec<PendingLog<IERC20::Transfer>>,
    approvals: Vec<PendingLog<IERC20::Approval>>,
}

impl Erc20State {
    fn check_reverting(&self, function: &str) -> Result<(), ChainClientError> {
        if self.reverting == Some(function) {
            return Err(reverted(self.chain.block));
        }
        Ok(())
    }

    fn balance(&self, owner: Address) -> U256 {
        self.balances.get(&owner).copied().unwrap_or_default()
    }

    fn move_tokens(
        &mut self,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<TxRecord, ChainClientError> {
        let available = self.balance(from);
        if available < amount {
            return Err(reverted(self.chain.block));
        }
        self.balances.insert(from, available - amount);
        let credited = self.balance(to) + amount;
        self.balances.insert(to, credited);

        let tx = self.chain.mine();
        self.chain.emit(
            &mut self.transfers,
            IERC20::Transfer {
                from,
                to,
                value: amount,
            },
            &tx,
        );
        Ok(tx)
    }
}

/// ERC-20 ledger handle signing as `caller`.
#[derive(Clone)]
pub struct FakeErc20 {
    state: Arc<Mutex<Erc20State>>,
    caller: Address,
}

impl FakeErc20 {
    /// Fresh token with `supply` credited to `deployer`.
    pub fn deploy(deployer: Address, supply: U256) -> Self {
        let mut state = Erc20State::default();
        state.balances.insert(deployer, supply);
        Self {
            state: Arc::new(Mutex::new(state)),
            caller: deployer,
        }
    }

    /// Hold every emitted log back for `queries` log queries.
    pub fn with_index_lag(self, queries: u32) -> Self {
        self.state.lock().unwrap().chain.index_lag = queries;
        self
    }

    /// Make every call to `function` revert, whatever the ledger state.
    pub fn reverting(self, function: &'static str) -> Self {
        self.state.lock().unwrap().reverting = Some(function);
        self
    }

    /// Same ledger, signing as `caller`.
    pub fn connect(&self, caller: Address) -> Self {
        Self {
            state: Arc::clone(&self.state),
            caller,
        }
    }

    pub fn balance(&self, owner: Address) -> U256 {
        self.state.lock().unwrap().balance(owner)
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        let state = self.state.lock().unwrap();
        state.allowances.get(&(owner, spender)).copied().unwrap_or_default()
    }

    /// Number of transactions mined so far.
    pub fn submitted(&self) -> usize {
        self.state.lock().unwrap().chain.submitted
    }
}

impl FungibleToken for FakeErc20 {
    fn holder(&self) -> Address {
        self.caller
    }

    async fn balance_of(&self, owner: Address) -> Result<U256, ChainClientError> {
        Ok(self.balance(owner))
    }

    async fn transfer(&self, to: Address, amount: U256) -> Result<TxRecord, ChainClientError> {
        let mut state = self.state.lock().unwrap();
        state.check_reverting("transfer")?;
        state.move_tokens(self.caller, to, amount)
    }

    async fn approve(&self, spender: Address, amount: U256) -> Result<TxRecord, ChainClientError> {
        let mut state = self.state.lock().unwrap();
        state.check_reverting("approve")?;
        state.allowances.insert((self.caller, spender), amount);
        let tx = state.chain.mine();
        let Erc20State {
            chain, approvals, ..
        } = &mut *state;
        chain.emit(
            approvals,
            IERC20::Approval {
                owner: self.caller,
                spender,
                value: amount,
            },
            &tx,
        );
        Ok(tx)
    }

    async fn transfer_from(
        &self,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<TxRecord, ChainClientError> {
        let mut state = self.state.lock().unwrap();
        state.check_reverting("transferFrom")?;
        let allowance = state
            .allowances
            .get(&(from, self.caller))
            .copied()
            .unwrap_or_default();
        if allowance < amount {
            return Err(reverted(state.chain.block));
        }
        let tx = state.move_tokens(from, to, amount)?;
        state.allowances.insert((from, self.caller), allowance - amount);
        Ok(tx)
    }

    async fn transfer_events(
        &self,
        from: Address,
        to: Address,
    ) -> Result<EventLogs<IERC20::Transfer>, ChainClientError> {
        let mut state = self.state.lock().unwrap();
        Ok(query(&mut state.transfers, |e| e.from == from && e.to == to))
    }

    async fn approval_events(
        &self,
        owner: Address,
        spender: Address,
    ) -> Result<EventLogs<IERC20::Approval>, ChainClientError> {
        let mut state = self.state.lock().unwrap();
        Ok(query(&mut state.approvals, |e| e.owner == owner && e.spender == spender))
    }
}

// =============================================================================
// ERC-721
// =============================================================================

#[derive(Default)]
struct Erc721State {
    chain: Chain,
    owners: HashMap<U256, Address>,
    approved: HashMap<U256, Address>,
    transfers: Vec<PendingLog<IERC721::Transfer>>,
    approvals: Vec<PendingLog<IERC721::Approval>>,
}

/// ERC-721 ledger handle signing as `caller`.
#[derive(Clone)]
pub struct FakeErc721 {
    state: Arc<Mutex<Erc721State>>,
    caller: Address,
}

impl FakeErc721 {
    /// Fresh collection with `token_id` minted to `deployer`.
    pub fn deploy(deployer: Address, token_id: U256) -> Self {
        let mut state = Erc721State::default();
        state.owners.insert(token_id, deployer);
        Self {
            state: Arc::new(Mutex::new(state)),
            caller: deployer,
        }
    }

    /// Same collection, signing as `caller`.
    pub fn connect(&self, caller: Address) -> Self {
        Self {
            state: Arc::clone(&self.state),
            caller,
        }
    }

    /// Number of transactions mined so far.
    pub fn submitted(&self) -> usize {
        self.state.lock().unwrap().chain.submitted
    }

    pub fn owner(&self, token_id: U256) -> Option<Address> {
        self.state.lock().unwrap().owners.get(&token_id).copied()
    }
}

impl NonFungibleToken for FakeErc721 {
    fn holder(&self) -> Address {
        self.caller
    }

    async fn owner_of(&self, token_id: U256) -> Result<Address, ChainClientError> {
        self.owner(token_id).ok_or_else(|| {
            ChainClientError::ContractError(format!("ERC721NonexistentToken({token_id})"))
        })
    }

    async fn approve(&self, to: Address, token_id: U256) -> Result<TxRecord, ChainClientError> {
        let mut state = self.state.lock().unwrap();
        let owner = state.owners.get(&token_id).copied();
        if owner != Some(self.caller) {
            return Err(reverted(state.chain.block));
        }
        state.approved.insert(token_id, to);
        let tx = state.chain.mine();
        let Erc721State {
            chain, approvals, ..
        } = &mut *state;
        chain.emit(
            approvals,
            IERC721::Approval {
                owner: self.caller,
                approved: to,
                tokenId: token_id,
            },
            &tx,
        );
        Ok(tx)
    }

    async fn safe_transfer_from(
        &self,
        from: Address,
        to: Address,
        token_id: U256,
    ) -> Result<TxRecord, ChainClientError> {
        let mut state = self.state.lock().unwrap();
        let owner = state.owners.get(&token_id).copied();
        let approved = state.approved.get(&token_id).copied();
        let authorized = owner == Some(self.caller) || approved == Some(self.caller);
        if owner != Some(from) || !authorized {
            return Err(reverted(state.chain.block));
        }
        state.owners.insert(token_id, to);
        state.approved.remove(&token_id);
        let tx = state.chain.mine();
        let Erc721State {
            chain, transfers, ..
        } = &mut *state;
        chain.emit(
            transfers,
            IERC721::Transfer {
                from,
                to,
                tokenId: token_id,
            },
            &tx,
        );
        Ok(tx)
    }

    async fn transfer_events(
        &self,
        from: Address,
        to: Address,
        token_id: U256,
    ) -> Result<EventLogs<IERC721::Transfer>, ChainClientError> {
        let mut state = self.state.lock().unwrap();
        Ok(query(&mut state.transfers, |e| {
            e.from == from && e.to == to && e.tokenId == token_id
        }))
    }

    async fn approval_events(
        &self,
        owner: Address,
        approved: Address,
        token_id: U256,
    ) -> Result<EventLogs<IERC721::Approval>, ChainClientError> {
        let mut state = self.state.lock().unwrap();
        Ok(query(&mut state.approvals, |e| {
            e.owner == owner && e.approved == approved && e.tokenId == token_id
        }))
    }
}
