// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Token Transfer Workflows
//!
//! Fixed transaction sequences run against a freshly deployed token. Each
//! step submits one transaction, waits for its receipt, then reads back the
//! resulting state.
//!
//! The runners are written against [`FungibleToken`] and
//! [`NonFungibleToken`] rather than the alloy bindings directly. One
//! implementation handle exists per signing account, so "acting as the
//! recipient" means calling through the recipient's handle.
//!
//! ## Guards
//!
//! Every balance-changing call is preceded by a guard read. A failed guard
//! stops the run with [`FlowOutcome::Aborted`] before anything is submitted.

pub mod erc20;
pub mod erc721;

#[cfg(test)]
pub(crate) mod testing;

use std::future::Future;

use alloy::primitives::{Address, U256};
use alloy::sol_types::SolEvent;

use crate::blockchain::{ChainClientError, EventLogs, EventRecord, TxRecord, IERC20, IERC721};
use crate::wait::{wait_until, RetryPolicy};

pub use erc20::{Erc20Balances, Erc20Report, Erc20Workflow};
pub use erc721::{Erc721Report, Erc721Workflow};

/// ERC-20 operations as seen by one signing account.
pub trait FungibleToken {
    /// Account that signs transactions sent through this handle.
    fn holder(&self) -> Address;

    fn balance_of(
        &self,
        owner: Address,
    ) -> impl Future<Output = Result<U256, ChainClientError>> + Send;

    fn transfer(
        &self,
        to: Address,
        amount: U256,
    ) -> impl Future<Output = Result<TxRecord, ChainClientError>> + Send;

    fn approve(
        &self,
        spender: Address,
        amount: U256,
    ) -> impl Future<Output = Result<TxRecord, ChainClientError>> + Send;

    fn transfer_from(
        &self,
        from: Address,
        to: Address,
        amount: U256,
    ) -> impl Future<Output = Result<TxRecord, ChainClientError>> + Send;

    /// Transfer logs with the given indexed `from` and `to`.
    fn transfer_events(
        &self,
        from: Address,
        to: Address,
    ) -> impl Future<Output = Result<EventLogs<IERC20::Transfer>, ChainClientError>> + Send;

    /// Approval logs with the given indexed `owner` and `spender`.
    fn approval_events(
        &self,
        owner: Address,
        spender: Address,
    ) -> impl Future<Output = Result<EventLogs<IERC20::Approval>, ChainClientError>> + Send;
}

/// ERC-721 operations as seen by one signing account.
pub trait NonFungibleToken {
    /// Account that signs transactions sent through this handle.
    fn holder(&self) -> Address;

    fn owner_of(
        &self,
        token_id: U256,
    ) -> impl Future<Output = Result<Address, ChainClientError>> + Send;

    fn approve(
        &self,
        to: Address,
        token_id: U256,
    ) -> impl Future<Output = Result<TxRecord, ChainClientError>> + Send;

    fn safe_transfer_from(
        &self,
        from: Address,
        to: Address,
        token_id: U256,
    ) -> impl Future<Output = Result<TxRecord, ChainClientError>> + Send;

    /// Transfer logs of `token_id` with the given indexed `from` and `to`.
    fn transfer_events(
        &self,
        from: Address,
        to: Address,
        token_id: U256,
    ) -> impl Future<Output = Result<EventLogs<IERC721::Transfer>, ChainClientError>> + Send;

    /// Approval logs of `token_id` with the given indexed `owner` and `approved`.
    fn approval_events(
        &self,
        owner: Address,
        approved: Address,
        token_id: U256,
    ) -> impl Future<Output = Result<EventLogs<IERC721::Approval>, ChainClientError>> + Send;
}

/// Why a run stopped before submitting a transaction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardFailure {
    #[error("Insufficient ERC20 balance for {holder}: have {balance}, need {required}")]
    InsufficientBalance {
        holder: Address,
        balance: U256,
        required: U256,
    },

    #[error("Unexpected owner of token {token_id}: expected {expected}, got {actual}")]
    UnexpectedOwner {
        token_id: U256,
        expected: Address,
        actual: Address,
    },
}

/// How a workflow run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome<R> {
    /// Every step ran.
    Completed(R),
    /// A guard failed; no further transactions were sent.
    Aborted(GuardFailure),
}

impl<R> FlowOutcome<R> {
    pub fn completed(self) -> Option<R> {
        match self {
            FlowOutcome::Completed(report) => Some(report),
            FlowOutcome::Aborted(_) => None,
        }
    }
}

/// Guard: `holder` owns at least `required`.
pub fn ensure_balance(holder: Address, balance: U256, required: U256) -> Result<(), GuardFailure> {
    if balance < required {
        return Err(GuardFailure::InsufficientBalance {
            holder,
            balance,
            required,
        });
    }
    Ok(())
}

/// Guard: `token_id` belongs to `expected`.
pub fn ensure_owner(
    token_id: U256,
    actual: Address,
    expected: Address,
) -> Result<(), GuardFailure> {
    if actual != expected {
        return Err(GuardFailure::UnexpectedOwner {
            token_id,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Poll an event query until it includes a log from `tx`, then decode the
/// last result for the report.
///
/// Running out of time is not fatal: whatever the last query returned is
/// handed back and a warning is logged.
pub(crate) async fn await_events<E, F, Fut>(
    policy: &RetryPolicy,
    event: &str,
    tx: &TxRecord,
    fetch: F,
) -> Result<Vec<EventRecord<E>>, ChainClientError>
where
    E: SolEvent,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<EventLogs<E>, ChainClientError>>,
{
    let settled = wait_until(policy, fetch, |logs: &EventLogs<E>| {
        logs.records().any(|r| r.tx_hash == Some(tx.tx_hash))
    })
    .await?;

    if !settled.is_ready() {
        tracing::warn!(
            event,
            tx_hash = %tx.tx_hash,
            attempts = settled.attempts(),
            "Expected event log not indexed before deadline"
        );
    }
    Ok(settled.into_value().into_iter().collect())
}
