// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ERC-20 transfer / approve / transferFrom sequence.

use alloy::primitives::{Address, U256};
use tracing::{error, info};

use super::{await_events, ensure_balance, FlowOutcome, FungibleToken};
use crate::blockchain::{ChainClientError, EventRecord, TxRecord, IERC20};
use crate::wait::RetryPolicy;

/// Token balances of the three parties at one point in the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Erc20Balances {
    pub sender: U256,
    pub recipient: U256,
    pub new_recipient: U256,
}

/// Everything observed during a completed ERC-20 run.
#[derive(Debug, Clone)]
pub struct Erc20Report {
    pub initial: Erc20Balances,
    pub transfer_tx: TxRecord,
    pub transfer_events: Vec<EventRecord<IERC20::Transfer>>,
    pub after_transfer: Erc20Balances,
    pub approve_tx: TxRecord,
    pub approval_events: Vec<EventRecord<IERC20::Approval>>,
    pub transfer_from_tx: TxRecord,
    pub transfer_from_events: Vec<EventRecord<IERC20::Transfer>>,
    pub after_transfer_from: Erc20Balances,
}

/// Runs the ERC-20 sequence.
///
/// `as_sender` and `as_recipient` are handles on the same token signing as
/// the sender and recipient respectively. The new recipient only receives.
pub struct Erc20Workflow<'a, T> {
    as_sender: &'a T,
    as_recipient: &'a T,
    new_recipient: Address,
    amount: U256,
    log_wait: RetryPolicy,
}

impl<'a, T: FungibleToken> Erc20Workflow<'a, T> {
    pub fn new(
        as_sender: &'a T,
        as_recipient: &'a T,
        new_recipient: Address,
        amount: U256,
        log_wait: RetryPolicy,
    ) -> Self {
        Self {
            as_sender,
            as_recipient,
            new_recipient,
            amount,
            log_wait,
        }
    }

    fn sender(&self) -> Address {
        self.as_sender.holder()
    }

    fn recipient(&self) -> Address {
        self.as_recipient.holder()
    }

    async fn balances(&self) -> Result<Erc20Balances, ChainClientError> {
        Ok(Erc20Balances {
            sender: self.as_sender.balance_of(self.sender()).await?,
            recipient: self.as_sender.balance_of(self.recipient()).await?,
            new_recipient: self.as_sender.balance_of(self.new_recipient).await?,
        })
    }

    pub async fn run(&self) -> Result<FlowOutcome<Erc20Report>, ChainClientError> {
        let (sender, recipient) = (self.sender(), self.recipient());
        let new_recipient = self.new_recipient;
        let amount = self.amount;

        let initial = self.balances().await?;
        info!(
            sender = %sender,
            sender_balance = %initial.sender,
            recipient = %recipient,
            recipient_balance = %initial.recipient,
            "ERC20 balances before transfer"
        );

        if let Err(failure) = ensure_balance(sender, initial.sender, amount) {
            error!(%failure, "Insufficient ERC20 balance for transfer");
            return Ok(FlowOutcome::Aborted(failure));
        }

        // transfer
        info!(amount = %amount, to = %recipient, "Transferring ERC20 tokens");
        let transfer_tx = self.as_sender.transfer(recipient, amount).await?;
        log_receipt("transfer", &transfer_tx);

        let transfer_events = await_events(&self.log_wait, "Transfer", &transfer_tx, || {
            self.as_sender.transfer_events(sender, recipient)
        })
        .await?;
        log_transfers("Transfer", &transfer_events);

        let after_transfer = self.balances().await?;
        info!(
            sender_balance = %after_transfer.sender,
            recipient_balance = %after_transfer.recipient,
            "ERC20 balances after transfer"
        );

        // approve
        info!(spender = %recipient, amount = %amount, "Approving spender on behalf of sender");
        let approve_tx = self.as_sender.approve(recipient, amount).await?;
        log_receipt("approve", &approve_tx);

        let approval_events = await_events(&self.log_wait, "Approval", &approve_tx, || {
            self.as_sender.approval_events(sender, recipient)
        })
        .await?;
        for record in &approval_events {
            info!(
                owner = %record.event.owner,
                spender = %record.event.spender,
                amount = %record.event.value,
                tx_hash = ?record.tx_hash,
                "Approval event"
            );
        }

        // transferFrom, signed by the recipient
        info!(
            new_recipient = %new_recipient,
            balance = %after_transfer.new_recipient,
            "New recipient ERC20 balance"
        );
        let sender_balance = self.as_sender.balance_of(sender).await?;
        if let Err(failure) = ensure_balance(sender, sender_balance, amount) {
            error!(%failure, "Insufficient ERC20 balance for transferFrom");
            return Ok(FlowOutcome::Aborted(failure));
        }

        info!(
            spender = %recipient,
            from = %sender,
            to = %new_recipient,
            amount = %amount,
            "Spender transferring tokens on behalf of sender"
        );
        let transfer_from_tx = self
            .as_recipient
            .transfer_from(sender, new_recipient, amount)
            .await?;
        log_receipt("transferFrom", &transfer_from_tx);

        let transfer_from_events =
            await_events(&self.log_wait, "Transfer", &transfer_from_tx, || {
                self.as_sender.transfer_events(sender, new_recipient)
            })
            .await?;
        log_transfers("TransferFrom", &transfer_from_events);

        let after_transfer_from = self.balances().await?;
        info!(
            sender_balance = %after_transfer_from.sender,
            new_recipient_balance = %after_transfer_from.new_recipient,
            "ERC20 balances after transferFrom"
        );

        Ok(FlowOutcome::Completed(Erc20Report {
            initial,
            transfer_tx,
            transfer_events,
            after_transfer,
            approve_tx,
            approval_events,
            transfer_from_tx,
            transfer_from_events,
            after_transfer_from,
        }))
    }
}

fn log_receipt(call: &str, tx: &TxRecord) {
    info!(
        call,
        tx_hash = %tx.tx_hash,
        block = ?tx.block_number,
        gas_used = tx.gas_used,
        logs = tx.log_count,
        "Transaction confirmed"
    );
}

fn log_transfers(label: &str, records: &[EventRecord<IERC20::Transfer>]) {
    if records.is_empty() {
        info!(label, "No matching Transfer events");
    }
    for record in records {
        info!(
            label,
            from = %record.event.from,
            to = %record.event.to,
            amount = %record.event.value,
            tx_hash = ?record.tx_hash,
            "Transfer event"
        );
    }
}
