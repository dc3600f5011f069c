// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ERC-721 approve / safeTransferFrom sequence.

use alloy::primitives::{Address, U256};
use tracing::{error, info};

use super::{await_events, ensure_owner, FlowOutcome, GuardFailure, NonFungibleToken};
use crate::blockchain::{ChainClientError, EventRecord, TxRecord, IERC721};
use crate::wait::RetryPolicy;

/// Everything observed during a completed ERC-721 run.
#[derive(Debug, Clone)]
pub struct Erc721Report {
    pub token_id: U256,
    pub initial_owner: Address,
    pub approve_tx: TxRecord,
    pub approval_events: Vec<EventRecord<IERC721::Approval>>,
    pub transfer_tx: TxRecord,
    pub transfer_events: Vec<EventRecord<IERC721::Transfer>>,
    pub final_owner: Address,
}

/// Runs the ERC-721 sequence: the sender approves the recipient for one
/// token, then the recipient pulls it with `safeTransferFrom`.
pub struct Erc721Workflow<'a, T> {
    as_sender: &'a T,
    as_recipient: &'a T,
    token_id: U256,
    log_wait: RetryPolicy,
}

impl<'a, T: NonFungibleToken> Erc721Workflow<'a, T> {
    pub fn new(
        as_sender: &'a T,
        as_recipient: &'a T,
        token_id: U256,
        log_wait: RetryPolicy,
    ) -> Self {
        Self {
            as_sender,
            as_recipient,
            token_id,
            log_wait,
        }
    }

    async fn guard_owner(&self, stage: &str) -> Result<Option<GuardFailure>, ChainClientError> {
        let sender = self.as_sender.holder();
        let owner = self.as_sender.owner_of(self.token_id).await?;
        info!(token_id = %self.token_id, owner = %owner, stage, "NFT owner");

        match ensure_owner(self.token_id, owner, sender) {
            Ok(()) => Ok(None),
            Err(failure) => {
                error!(%failure, stage, "Unexpected NFT owner");
                Ok(Some(failure))
            }
        }
    }

    pub async fn run(&self) -> Result<FlowOutcome<Erc721Report>, ChainClientError> {
        let sender = self.as_sender.holder();
        let recipient = self.as_recipient.holder();
        let token_id = self.token_id;

        if let Some(failure) = self.guard_owner("before approve").await? {
            return Ok(FlowOutcome::Aborted(failure));
        }

        info!(approved = %recipient, token_id = %token_id, "Approving NFT transfer");
        let approve_tx = self.as_sender.approve(recipient, token_id).await?;
        info!(
            tx_hash = %approve_tx.tx_hash,
            block = ?approve_tx.block_number,
            "Approval confirmed"
        );

        let approval_events = await_events(&self.log_wait, "Approval", &approve_tx, || {
            self.as_sender.approval_events(sender, recipient, token_id)
        })
        .await?;
        for record in &approval_events {
            info!(
                owner = %record.event.owner,
                approved = %record.event.approved,
                token_id = %record.event.tokenId,
                tx_hash = ?record.tx_hash,
                "Approval event"
            );
        }

        if let Some(failure) = self.guard_owner("before transfer").await? {
            return Ok(FlowOutcome::Aborted(failure));
        }

        info!(
            operator = %recipient,
            from = %sender,
            to = %recipient,
            token_id = %token_id,
            "Transferring NFT with safeTransferFrom"
        );
        let transfer_tx = self
            .as_recipient
            .safe_transfer_from(sender, recipient, token_id)
            .await?;
        info!(
            tx_hash = %transfer_tx.tx_hash,
            block = ?transfer_tx.block_number,
            "Transfer confirmed"
        );

        let transfer_events = await_events(&self.log_wait, "Transfer", &transfer_tx, || {
            self.as_sender.transfer_events(sender, recipient, token_id)
        })
        .await?;
        for record in &transfer_events {
            info!(
                from = %record.event.from,
                to = %record.event.to,
                token_id = %record.event.tokenId,
                tx_hash = ?record.tx_hash,
                "Transfer event"
            );
        }

        let final_owner = self.as_sender.owner_of(token_id).await?;
        info!(token_id = %token_id, owner = %final_owner, "Final NFT owner");

        Ok(FlowOutcome::Completed(Erc721Report {
            token_id,
            initial_owner: sender,
            approve_tx,
            approval_events,
            transfer_tx,
            transfer_events,
            final_owner,
        }))
    }
}
