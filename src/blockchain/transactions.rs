// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Contract deployment and transaction confirmation.

use alloy::{
    network::{Ethereum, TransactionBuilder},
    providers::{PendingTransactionBuilder, Provider},
    rpc::types::{TransactionReceipt, TransactionRequest},
};

use super::artifact::ContractArtifact;
use super::client::ChainClientError;
use super::types::{Deployment, TxRecord};

/// Wait for a submitted transaction's receipt.
///
/// A mined transaction whose receipt reports failure is turned into
/// [`ChainClientError::TransactionReverted`].
pub async fn confirm(
    pending: PendingTransactionBuilder<Ethereum>,
) -> Result<TxRecord, ChainClientError> {
    tracing::debug!(tx_hash = %pending.tx_hash(), "Waiting for receipt");
    let (_, record) = mined(pending).await?;
    Ok(record)
}

async fn mined(
    pending: PendingTransactionBuilder<Ethereum>,
) -> Result<(TransactionReceipt, TxRecord), ChainClientError> {
    let tx_hash = *pending.tx_hash();
    let receipt = pending.get_receipt().await.map_err(|e| {
        ChainClientError::TransactionFailed(format!("Failed to confirm {tx_hash:#x}: {}", e))
    })?;

    let record = check_receipt(&receipt)?;
    Ok((receipt, record))
}

/// Summarize a receipt, failing if the transaction reverted.
pub(crate) fn check_receipt(receipt: &TransactionReceipt) -> Result<TxRecord, ChainClientError> {
    let record = TxRecord::from(receipt);
    if !record.success {
        return Err(ChainClientError::TransactionReverted {
            tx_hash: format!("{:#x}", record.tx_hash),
        });
    }
    Ok(record)
}

/// Submit a contract-creation transaction and wait until it is mined.
///
/// Deployment is attempted exactly once; a rejected or reverted creation
/// aborts the run.
pub async fn deploy_contract<P: Provider>(
    provider: &P,
    artifact: &ContractArtifact,
    gas_limit: u64,
) -> Result<Deployment, ChainClientError> {
    let tx = TransactionRequest::default()
        .with_deploy_code(artifact.bytecode.clone())
        .with_gas_limit(gas_limit);

    tracing::info!(
        artifact = %artifact.name,
        gas_limit,
        "Deploying contract"
    );

    let pending = provider.send_transaction(tx).await.map_err(|e| {
        ChainClientError::TransactionFailed(format!("Failed to send deployment: {}", e))
    })?;

    tracing::info!(tx_hash = %pending.tx_hash(), "Waiting for contract deployment");

    let (receipt, record) = mined(pending).await?;
    let tx_hash = record.tx_hash;

    let address = receipt
        .contract_address
        .ok_or_else(|| ChainClientError::MissingContractAddress {
            tx_hash: format!("{tx_hash:#x}"),
        })?;

    Ok(Deployment {
        address,
        block_number: record.block_number.unwrap_or_default(),
        receipt: record,
    })
}
