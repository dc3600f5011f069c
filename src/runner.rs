// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Demo Runners
//!
//! End-to-end programs behind the `erc20-demo` and `erc721-demo` binaries:
//!
//! 1. Load and check the contract artifact (no network access yet).
//! 2. Connect one client per signing account.
//! 3. Deploy the contract from the sender and wait for its code to be
//!    visible on the node.
//! 4. Run the token workflow.

use alloy::primitives::Address;
use tracing::{info, warn};

use crate::blockchain::{
    deploy_contract, erc20::ERC20_REQUIRED_FUNCTIONS, erc721::ERC721_REQUIRED_FUNCTIONS,
    format_ether, ChainClient, ContractArtifact, Deployment, Erc20Contract, Erc721Contract,
};
use crate::config::RunConfig;
use crate::error::FlowError;
use crate::wait::wait_until;
use crate::workflow::{Erc20Report, Erc20Workflow, Erc721Report, Erc721Workflow, FlowOutcome};

pub const ERC20_ARTIFACT: &str = "erc20";
pub const ERC721_ARTIFACT: &str = "erc721";

/// Load an artifact and check it matches the binding that will drive it.
pub fn load_artifact(
    config: &RunConfig,
    name: &str,
    required: &[&str],
) -> Result<ContractArtifact, FlowError> {
    let artifact = ContractArtifact::load(&config.contracts_dir, name)?;
    artifact.require_functions(required)?;
    artifact.require_no_constructor_args()?;
    Ok(artifact)
}

/// Deploy `artifact` from `client` and wait until its code can be read back.
pub async fn deploy(
    client: &ChainClient,
    artifact: &ContractArtifact,
    config: &RunConfig,
) -> Result<Deployment, FlowError> {
    let deployment = deploy_contract(client.provider(), artifact, config.gas.deploy).await?;
    info!(
        address = %deployment.address,
        tx_hash = %deployment.receipt.tx_hash,
        block = deployment.block_number,
        gas_used = deployment.receipt.gas_used,
        "Contract deployed"
    );

    let code = wait_until(
        &config.log_wait,
        || client.get_code(deployment.address),
        |code| !code.is_empty(),
    )
    .await?;
    if !code.is_ready() {
        warn!(address = %deployment.address, "Contract code not visible yet, continuing");
    }

    Ok(deployment)
}

/// Deploy the ERC-20 token and run the transfer / approve / transferFrom sequence.
pub async fn run_erc20_demo(config: &RunConfig) -> Result<FlowOutcome<Erc20Report>, FlowError> {
    let artifact = load_artifact(config, ERC20_ARTIFACT, ERC20_REQUIRED_FUNCTIONS)?;

    let sender = ChainClient::connect(&config.network, &config.sender)?;
    let recipient = ChainClient::connect(&config.network, &config.recipient)?;
    info!(
        sender = %sender.address(),
        recipient = %recipient.address(),
        rpc_url = %sender.network().rpc_url,
        "Accounts loaded"
    );

    let native_before = sender.get_native_balance(sender.address()).await?;
    info!(balance_eth = %format_ether(native_before), "Native balance of sender");

    info!("Deploying ERC20 contract");
    let deployment = deploy(&sender, &artifact, config).await?;

    let as_sender = Erc20Contract::connect(&sender, &deployment, config.gas.call);
    let as_recipient = Erc20Contract::connect(&recipient, &deployment, config.gas.call);
    match (as_sender.name().await, as_sender.symbol().await) {
        (Ok(name), Ok(symbol)) => info!(%name, %symbol, "Token metadata"),
        _ => warn!("Token does not expose name/symbol"),
    }

    let outcome = Erc20Workflow::new(
        &as_sender,
        &as_recipient,
        config.new_recipient,
        config.transfer_amount,
        config.log_wait,
    )
    .run()
    .await?;

    let native_after = sender.get_native_balance(sender.address()).await?;
    info!(
        before_eth = %format_ether(native_before),
        after_eth = %format_ether(native_after),
        spent_eth = %format_ether(native_before.saturating_sub(native_after)),
        "Native balance of sender after all transactions"
    );

    Ok(outcome)
}

/// Deploy the ERC-721 collection and run the approve / safeTransferFrom sequence.
pub async fn run_erc721_demo(config: &RunConfig) -> Result<FlowOutcome<Erc721Report>, FlowError> {
    let artifact = load_artifact(config, ERC721_ARTIFACT, ERC721_REQUIRED_FUNCTIONS)?;

    let sender = ChainClient::connect(&config.network, &config.sender)?;
    let recipient = ChainClient::connect(&config.network, &config.recipient)?;
    info!(
        sender = %sender.address(),
        recipient = %recipient.address(),
        rpc_url = %sender.network().rpc_url,
        "Accounts loaded"
    );

    info!("Deploying ERC721 contract");
    let deployment = deploy(&sender, &artifact, config).await?;

    let as_sender = Erc721Contract::connect(&sender, &deployment, config.gas.call);
    let as_recipient = Erc721Contract::connect(&recipient, &deployment, config.gas.call);
    if let Ok(name) = as_sender.name().await {
        info!(%name, "Collection metadata");
    }

    let outcome = Erc721Workflow::new(&as_sender, &as_recipient, config.token_id, config.log_wait)
        .run()
        .await?;

    if let FlowOutcome::Completed(report) = &outcome {
        let approved = as_sender.get_approved(report.token_id).await?;
        if approved != Address::ZERO {
            warn!(token_id = %report.token_id, %approved, "Approval survived the transfer");
        }
    }

    Ok(outcome)
}

/// Log how a run ended. Returns `true` when every step ran.
pub fn report_outcome<R>(label: &str, outcome: &FlowOutcome<R>) -> bool {
    match outcome {
        FlowOutcome::Completed(_) => {
            info!(workflow = label, "Workflow completed");
            true
        }
        FlowOutcome::Aborted(failure) => {
            tracing::error!(workflow = label, %failure, "Workflow aborted");
            false
        }
    }
}
