// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use evm_token_demo::{
    config::RunConfig,
    runner::{report_outcome, run_erc20_demo},
    telemetry::init_tracing,
};

#[tokio::main]
async fn main() {
    let config = RunConfig::from_env();
    init_tracing(config.as_ref().map(|c| c.log_format).unwrap_or_default());

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    match run_erc20_demo(&config).await {
        // A failed guard is a clean stop, not a crash.
        Ok(outcome) => {
            report_outcome("erc20", &outcome);
        }
        Err(e) => {
            tracing::error!(error = %e, preflight = e.is_preflight(), "ERC20 demo failed");
            std::process::exit(1);
        }
    }
}
