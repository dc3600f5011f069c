// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EVM Token Demo - ERC-20 / ERC-721 walkthroughs against a JSON-RPC node
//!
//! Deploys a compiled token contract and drives it through the standard
//! transfer and approval flows with two signing accounts, checking
//! balances and ownership before each state change and reading back the
//! emitted events.
//!
//! ## Modules
//!
//! - `blockchain` - Node client, artifacts, contract bindings, event queries
//! - `workflow` - Token sequences and their guard checks
//! - `runner` - Deploy-then-run programs used by the binaries
//! - `config` - Environment configuration
//! - `wait` - Polling with backoff and a deadline
//! - `telemetry` - Logging setup

pub mod blockchain;
pub mod config;
pub mod error;
pub mod runner;
pub mod telemetry;
pub mod wait;
pub mod workflow;
