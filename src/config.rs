// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values, and
//! builds the [`RunConfig`] passed explicitly into every workflow. A local
//! `.env` file is honoured if present.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `ETH_RPC_URL` | JSON-RPC endpoint | `http://localhost:8545` |
//! | `SENDER_PRIVATE_KEY` | Hex key of the deployer / sender | Required |
//! | `RECIPIENT_PRIVATE_KEY` | Hex key of the recipient | Required |
//! | `NEW_RECIPIENT_ADDRESS` | Final ERC-20 holder | `0x6145…42b8` |
//! | `CONTRACTS_DIR` | Directory holding `*.abi` / `*.bytecode` | `contracts` |
//! | `TRANSFER_AMOUNT` | ERC-20 amount in token units | `10` |
//! | `TOKEN_ID` | ERC-721 token to move | `0` |
//! | `DEPLOY_GAS_LIMIT` | Gas ceiling for deployments | `5000000` |
//! | `CALL_GAS_LIMIT` | Gas ceiling for token calls | `100000` |
//! | `LOG_WAIT_TIMEOUT_MS` | Deadline for event logs to appear | `15000` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::{address, Address, U256};

use crate::blockchain::{Account, AccountRole, ChainClient, GasLimits, NetworkConfig};
use crate::telemetry::LogFormat;
use crate::wait::RetryPolicy;

pub const RPC_URL_ENV: &str = "ETH_RPC_URL";
pub const SENDER_KEY_ENV: &str = "SENDER_PRIVATE_KEY";
pub const RECIPIENT_KEY_ENV: &str = "RECIPIENT_PRIVATE_KEY";
pub const NEW_RECIPIENT_ENV: &str = "NEW_RECIPIENT_ADDRESS";
pub const CONTRACTS_DIR_ENV: &str = "CONTRACTS_DIR";
pub const TRANSFER_AMOUNT_ENV: &str = "TRANSFER_AMOUNT";
pub const TOKEN_ID_ENV: &str = "TOKEN_ID";
pub const DEPLOY_GAS_LIMIT_ENV: &str = "DEPLOY_GAS_LIMIT";
pub const CALL_GAS_LIMIT_ENV: &str = "CALL_GAS_LIMIT";
pub const LOG_WAIT_TIMEOUT_ENV: &str = "LOG_WAIT_TIMEOUT_MS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Final holder in the ERC-20 transferFrom step.
pub const DEFAULT_NEW_RECIPIENT: Address = address!("0x614561D2d143621E126e87831AEF287678B442b8");

pub const DEFAULT_CONTRACTS_DIR: &str = "contracts";

/// ERC-20 amount moved at each step.
pub const DEFAULT_TRANSFER_AMOUNT: u64 = 10;

/// First token minted by the ERC-721 constructor.
pub const DEFAULT_TOKEN_ID: u64 = 0;

/// Everything a run needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub network: NetworkConfig,
    pub sender: Account,
    pub recipient: Account,
    pub new_recipient: Address,
    pub contracts_dir: PathBuf,
    pub transfer_amount: U256,
    pub token_id: U256,
    pub gas: GasLimits,
    pub log_wait: RetryPolicy,
    pub log_format: LogFormat,
}

impl RunConfig {
    /// Load `.env` (if any) and read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_dotenv()?;
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let rpc_url = get(RPC_URL_ENV).unwrap_or_else(|| NetworkConfig::default().rpc_url);
        url::Url::parse(&rpc_url).map_err(|e| invalid(RPC_URL_ENV, e))?;

        let sender = account(get(SENDER_KEY_ENV), SENDER_KEY_ENV, AccountRole::Sender)?;
        let recipient = account(
            get(RECIPIENT_KEY_ENV),
            RECIPIENT_KEY_ENV,
            AccountRole::Recipient,
        )?;

        let new_recipient = parse_or(
            get(NEW_RECIPIENT_ENV),
            NEW_RECIPIENT_ENV,
            DEFAULT_NEW_RECIPIENT,
        )?;
        let transfer_amount = parse_or(
            get(TRANSFER_AMOUNT_ENV),
            TRANSFER_AMOUNT_ENV,
            U256::from(DEFAULT_TRANSFER_AMOUNT),
        )?;
        let token_id = parse_or(get(TOKEN_ID_ENV), TOKEN_ID_ENV, U256::from(DEFAULT_TOKEN_ID))?;

        let defaults = GasLimits::default();
        let gas = GasLimits {
            deploy: parse_or(get(DEPLOY_GAS_LIMIT_ENV), DEPLOY_GAS_LIMIT_ENV, defaults.deploy)?,
            call: parse_or(get(CALL_GAS_LIMIT_ENV), CALL_GAS_LIMIT_ENV, defaults.call)?,
        };

        let mut log_wait = RetryPolicy::default();
        if let Some(ms) = get(LOG_WAIT_TIMEOUT_ENV) {
            let ms: u64 = ms.trim().parse().map_err(|e| invalid(LOG_WAIT_TIMEOUT_ENV, e))?;
            log_wait = log_wait.with_timeout(Duration::from_millis(ms));
        }

        let log_format = parse_or(get(LOG_FORMAT_ENV), LOG_FORMAT_ENV, LogFormat::default())?;

        Ok(Self {
            network: NetworkConfig { rpc_url },
            sender,
            recipient,
            new_recipient,
            contracts_dir: PathBuf::from(
                get(CONTRACTS_DIR_ENV).unwrap_or_else(|| DEFAULT_CONTRACTS_DIR.to_string()),
            ),
            transfer_amount,
            token_id,
            gas,
            log_wait,
            log_format,
        })
    }
}

/// Load the local `.env` if present. A missing file is not an error; a
/// file that does not parse is.
fn load_dotenv() -> Result<(), ConfigError> {
    dotenv_outcome(dotenvy::dotenv())
}

fn dotenv_outcome<T>(result: Result<T, dotenvy::Error>) -> Result<(), ConfigError> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(ConfigError::Dotenv(e.to_string())),
    }
}

fn account(
    raw: Option<String>,
    var: &'static str,
    role: AccountRole,
) -> Result<Account, ConfigError> {
    let raw = raw.ok_or(ConfigError::Missing(var))?;
    let signer = ChainClient::create_signer(&raw).map_err(|e| invalid(var, e))?;
    Ok(Account::new(role, signer))
}

fn parse_or<T>(raw: Option<String>, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value.trim().parse().map_err(|e| invalid(var, e)),
        None => Ok(default),
    }
}

fn invalid(var: &'static str, reason: impl std::fmt::Display) -> ConfigError {
    ConfigError::Invalid {
        var,
        reason: reason.to_string(),
    }
}

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("Failed to parse .env: {0}")]
    Dotenv(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SENDER_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const RECIPIENT_KEY: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn keys() -> Vec<(&'static str, &'static str)> {
        vec![(SENDER_KEY_ENV, SENDER_KEY), (RECIPIENT_KEY_ENV, RECIPIENT_KEY)]
    }

    #[test]
    fn defaults_apply_when_only_keys_are_set() {
        let config = RunConfig::from_lookup(lookup(&keys())).unwrap();

        assert_eq!(config.network.rpc_url, "http://localhost:8545");
        assert_eq!(
            config.sender.address(),
            address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
        assert_eq!(
            config.recipient.address(),
            address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8")
        );
        assert_eq!(config.recipient.role, AccountRole::Recipient);
        assert_eq!(config.new_recipient, DEFAULT_NEW_RECIPIENT);
        assert_eq!(config.contracts_dir, PathBuf::from("contracts"));
        assert_eq!(config.transfer_amount, U256::from(10u64));
        assert_eq!(config.token_id, U256::ZERO);
        assert_eq!(config.gas, GasLimits::default());
        assert_eq!(config.log_wait, RetryPolicy::default());
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn overrides_are_parsed() {
        let mut pairs = keys();
        pairs.extend([
            (RPC_URL_ENV, "http://127.0.0.1:59997"),
            (NEW_RECIPIENT_ENV, "0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC"),
            (CONTRACTS_DIR_ENV, "/tmp/artifacts"),
            (TRANSFER_AMOUNT_ENV, "25"),
            (TOKEN_ID_ENV, "3"),
            (DEPLOY_GAS_LIMIT_ENV, "6000000"),
            (CALL_GAS_LIMIT_ENV, " 120000 "),
            (LOG_WAIT_TIMEOUT_ENV, "500"),
            (LOG_FORMAT_ENV, "json"),
        ]);
        let config = RunConfig::from_lookup(lookup(&pairs)).unwrap();

        assert_eq!(config.network.rpc_url, "http://127.0.0.1:59997");
        assert_eq!(
            config.new_recipient,
            address!("0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC")
        );
        assert_eq!(config.contracts_dir, PathBuf::from("/tmp/artifacts"));
        assert_eq!(config.transfer_amount, U256::from(25u64));
        assert_eq!(config.token_id, U256::from(3u64));
        assert_eq!(config.gas.deploy, 6_000_000);
        assert_eq!(config.gas.call, 120_000);
        assert_eq!(config.log_wait.timeout, Duration::from_millis(500));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn missing_key_is_reported() {
        let err = RunConfig::from_lookup(lookup(&[(SENDER_KEY_ENV, SENDER_KEY)])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(RECIPIENT_KEY_ENV)));

        // Blank counts as missing.
        let err = RunConfig::from_lookup(lookup(&[
            (SENDER_KEY_ENV, "  "),
            (RECIPIENT_KEY_ENV, RECIPIENT_KEY),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing(SENDER_KEY_ENV)));
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let cases = [
            (SENDER_KEY_ENV, "0x1234"),
            (RPC_URL_ENV, "localhost without scheme"),
            (TRANSFER_AMOUNT_ENV, "ten"),
            (NEW_RECIPIENT_ENV, "0xnothex"),
            (CALL_GAS_LIMIT_ENV, "-1"),
            (LOG_FORMAT_ENV, "xml"),
        ];

        for (var, value) in cases {
            let mut pairs = keys();
            pairs.retain(|(k, _)| *k != var);
            pairs.push((var, value));

            match RunConfig::from_lookup(lookup(&pairs)) {
                Err(ConfigError::Invalid { var: reported, .. }) => assert_eq!(reported, var),
                other => panic!("{var}={value}: unexpected result {other:?}"),
            }
        }
    }

    #[test]
    fn absent_dotenv_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let result = dotenvy::from_path(dir.path().join(".env"));
        assert!(dotenv_outcome(result).is_ok());
    }

    #[test]
    fn unparsable_dotenv_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "NOT A VALID LINE\n").unwrap();

        let err = dotenv_outcome(dotenvy::from_path(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Dotenv(_)));
        assert!(err.to_string().starts_with("Failed to parse .env"));
    }
}
