// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Event log queries.
//!
//! Builds an `eth_getLogs` filter for one event of one contract, narrowed by
//! indexed arguments, and decodes the returned logs on demand.

use std::marker::PhantomData;

use alloy::{
    eips::BlockNumberOrTag,
    primitives::{Address, B256},
    providers::Provider,
    rpc::types::{Filter, Log},
    sol_types::SolEvent,
};

use super::client::ChainClientError;

/// A decoded event together with where it was found.
#[derive(Debug, Clone)]
pub struct EventRecord<E> {
    /// Decoded event with named fields
    pub event: E,
    /// Transaction that emitted the log
    pub tx_hash: Option<B256>,
    /// Block containing the log
    pub block_number: Option<u64>,
}

/// Filter on one event type, narrowed by indexed arguments.
///
/// Topic positions follow the event declaration: `topic1` is the first
/// indexed parameter, `topic2` the second, `topic3` the third.
#[derive(Debug, Clone)]
pub struct EventQuery<E> {
    contract: Address,
    from_block: u64,
    topics: [Option<B256>; 3],
    _event: PhantomData<E>,
}

impl<E: SolEvent> EventQuery<E> {
    /// Match every `E` emitted by `contract`.
    pub fn new(contract: Address) -> Self {
        Self {
            contract,
            from_block: 0,
            topics: [None; 3],
            _event: PhantomData,
        }
    }

    /// Start scanning at `block` instead of genesis.
    pub fn from_block(mut self, block: u64) -> Self {
        self.from_block = block;
        self
    }

    /// Require the first indexed parameter to equal `address`.
    pub fn topic1(self, address: Address) -> Self {
        self.indexed(0, address.into_word())
    }

    /// Require the second indexed parameter to equal `address`.
    pub fn topic2(self, address: Address) -> Self {
        self.indexed(1, address.into_word())
    }

    /// Require the third indexed parameter to equal `value`.
    pub fn topic3(self, value: B256) -> Self {
        self.indexed(2, value)
    }

    fn indexed(mut self, position: usize, value: B256) -> Self {
        self.topics[position] = Some(value);
        self
    }

    /// Build the RPC filter, from the start block up to the chain head.
    pub fn filter(&self) -> Filter {
        let mut filter = Filter::new()
            .address(self.contract)
            .event_signature(E::SIGNATURE_HASH)
            .from_block(self.from_block)
            .to_block(BlockNumberOrTag::Latest);

        if let Some(topic) = self.topics[0] {
            filter = filter.topic1(topic);
        }
        if let Some(topic) = self.topics[1] {
            filter = filter.topic2(topic);
        }
        if let Some(topic) = self.topics[2] {
            filter = filter.topic3(topic);
        }
        filter
    }

    /// Run the query against `provider`.
    pub async fn fetch<P: Provider>(
        &self,
        provider: &P,
    ) -> Result<EventLogs<E>, ChainClientError> {
        let logs = provider
            .get_logs(&self.filter())
            .await
            .map_err(|e| ChainClientError::RpcError(format!("Failed to get logs: {}", e)))?;

        tracing::debug!(
            contract = %self.contract,
            event = E::SIGNATURE,
            from_block = self.from_block,
            count = logs.len(),
            "Fetched event logs"
        );

        Ok(EventLogs::from_logs(logs))
    }
}

/// Raw logs returned by a query; decoded lazily while iterating.
#[derive(Debug, Clone)]
pub struct EventLogs<E> {
    logs: Vec<Log>,
    _event: PhantomData<E>,
}

impl<E: SolEvent> EventLogs<E> {
    /// Wrap logs already fetched by some other means.
    pub fn from_logs(logs: Vec<Log>) -> Self {
        Self {
            logs,
            _event: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    /// Decode logs one at a time. Logs that do not decode as `E` are
    /// skipped with a warning.
    pub fn records(&self) -> impl Iterator<Item = EventRecord<E>> + '_ {
        self.logs.iter().filter_map(decode_record::<E>)
    }
}

impl<E: SolEvent> IntoIterator for EventLogs<E> {
    type Item = EventRecord<E>;
    type IntoIter = std::iter::FilterMap<std::vec::IntoIter<Log>, DecodeOwned<E>>;

    fn into_iter(self) -> Self::IntoIter {
        let decode: DecodeOwned<E> = |log| decode_record::<E>(&log);
        self.logs.into_iter().filter_map(decode)
    }
}

type DecodeOwned<E> = fn(Log) -> Option<EventRecord<E>>;

fn decode_record<E: SolEvent>(log: &Log) -> Option<EventRecord<E>> {
    match log.log_decode::<E>() {
        Ok(decoded) => Some(EventRecord {
            event: decoded.inner.data,
            tx_hash: log.transaction_hash,
            block_number: log.block_number,
        }),
        Err(e) => {
            tracing::warn!(
                event = E::SIGNATURE,
                tx_hash = ?log.transaction_hash,
                error = %e,
                "Skipping undecodable log"
            );
            None
        }
    }
}
