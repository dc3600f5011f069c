// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Eventual Consistency Wait
//!
//! Nodes index logs some time after a receipt becomes available. Instead of
//! sleeping for a fixed period, callers poll a check until its result
//! satisfies a condition or a deadline passes.
//!
//! ## Strategy
//!
//! 1. Run the check. A check error is returned immediately.
//! 2. If `ready(&value)` holds, return [`Settled::Ready`].
//! 3. Otherwise sleep, doubling the delay up to `max_delay`, and retry.
//! 4. Once `timeout` has elapsed, return [`Settled::TimedOut`] with the last
//!    observed value so the caller can still report it.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

/// Default first delay between checks.
const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(250);

/// Default ceiling for the delay between checks.
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(2);

/// Default overall deadline.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Backoff schedule for [`wait_until`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: DEFAULT_INITIAL_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl RetryPolicy {
    /// Same backoff, different deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn next_delay(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max_delay)
    }
}

/// Result of a wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settled<T> {
    /// The condition held after `attempts` checks.
    Ready { value: T, attempts: u32 },
    /// The deadline passed; `value` is the last check result.
    TimedOut { value: T, attempts: u32 },
}

impl<T> Settled<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Settled::Ready { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            Settled::Ready { attempts, .. } | Settled::TimedOut { attempts, .. } => *attempts,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Settled::Ready { value, .. } | Settled::TimedOut { value, .. } => value,
        }
    }
}

/// Poll `check` until `ready` accepts its output or the policy deadline passes.
pub async fn wait_until<T, E, F, Fut, R>(
    policy: &RetryPolicy,
    mut check: F,
    ready: R,
) -> Result<Settled<T>, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&T) -> bool,
{
    let deadline = Instant::now() + policy.timeout;
    let mut delay = policy.initial_delay;
    let mut attempts = 0u32;

    loop {
        let value = check().await?;
        attempts += 1;

        if ready(&value) {
            return Ok(Settled::Ready { value, attempts });
        }

        let now = Instant::now();
        if now >= deadline {
            tracing::debug!(attempts, "Wait deadline reached");
            return Ok(Settled::TimedOut { value, attempts });
        }

        // Never sleep past the deadline; the last check runs right at it.
        let sleep_for = delay.min(deadline - now);
        tracing::trace!(
            attempts,
            delay_ms = sleep_for.as_millis() as u64,
            "Condition not met, retrying"
        );
        tokio::time::sleep(sleep_for).await;
        delay = policy.next_delay(delay);
    }
}
