// SPDX-License-Identifier: Apache-2.0

//! Bounded polling for an eventually-consistent randomness result.
//!
//! A fulfilled request only settles after the oracle's callback lands in a
//! later block, so a single read right after the request almost always sees
//! the in-flight state. [`poll_until_fulfilled`] retries the read on a fixed
//! interval until the result is usable or the attempt budget runs out.

use std::time::Duration;

use async_trait::async_trait;

/// One provider view of a randomness request.
///
/// `value` stays `None` until a status query has succeeded at least once.
/// The provider may flip `fulfilled` while the stored value is still the
/// not-ready sentinel; [`PollOutcome::is_terminal`] treats that as pending.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollOutcome {
    pub value: Option<u32>,
    pub fulfilled: bool,
}

impl PollOutcome {
    pub fn new(value: u32, fulfilled: bool) -> Self {
        Self {
            value: Some(value),
            fulfilled,
        }
    }

    /// The view before any status query has succeeded.
    pub fn pending() -> Self {
        Self {
            value: None,
            fulfilled: false,
        }
    }

    /// Whether this outcome ends a polling session: the fulfilled flag is
    /// set and the value has moved off the sentinel. Both checks are
    /// needed, the flag alone still races the oracle callback.
    pub fn is_terminal(&self, not_ready_sentinel: u32) -> bool {
        self.fulfilled && matches!(self.value, Some(v) if v != not_ready_sentinel)
    }
}

/// Retry budget for one polling session.
#[derive(Clone, Copy, Debug)]
pub struct PollConfig {
    /// Status queries before giving up, at least 1.
    pub max_attempts: u32,
    /// Pause before every attempt after the first.
    pub interval: Duration,
    /// Value the contract stores while the request is still in flight.
    pub not_ready_sentinel: u32,
}

impl Default for PollConfig {
    /// The budget the live cases run with: 100 queries, one per second,
    /// sentinel 999.
    fn default() -> Self {
        Self {
            max_attempts: 100,
            interval: Duration::from_secs(1),
            not_ready_sentinel: 999,
        }
    }
}

/// Read access to the current status of a request, keyed by a
/// caller-supplied handle.
#[async_trait]
pub trait StatusSource {
    type Handle: Sync;

    async fn status(&self, handle: &Self::Handle) -> anyhow::Result<PollOutcome>;
}

/// Queries `source` until the outcome is terminal or `config.max_attempts`
/// queries have run, sleeping `config.interval` between attempts.
///
/// A failed query is logged and counted like any other attempt; the session
/// itself never errors. On exhaustion the last outcome obtained is returned
/// (the pending outcome if every query failed) and the caller decides what
/// an unfulfilled result means.
pub async fn poll_until_fulfilled<S>(
    source: &S,
    handle: &S::Handle,
    config: &PollConfig,
) -> PollOutcome
where
    S: StatusSource + Sync,
{
    debug_assert!(config.max_attempts >= 1);

    let mut last = PollOutcome::pending();

    for attempt in 1..=config.max_attempts {
        if attempt > 1 {
            tokio::time::sleep(config.interval).await;
        }

        match source.status(handle).await {
            Ok(outcome) => {
                if outcome.is_terminal(config.not_ready_sentinel) {
                    log::info!(
                        "[{attempt}/{}] randomness fulfilled: {outcome:?}",
                        config.max_attempts
                    );
                    return outcome;
                }

                log::info!("[{attempt}/{}] result not ready yet", config.max_attempts);
                last = outcome;
            }
            Err(e) => {
                log::debug!(
                    "[{attempt}/{}] status query failed: {e:#}",
                    config.max_attempts
                );
            }
        }
    }

    log::warn!(
        "result still not ready after {} attempts, giving up",
        config.max_attempts
    );

    last
}
