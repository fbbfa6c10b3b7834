//! Pacing and retry around any `SheetStore`.
//!
//! Remote spreadsheet APIs enforce per-minute quotas. `PacedStore` spaces
//! calls with a token bucket (one call per `min_interval`, up to `burst`
//! back-to-back) and retries calls that fail with a transient error using
//! capped exponential backoff. Non-transient errors pass straight through.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::clock::{Clock, DefaultClock};
use governor::{Quota, RateLimiter};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::store::{Rows, SheetStore};

type DirectRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PacingPolicy {
    pub enabled: bool,
    /// Minimum spacing between calls once the burst is spent.
    pub min_interval_ms: u64,
    /// Calls allowed back-to-back before spacing applies.
    pub burst: u32,
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            min_interval_ms: 1500,
            burst: 1,
        }
    }
}

impl PacingPolicy {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    fn quota(&self) -> Option<Quota> {
        if !self.enabled {
            return None;
        }
        let quota = Quota::with_period(Duration::from_millis(self.min_interval_ms))?;
        Some(quota.allow_burst(NonZeroU32::new(self.burst).unwrap_or(NonZeroU32::MIN)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryPolicy {
    /// Retries after the first attempt. 0 disables retrying.
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
            max_delay_ms: 30_000,
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Backoff before retry number `attempt` (0-based): base * 2^attempt, capped.
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        let ms = self.base_delay_ms.saturating_mul(factor).min(self.max_delay_ms);
        Duration::from_millis(ms)
    }
}

// ---------------------------------------------------------------------------
// Pacer
// ---------------------------------------------------------------------------

type Sleeper = Box<dyn Fn(Duration) + Send + Sync>;

struct Pacer {
    limiter: Option<DirectRateLimiter>,
    clock: DefaultClock,
    retry: RetryPolicy,
    sleep: Sleeper,
}

impl Pacer {
    fn wait_for_permit(&self) {
        let Some(limiter) = &self.limiter else {
            return;
        };
        while let Err(not_until) = limiter.check() {
            (self.sleep)(not_until.wait_time_from(self.clock.now()));
        }
    }

    fn call<T>(&self, op: &str, mut f: impl FnMut() -> Result<T, StoreError>) -> Result<T, StoreError> {
        let mut attempt = 0;
        loop {
            self.wait_for_permit();
            match f() {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.retry.max_retries => {
                    let delay = self.retry.delay(attempt);
                    attempt += 1;
                    tracing::warn!(
                        op,
                        attempt,
                        max = self.retry.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transient store error, retrying"
                    );
                    (self.sleep)(delay);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// PacedStore
// ---------------------------------------------------------------------------

pub struct PacedStore<S> {
    inner: S,
    pacer: Pacer,
}

impl<S: SheetStore> PacedStore<S> {
    pub fn new(inner: S, pacing: &PacingPolicy, retry: &RetryPolicy) -> Self {
        let limiter = pacing.quota().map(RateLimiter::direct);
        if limiter.is_none() {
            tracing::debug!("store pacing disabled");
        }
        Self {
            inner,
            pacer: Pacer {
                limiter,
                clock: DefaultClock::default(),
                retry: retry.clone(),
                sleep: Box::new(std::thread::sleep),
            },
        }
    }

    /// Replace the sleep function used for pacing and backoff.
    pub fn with_sleeper(mut self, sleep: impl Fn(Duration) + Send + Sync + 'static) -> Self {
        self.pacer.sleep = Box::new(sleep);
        self
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: SheetStore> SheetStore for PacedStore<S> {
    fn list_tabs(&self, dataset: &str) -> Result<Vec<String>, StoreError> {
        self.pacer.call("list_tabs", || self.inner.list_tabs(dataset))
    }

    fn read_tab(&self, dataset: &str, tab: &str) -> Result<Rows, StoreError> {
        self.pacer.call("read_tab", || self.inner.read_tab(dataset, tab))
    }

    fn clear_tab(&mut self, dataset: &str, tab: &str) -> Result<(), StoreError> {
        let inner = &mut self.inner;
        self.pacer.call("clear_tab", || inner.clear_tab(dataset, tab))
    }

    fn write_tab(&mut self, dataset: &str, tab: &str, rows: &[Vec<String>]) -> Result<(), StoreError> {
        let inner = &mut self.inner;
        self.pacer.call("write_tab", || inner.write_tab(dataset, tab, rows))
    }

    fn create_tab(&mut self, dataset: &str, tab: &str) -> Result<(), StoreError> {
        let inner = &mut self.inner;
        self.pacer.call("create_tab", || inner.create_tab(dataset, tab))
    }

    fn create_dataset(&mut self, title: &str) -> Result<String, StoreError> {
        let inner = &mut self.inner;
        self.pacer.call("create_dataset", || inner.create_dataset(title))
    }
}
