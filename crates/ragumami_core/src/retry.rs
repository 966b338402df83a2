//! Retry policy and per-call retry bookkeeping.

use derive_getters::Getters;
use ragumami_error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bounded exponential backoff for 5xx responses.
///
/// The delay before retry `n` (zero based) is `initial_backoff_ms * multiplier^n`,
/// capped at `max_backoff_ms`.
///
/// # Examples
///
/// ```
/// use ragumami_core::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::default();
/// let delays: Vec<Duration> = policy.delays().collect();
/// assert_eq!(delays.len(), 3);
/// assert_eq!(delays[0], Duration::from_millis(1000));
/// assert_eq!(delays[2], Duration::from_millis(4000));
/// assert_eq!(policy.total_attempts(), 4);
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_builder::Builder,
)]
#[builder(default)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    #[serde(default = "default_max_retries")]
    max_retries: u32,

    /// Delay before the first retry, in milliseconds.
    #[serde(default = "default_initial_backoff_ms")]
    initial_backoff_ms: u64,

    /// Growth factor between consecutive delays.
    #[serde(default = "default_multiplier")]
    multiplier: u32,

    /// Upper bound for any single delay, in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    max_backoff_ms: u64,
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    1000
}

fn default_multiplier() -> u32 {
    2
}

fn default_max_backoff_ms() -> u64 {
    30_000
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            multiplier: default_multiplier(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl RetryPolicy {
    /// Creates a new retry policy builder.
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::default()
    }

    /// Total attempts per logical call, the first one included.
    pub fn total_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Delays to wait before each retry, in order.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + Clone + use<> {
        let initial = self.initial_backoff_ms;
        let factor = u64::from(self.multiplier);
        let cap = self.max_backoff_ms;

        (0..self.max_retries).map(move |n| {
            let millis = initial.saturating_mul(factor.saturating_pow(n));
            Duration::from_millis(millis.min(cap))
        })
    }

    /// Reject policies whose delays would not strictly increase.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_backoff_ms == 0 {
            return Err(ConfigError::new("initial_backoff_ms must be greater than zero"));
        }
        if self.multiplier < 2 {
            return Err(ConfigError::new("backoff multiplier must be at least 2"));
        }

        let delays: Vec<Duration> = self.delays().collect();
        if delays.windows(2).any(|pair| pair[1] <= pair[0]) {
            return Err(ConfigError::new(format!(
                "max_backoff_ms {} caps the schedule before retry {}",
                self.max_backoff_ms, self.max_retries
            )));
        }

        Ok(())
    }
}

/// Attempt bookkeeping for one logical call.
///
/// Created fresh for every call and never shared between calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters)]
pub struct RetryState {
    /// Attempts started so far
    attempts: u32,
    /// Sum of backoff delays waited so far
    elapsed_backoff: Duration,
    /// Status of the most recent attempt that produced a response
    last_status: Option<u16>,
}

impl RetryState {
    /// Fresh state for a new logical call.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the start of an attempt. Returns the attempt number (1 based).
    pub fn begin_attempt(&mut self) -> u32 {
        self.attempts += 1;
        self.attempts
    }

    /// Record the status an attempt received.
    pub fn record_status(&mut self, status: u16) {
        self.last_status = Some(status);
    }

    /// Record a backoff delay about to be waited.
    pub fn record_backoff(&mut self, delay: Duration) {
        self.elapsed_backoff += delay;
    }
}
