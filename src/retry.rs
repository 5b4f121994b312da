//! Retry policy for transient server errors.
//!
//! Only HTTP 5xx responses are retried. Each retry waits twice as long as the
//! previous one, starting from the base backoff. A cap and jitter can be
//! switched on, but both are off by default so the delay sequence stays
//! `base, 2 * base, 4 * base, ...`.

use rand::Rng;
use std::time::Duration;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default delay before the first retry.
pub const DEFAULT_BASE_BACKOFF: Duration = Duration::from_millis(500);

/// What the retry loop does after an attempt produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Hand the response to the caller.
    Return,
    /// Discard the response and try again after the backoff delay.
    Retry,
}

/// Defines when and how long to wait before retrying.
///
/// # Examples
///
/// ```
/// use restline::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new(3, Duration::from_millis(500));
///
/// assert_eq!(policy.delay_for_retry(1), Duration::from_millis(500));
/// assert_eq!(policy.delay_for_retry(2), Duration::from_millis(1000));
/// assert_eq!(policy.delay_for_retry(3), Duration::from_millis(2000));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries permitted after the first attempt.
    pub max_retries: u32,
    /// The delay before the first retry.
    pub base_backoff: Duration,
    /// Upper bound on a single delay. `None` means uncapped.
    pub max_backoff: Option<Duration>,
    /// Scale each delay by a random factor between 50% and 100%.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, DEFAULT_BASE_BACKOFF)
    }
}

impl RetryPolicy {
    /// Creates an uncapped, jitter-free policy.
    pub fn new(max_retries: u32, base_backoff: Duration) -> Self {
        Self {
            max_retries,
            base_backoff,
            max_backoff: None,
            jitter: false,
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Caps every delay at `max_backoff`.
    pub fn with_max_backoff(mut self, max_backoff: Duration) -> Self {
        self.max_backoff = Some(max_backoff);
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Decides what to do with a response carrying `status`.
    ///
    /// `retries_made` counts retries already performed, so it is `0` after the
    /// first attempt.
    pub fn classify(&self, status: u16, retries_made: u32) -> Decision {
        if is_retryable_status(status) && retries_made < self.max_retries {
            Decision::Retry
        } else {
            Decision::Return
        }
    }

    /// Returns the delay before the given retry (1-indexed, so 1 = first retry).
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let mut delay = self.base_backoff;
        for _ in 1..retry {
            delay = delay.saturating_mul(2);
            if self.max_backoff.is_some_and(|cap| delay >= cap) {
                break;
            }
        }
        if let Some(cap) = self.max_backoff {
            delay = delay.min(cap);
        }

        if self.jitter {
            let factor = rand::thread_rng().gen_range(0.5..=1.0);
            delay.mul_f64(factor)
        } else {
            delay
        }
    }
}

/// Returns `true` for statuses in `[500, 600)`.
pub fn is_retryable_status(status: u16) -> bool {
    (500..600).contains(&status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doubling_delays() {
        let policy = RetryPolicy::new(5, Duration::from_millis(100));

        assert_eq!(policy.delay_for_retry(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for_retry(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for_retry(3), Duration::from_millis(400));
        assert_eq!(policy.delay_for_retry(4), Duration::from_millis(800));
        assert_eq!(policy.delay_for_retry(5), Duration::from_millis(1600));
    }

    #[test]
    fn test_capped_delays() {
        let policy =
            RetryPolicy::new(5, Duration::from_millis(100)).with_max_backoff(Duration::from_millis(300));

        assert_eq!(policy.delay_for_retry(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for_retry(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for_retry(3), Duration::from_millis(300));
        assert_eq!(policy.delay_for_retry(40), Duration::from_millis(300));
    }

    #[test]
    fn test_uncapped_delay_saturates() {
        let policy = RetryPolicy::new(200, Duration::from_secs(1));
        assert_eq!(policy.delay_for_retry(200), Duration::MAX);
    }

    #[test]
    fn test_jitter_stays_within_half_to_full() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1000)).with_jitter(true);

        for _ in 0..50 {
            let delay = policy.delay_for_retry(1);
            assert!(delay >= Duration::from_millis(500));
            assert!(delay <= Duration::from_millis(1000));
        }
    }

    #[test]
    fn test_classify() {
        let policy = RetryPolicy::new(2, Duration::from_millis(10));

        assert_eq!(policy.classify(500, 0), Decision::Retry);
        assert_eq!(policy.classify(599, 1), Decision::Retry);
        assert_eq!(policy.classify(503, 2), Decision::Return);
        assert_eq!(policy.classify(200, 0), Decision::Return);
        assert_eq!(policy.classify(404, 0), Decision::Return);
        assert_eq!(policy.classify(429, 0), Decision::Return);
        assert_eq!(policy.classify(600, 0), Decision::Return);
    }

    #[test]
    fn test_no_retry() {
        let policy = RetryPolicy::none();
        assert_eq!(policy.classify(500, 0), Decision::Return);
    }
}
