//! Timeout retry policy.

use std::time::Duration;

/// Default number of retries after a timed-out attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default delay before the first retry.
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Exponential backoff for timed-out requests.
///
/// A request is attempted once, then retried up to `max_retries` times. The
/// delay before retry `n` (0-based) is `initial_backoff * 2^n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    /// Create a policy.
    #[must_use]
    pub const fn new(max_retries: u32, initial_backoff: Duration) -> Self {
        Self {
            max_retries,
            initial_backoff,
        }
    }

    /// The delays to wait before each retry, in order.
    pub fn delays(&self) -> impl Iterator<Item = Duration> {
        let initial = self.initial_backoff;
        (0..self.max_retries).map(move |n| initial.saturating_mul(2u32.saturating_pow(n)))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, DEFAULT_INITIAL_BACKOFF)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_double() {
        let policy = RetryPolicy::new(4, Duration::from_millis(250));
        let delays: Vec<_> = policy.delays().collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(250),
                Duration::from_millis(500),
                Duration::from_secs(1),
                Duration::from_secs(2),
            ]
        );
        assert!(delays.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn zero_retries_has_no_delays() {
        let policy = RetryPolicy::new(0, Duration::from_secs(1));
        assert_eq!(policy.delays().count(), 0);
    }

    #[test]
    fn large_exponents_saturate() {
        let policy = RetryPolicy::new(40, Duration::from_secs(1));
        assert_eq!(policy.delays().count(), 40);
        assert!(policy.delays().last().unwrap() >= Duration::from_secs(1 << 31));
    }
}
