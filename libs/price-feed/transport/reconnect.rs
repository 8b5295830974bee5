use std::time::Duration;

/// Decides whether and when to reconnect after the stream drops.
///
/// `attempt` is 0-indexed and counts consecutive failures; the client resets
/// it to 0 after every successful connection.
pub trait ReconnectionStrategy: Send + Sync {
    /// Delay before the next attempt, or `None` to give up
    fn next_delay(&self, attempt: usize) -> Option<Duration>;

    fn should_reconnect(&self, attempt: usize) -> bool;
}

/// `initial_delay * 2^attempt`, capped at `max_delay`
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    initial_delay: Duration,
    max_delay: Duration,
    max_attempts: Option<usize>,
}

impl ExponentialBackoff {
    /// # Arguments
    /// * `initial_delay` - Delay before the first reconnect
    /// * `max_delay` - Upper bound for any single delay
    /// * `max_attempts` - Give up after this many attempts (None = never)
    pub fn new(initial_delay: Duration, max_delay: Duration, max_attempts: Option<usize>) -> Self {
        Self {
            initial_delay,
            max_delay,
            max_attempts,
        }
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }
}

impl ReconnectionStrategy for ExponentialBackoff {
    fn next_delay(&self, attempt: usize) -> Option<Duration> {
        if !self.should_reconnect(attempt) {
            return None;
        }

        let initial_ms = self.initial_delay.as_millis() as u64;
        let factor = 1u64.checked_shl(attempt.min(63) as u32).unwrap_or(u64::MAX);
        let delay_ms = initial_ms.saturating_mul(factor);
        let capped = delay_ms.min(self.max_delay.as_millis() as u64);
        Some(Duration::from_millis(capped))
    }

    fn should_reconnect(&self, attempt: usize) -> bool {
        self.max_attempts.map_or(true, |max| attempt < max)
    }
}

/// Same delay for every attempt
#[derive(Debug, Clone)]
pub struct FixedDelay {
    delay: Duration,
    max_attempts: Option<usize>,
}

impl FixedDelay {
    pub fn new(delay: Duration, max_attempts: Option<usize>) -> Self {
        Self { delay, max_attempts }
    }
}

impl ReconnectionStrategy for FixedDelay {
    fn next_delay(&self, attempt: usize) -> Option<Duration> {
        self.should_reconnect(attempt).then_some(self.delay)
    }

    fn should_reconnect(&self, attempt: usize) -> bool {
        self.max_attempts.map_or(true, |max| attempt < max)
    }
}

/// One connection for the lifetime of the client; a drop is final.
#[derive(Debug, Clone, Default)]
pub struct NeverReconnect;

impl ReconnectionStrategy for NeverReconnect {
    fn next_delay(&self, _attempt: usize) -> Option<Duration> {
        None
    }

    fn should_reconnect(&self, _attempt: usize) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_doubles_until_cap() {
        let strategy =
            ExponentialBackoff::new(Duration::from_millis(500), Duration::from_secs(30), None);

        let delays: Vec<u64> = (0..8)
            .map(|i| strategy.next_delay(i).unwrap().as_millis() as u64)
            .collect();

        assert_eq!(delays, vec![500, 1000, 2000, 4000, 8000, 16000, 30000, 30000]);
    }

    #[test]
    fn test_exponential_large_attempt_does_not_overflow() {
        let strategy =
            ExponentialBackoff::new(Duration::from_millis(500), Duration::from_secs(30), None);

        assert_eq!(strategy.next_delay(200), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_exponential_respects_max_attempts() {
        let strategy =
            ExponentialBackoff::new(Duration::from_millis(100), Duration::from_secs(1), Some(2));

        assert!(strategy.next_delay(0).is_some());
        assert!(strategy.next_delay(1).is_some());
        assert!(strategy.next_delay(2).is_none());
    }

    #[test]
    fn test_never_reconnect() {
        assert!(NeverReconnect.next_delay(0).is_none());
        assert!(!NeverReconnect.should_reconnect(0));
    }
}
