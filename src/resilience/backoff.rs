//! Exponential backoff with jitter.
//!
//! The delay starts at `initial_delay` and, after each wait, is multiplied by
//! `growth + U[0, jitter)`. With the defaults that factor lies in `[1.6, 1.9)`,
//! so consecutive delays strictly increase.

use std::time::Duration;
use rand::Rng;

/// Parameters for a backoff sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffConfig {
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Deterministic part of the growth factor. Must be greater than 1.
    pub growth: f64,
    /// Upper bound (exclusive) of the random part of the growth factor.
    pub jitter: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            growth: 1.6,
            jitter: 0.3,
        }
    }
}

impl BackoffConfig {
    /// Same growth parameters with a different starting delay.
    pub fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }
}

/// Per-call backoff state. Owned by a single in-flight call.
#[derive(Debug, Clone)]
pub struct Backoff {
    current: Duration,
    growth: f64,
    jitter: f64,
}

impl Backoff {
    pub fn new(config: &BackoffConfig) -> Self {
        // Zero or sub-unity values would break monotonic growth.
        let growth = if config.growth.is_finite() && config.growth > 1.0 { config.growth } else { 1.6 };
        let jitter = if config.jitter.is_finite() && config.jitter > 0.0 { config.jitter } else { 0.0 };
        Self {
            current: config.initial_delay.max(Duration::from_millis(1)),
            growth,
            jitter,
        }
    }

    /// Delay that the next wait will use.
    pub fn current(&self) -> Duration {
        self.current
    }

    /// Return the delay to wait now and grow the delay for the following wait.
    pub fn advance(&mut self) -> Duration {
        let delay = self.current;
        self.current = delay.mul_f64(self.next_factor());
        delay
    }

    fn next_factor(&self) -> f64 {
        if self.jitter == 0.0 {
            return self.growth;
        }
        self.growth + rand::thread_rng().gen_range(0.0..self.jitter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_delay_is_initial() {
        let mut backoff = Backoff::new(&BackoffConfig::default());
        assert_eq!(backoff.advance(), Duration::from_millis(500));
    }

    #[test]
    fn test_growth_within_bounds() {
        let mut backoff = Backoff::new(&BackoffConfig::default());
        let mut prev = backoff.advance();
        for _ in 0..20 {
            let next = backoff.advance();
            let factor = next.as_secs_f64() / prev.as_secs_f64();
            assert!(factor >= 1.6 - 1e-9, "factor {} below 1.6", factor);
            assert!(factor < 1.9 + 1e-9, "factor {} above 1.9", factor);
            prev = next;
        }
    }

    #[test]
    fn test_delays_strictly_increase() {
        let config = BackoffConfig::default().with_initial_delay(Duration::from_millis(1));
        let mut backoff = Backoff::new(&config);
        let delays: Vec<_> = (0..10).map(|_| backoff.advance()).collect();
        assert!(delays.windows(2).all(|w| w[1] > w[0]), "{:?}", delays);
    }

    #[test]
    fn test_degenerate_config_still_grows() {
        let config = BackoffConfig {
            initial_delay: Duration::ZERO,
            growth: 0.5,
            jitter: -1.0,
        };
        let mut backoff = Backoff::new(&config);
        let first = backoff.advance();
        assert_eq!(first, Duration::from_millis(1));
        assert!(backoff.advance() > first);
    }
}
