//! # Fibonacci Backoff
//!
//! Progressive retry delays for failed reconciliations.
//!
//! Delays follow the Fibonacci sequence scaled by `min_secs` and are capped at `max_secs`:
//! with the defaults (5s, 300s) the sequence is 5, 5, 10, 15, 25, 40, 65, 105, 170, 275, 300.

/// Per-record Fibonacci backoff state
#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    min_secs: u64,
    max_secs: u64,
    previous: u64,
    current: u64,
    error_count: u32,
}

impl FibonacciBackoff {
    /// Create a new backoff bounded by `min_secs` and `max_secs`
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        let min_secs = min_secs.max(1);
        Self {
            min_secs,
            max_secs: max_secs.max(min_secs),
            previous: 0,
            current: 1,
            error_count: 0,
        }
    }

    /// Advance the sequence and return the next delay in seconds
    pub fn next_backoff_seconds(&mut self) -> u64 {
        let delay = self.current.saturating_mul(self.min_secs).min(self.max_secs);
        let next = self.previous.saturating_add(self.current);
        self.previous = self.current;
        self.current = next;
        self.error_count = self.error_count.saturating_add(1);
        delay
    }

    /// Return to the start of the sequence after a successful reconciliation
    pub fn reset(&mut self) {
        self.previous = 0;
        self.current = 1;
        self.error_count = 0;
    }

    /// Number of consecutive failures since the last reset
    pub fn error_count(&self) -> u32 {
        self.error_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_is_fibonacci_scaled_by_min() {
        let mut backoff = FibonacciBackoff::new(5, 300);
        let delays: Vec<u64> = (0..11).map(|_| backoff.next_backoff_seconds()).collect();
        assert_eq!(delays, vec![5, 5, 10, 15, 25, 40, 65, 105, 170, 275, 300]);
        assert_eq!(backoff.error_count(), 11);
    }

    #[test]
    fn test_capped_at_max() {
        let mut backoff = FibonacciBackoff::new(5, 300);
        for _ in 0..100 {
            assert!(backoff.next_backoff_seconds() <= 300);
        }
    }

    #[test]
    fn test_reset_restarts_sequence() {
        let mut backoff = FibonacciBackoff::new(5, 300);
        backoff.next_backoff_seconds();
        backoff.next_backoff_seconds();
        backoff.next_backoff_seconds();
        backoff.reset();
        assert_eq!(backoff.error_count(), 0);
        assert_eq!(backoff.next_backoff_seconds(), 5);
    }

    #[test]
    fn test_zero_min_is_clamped() {
        let mut backoff = FibonacciBackoff::new(0, 0);
        assert_eq!(backoff.next_backoff_seconds(), 1);
    }
}
