use rand::Rng;
use std::thread;
use std::time::Duration;
use tracing::trace;

/// Exponential backoff with jitter, used between polling lock attempts.
///
/// Every wait multiplies the delay by a uniformly random factor in
/// `[1.0, 2.0)`, so if the current delay is `d` the next one lies in
/// `[d, 2d)`. The jitter keeps independent waiters from retrying in
/// lockstep. Growth has no bound unless [`with_max`](Backoff::with_max)
/// sets one.
///
/// A `Backoff` belongs to a single blocking acquisition; state is never
/// shared across calls.
#[derive(Debug, Clone)]
pub struct Backoff {
    delay: Duration,
    max: Option<Duration>,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Backoff {
    /// Create a backoff starting at `initial`.
    pub fn new(initial: Duration) -> Self {
        Self {
            delay: initial,
            max: None,
        }
    }

    /// Clamp delay growth at `max`. The cap should be at least the
    /// initial delay.
    pub fn with_max(mut self, max: Duration) -> Self {
        self.max = Some(max);
        self
    }

    /// The length of the next sleep.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Advance the delay, returning the duration that was current before
    /// the step. Split out from [`sleep`](Backoff::sleep) so the growth
    /// sequence can be observed without blocking.
    pub fn next_delay(&mut self) -> Duration {
        let current = self.delay;
        let factor = rand::thread_rng().gen_range(1.0..2.0);
        let mut grown = current.mul_f64(factor);
        if let Some(max) = self.max {
            grown = grown.min(max);
        }
        self.delay = grown;
        current
    }

    /// Block the calling thread for the current delay, then grow it.
    pub fn sleep(&mut self) {
        let delay = self.next_delay();
        trace!("backing off for {:?}", delay);
        thread::sleep(delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_default_initial_delay_is_one_second() {
        assert_eq!(Backoff::default().delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_delays_grow_within_doubling_bounds() {
        let mut backoff = Backoff::new(Duration::from_millis(10));
        let mut prev = backoff.next_delay();
        assert_eq!(prev, Duration::from_millis(10));

        for _ in 0..32 {
            let next = backoff.next_delay();
            assert!(next >= prev, "delay shrank: {:?} -> {:?}", prev, next);
            // <= rather than < allows for nanosecond rounding at the top
            // of the [d, 2d) range
            assert!(next <= prev * 2, "delay overshot: {:?} -> {:?}", prev, next);
            prev = next;
        }
    }

    #[test]
    fn test_max_caps_growth() {
        let cap = Duration::from_millis(25);
        let mut backoff = Backoff::new(Duration::from_millis(10)).with_max(cap);
        for _ in 0..32 {
            backoff.next_delay();
            assert!(backoff.delay() <= cap);
        }
    }

    #[test]
    fn test_sleep_blocks_for_current_delay() {
        let initial = Duration::from_millis(20);
        let mut backoff = Backoff::new(initial);
        let start = Instant::now();
        backoff.sleep();
        assert!(start.elapsed() >= initial);
        assert!(backoff.delay() >= initial);
    }
}
