//! Elapsed-time gate that turns wall-clock polling into discrete ticks.

use std::time::Duration;

/// Accumulates elapsed time and releases ticks at a fixed interval.
///
/// At most one tick is released per poll. Time beyond a single pending tick
/// is discarded so a stalled caller never triggers a burst of catch-up ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickClock {
    interval: Duration,
    accumulated: Duration,
}

impl TickClock {
    /// Creates a clock releasing one tick per `interval`.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            accumulated: Duration::ZERO,
        }
    }

    /// Adds `elapsed` and reports whether a tick is due.
    pub fn advance(&mut self, elapsed: Duration) -> bool {
        if self.interval.is_zero() {
            return true;
        }

        self.accumulated = self.accumulated.saturating_add(elapsed);
        if self.accumulated < self.interval {
            return false;
        }

        let carry = self.accumulated - self.interval;
        self.accumulated = if carry >= self.interval {
            Duration::ZERO
        } else {
            carry
        };
        true
    }

    /// Time left until the next tick is due.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.interval.saturating_sub(self.accumulated)
    }
}
