use std::time::{Duration, Instant};

/// Fixed-cadence tick deadlines for an explicit game loop.
///
/// The next deadline is only armed once the previous tick has been taken,
/// so ticks never overlap and a slow tick delays the rest rather than
/// bunching them up.
pub struct Ticker {
    interval: Duration,
    next: Option<Instant>,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Ticker { interval, next: None }
    }

    pub fn start(&mut self, now: Instant) {
        self.next = Some(now + self.interval);
    }

    pub fn stop(&mut self) {
        self.next = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next.is_some()
    }

    /// How long the loop may wait for input before the next tick is due.
    /// A stopped ticker waits a full interval.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.next {
            Some(next) => next.saturating_duration_since(now),
            None => self.interval,
        }
    }

    /// Consumes the pending deadline if it has passed and re-arms from `now`.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.next {
            Some(next) if now >= next => {
                self.next = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }
}
