//! Minimum spacing between automatic responses.

use std::time::{Duration, Instant};

/// Tracks when the last automatic response was sent.
///
/// The clock only moves forward: marking an instant earlier than the last
/// recorded one is ignored.
#[derive(Debug, Clone)]
pub struct CooldownClock {
    last_response: Option<Instant>,
    interval: Duration,
}

impl CooldownClock {
    pub fn new(interval: Duration) -> Self {
        Self {
            last_response: None,
            interval,
        }
    }

    /// Whether a response may be sent at `now`.
    pub fn is_ready(&self, now: Instant) -> bool {
        match self.last_response {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        }
    }

    /// Record that a response was sent at `now`.
    pub fn mark(&mut self, now: Instant) {
        match self.last_response {
            Some(last) if last >= now => {}
            _ => self.last_response = Some(now),
        }
    }

    /// Time left until the next response is allowed.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.last_response {
            None => Duration::ZERO,
            Some(last) => self
                .interval
                .saturating_sub(now.saturating_duration_since(last)),
        }
    }

    pub fn last_response(&self) -> Option<Instant> {
        self.last_response
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}
