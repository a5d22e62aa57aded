//! Socket reconnection policy.

use std::time::Duration;

/// Whether and how the client reopens a closed socket.
///
/// Delays grow exponentially from `initial_delay`, capped at `max_delay`.
/// The attempt counter restarts whenever a socket opens successfully, so
/// `max_attempts` bounds consecutive failures, not the total over a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Reopen the socket after it closes.
    pub enabled: bool,
    /// Consecutive reconnect attempts before giving up.
    pub max_attempts: u32,
    /// Delay before the first attempt.
    pub initial_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 5,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl ReconnectPolicy {
    /// Policy that never reconnects.
    pub fn disabled() -> Self {
        Self { enabled: false, ..Self::default() }
    }

    /// Whether the given 1-based attempt may be made.
    pub fn allows(&self, attempt: u32) -> bool {
        self.enabled && (1..=self.max_attempts).contains(&attempt)
    }

    /// Delay before the given 1-based attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }
}
