//! Reconnect delay schedule.

use std::time::Duration;

use crate::config::StreamConfig;

/// Bounded exponential backoff.
///
/// The first retry waits `base`, each further consecutive failure doubles the
/// wait up to `max`, and after `max_attempts` consecutive failures the policy
/// gives up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub base: Duration,
    pub max: Duration,
    pub max_attempts: u32,
}

impl ReconnectPolicy {
    pub fn new(base: Duration, max: Duration, max_attempts: u32) -> Self {
        Self {
            base,
            max: max.max(base),
            max_attempts,
        }
    }

    /// Delay before retry number `attempt` (0-based), or `None` once exhausted.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        Some(self.base.saturating_mul(factor).min(self.max))
    }
}

impl From<&StreamConfig> for ReconnectPolicy {
    fn from(config: &StreamConfig) -> Self {
        Self::new(
            config.reconnect_delay(),
            config.max_reconnect_delay(),
            config.max_reconnect_attempts,
        )
    }
}

/// Tracks consecutive failures against a [`ReconnectPolicy`].
#[derive(Debug)]
pub(crate) struct Backoff {
    policy: ReconnectPolicy,
    attempt: u32,
}

impl Backoff {
    pub(crate) fn new(policy: ReconnectPolicy) -> Self {
        Self { policy, attempt: 0 }
    }

    /// Called after a connection was established.
    pub(crate) fn reset(&mut self) {
        self.attempt = 0;
    }

    pub(crate) fn next_delay(&mut self) -> Option<Duration> {
        let delay = self.policy.delay_for(self.attempt)?;
        self.attempt += 1;
        Some(delay)
    }

    pub(crate) fn attempt(&self) -> u32 {
        self.attempt
    }
}
