// Reconnect policy and the single pending reconnect deadline.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectPolicy {
    /// Same delay every time, no attempt limit.
    Fixed { delay: Duration },
    /// Delay doubles per attempt up to `max_delay`; gives up after `max_attempts`.
    Backoff {
        base: Duration,
        max_delay: Duration,
        max_attempts: u32,
    },
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        ReconnectPolicy::Backoff {
            base: Duration::from_millis(3000),
            max_delay: Duration::from_secs(30),
            max_attempts: 10,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before retry number `attempt` (0-based), or `None` once retries are exhausted.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        match *self {
            ReconnectPolicy::Fixed { delay } => Some(delay),
            ReconnectPolicy::Backoff {
                base,
                max_delay,
                max_attempts,
            } => {
                if attempt >= max_attempts {
                    return None;
                }
                let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
                Some(base.saturating_mul(factor).min(max_delay))
            }
        }
    }

    pub fn max_attempts(&self) -> Option<u32> {
        match *self {
            ReconnectPolicy::Fixed { .. } => None,
            ReconnectPolicy::Backoff { max_attempts, .. } => Some(max_attempts),
        }
    }
}

/// Holds at most one reconnect deadline. Scheduling replaces it; connecting or shutting
/// down clears it.
#[derive(Debug, Clone)]
pub struct ReconnectSchedule {
    policy: ReconnectPolicy,
    attempt: u32,
    deadline: Option<Instant>,
}

impl ReconnectSchedule {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            attempt: 0,
            deadline: None,
        }
    }

    pub fn policy(&self) -> ReconnectPolicy {
        self.policy
    }

    /// Schedules the next retry. Returns the delay, or `None` when the policy gave up.
    pub fn schedule(&mut self, now: Instant) -> Option<Duration> {
        let Some(delay) = self.policy.delay_for(self.attempt) else {
            self.deadline = None;
            return None;
        };
        self.attempt += 1;
        self.deadline = Some(now + delay);
        Some(delay)
    }

    /// True once when the pending deadline has passed; the deadline is consumed.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// A successful connection starts the attempt count over.
    pub fn reset(&mut self) {
        self.deadline = None;
        self.attempt = 0;
    }

    pub fn pending(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn attempts(&self) -> u32 {
        self.attempt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_backoff_grows_then_delay_is_capped_and_attempts_run_out() {
        let policy = ReconnectPolicy::default();
        let delays: Vec<Option<u64>> = (0..11)
            .map(|attempt| policy.delay_for(attempt).map(|d| d.as_millis() as u64))
            .collect();
        assert_eq!(
            delays,
            vec![
                Some(3000),
                Some(6000),
                Some(12000),
                Some(24000),
                Some(30000),
                Some(30000),
                Some(30000),
                Some(30000),
                Some(30000),
                Some(30000),
                None
            ]
        );
    }

    #[test]
    fn when_fixed_policy_is_used_then_retries_never_stop() {
        let policy = ReconnectPolicy::Fixed {
            delay: Duration::from_millis(3000),
        };
        assert_eq!(policy.delay_for(10_000), Some(Duration::from_millis(3000)));
        assert_eq!(policy.max_attempts(), None);
    }

    #[test]
    fn when_scheduled_repeatedly_then_only_one_deadline_is_pending() {
        let now = Instant::now();
        let mut schedule = ReconnectSchedule::new(ReconnectPolicy::Fixed {
            delay: Duration::from_millis(3000),
        });

        for round in 0..5u64 {
            schedule.schedule(now + Duration::from_millis(round));
        }

        assert_eq!(
            schedule.pending(),
            Some(now + Duration::from_millis(4) + Duration::from_millis(3000))
        );
        assert!(!schedule.take_due(now + Duration::from_millis(3003)));
        assert!(schedule.take_due(now + Duration::from_millis(3004)));
        assert!(!schedule.take_due(now + Duration::from_millis(9000)));
        assert_eq!(schedule.pending(), None);
    }

    #[test]
    fn when_cancelled_then_nothing_fires() {
        let now = Instant::now();
        let mut schedule = ReconnectSchedule::new(ReconnectPolicy::default());
        schedule.schedule(now);
        schedule.cancel();
        assert!(!schedule.take_due(now + Duration::from_secs(60)));
    }
}
