use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior, interval};

/// Lower bound for the polling period, a zero period would spin.
const MIN_PERIOD: Duration = Duration::from_millis(100);

/// A fixed-period timer driving status polling.
///
/// There is no backoff or jitter. The first tick completes immediately. [`StatusPoller::reset`]
/// restarts the period so a command is followed by a fresh poll one period later instead of
/// whenever the previous schedule lands.
#[derive(Debug)]
pub struct StatusPoller {
    interval: Interval,
    period: Duration,
}

impl StatusPoller {
    pub fn new(period: Duration) -> Self {
        let period = period.max(MIN_PERIOD);
        let mut interval = interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self { interval, period }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    #[inline]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Waits for the next tick.
    pub async fn tick(&mut self) -> Instant {
        self.interval.tick().await
    }

    /// Restarts the period from now.
    pub fn reset(&mut self) {
        self.interval.reset();
    }

    /// Replaces the period, restarting the timer only if it changed.
    pub fn set_period(&mut self, period: Duration) {
        if period.max(MIN_PERIOD) != self.period {
            *self = StatusPoller::new(period);
        }
    }
}
