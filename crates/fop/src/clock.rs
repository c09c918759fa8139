//! Deterministic countdown clock.

use barbell_core::TimerPort;
use std::time::Duration;

/// Countdown driven by the runner's notion of time.
///
/// The clock never reads the wall clock: the owning state machine forwards
/// `set_time` before each event, and remaining time is derived from the
/// instant the clock was last started.
#[derive(Debug, Clone, Default)]
pub struct CountdownClock {
    now: Duration,
    remaining: Duration,
    running_since: Option<Duration>,
    remaining_at_last_stop: Duration,
}

impl CountdownClock {
    pub fn new(remaining: Duration) -> Self {
        Self {
            remaining,
            ..Self::default()
        }
    }

    fn elapsed(&self) -> Duration {
        self.running_since
            .map_or(Duration::ZERO, |since| self.now.saturating_sub(since))
    }
}

impl TimerPort for CountdownClock {
    fn start(&mut self) {
        if self.running_since.is_none() {
            self.running_since = Some(self.now);
        }
    }

    fn stop(&mut self) {
        if self.running_since.is_some() {
            self.remaining = self.time_remaining();
            self.running_since = None;
            self.remaining_at_last_stop = self.remaining;
        }
    }

    /// Does not touch the value recorded at the last stop.
    fn set_time_remaining(&mut self, remaining: Duration) {
        self.remaining = remaining;
        if self.running_since.is_some() {
            self.running_since = Some(self.now);
        }
    }

    fn time_remaining(&self) -> Duration {
        self.remaining.saturating_sub(self.elapsed())
    }

    fn time_remaining_at_last_stop(&self) -> Duration {
        self.remaining_at_last_stop
    }

    fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    fn set_time(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }
}
