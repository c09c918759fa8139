//! Timer management for the production runner.
//!
//! Each timer is a tokio task that sleeps and then feeds the corresponding
//! timer event back into the runner's timer channel, so expiries are
//! serialized with every other event of the platform.

use barbell_core::{Event, TimerId};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Manages timers for one field of play.
pub struct TimerManager {
    /// Active timers (id -> task handle).
    timers: HashMap<TimerId, JoinHandle<()>>,
    /// Event sender for timer fires.
    event_tx: mpsc::Sender<Event>,
}

impl TimerManager {
    pub fn new(event_tx: mpsc::Sender<Event>) -> Self {
        Self {
            timers: HashMap::new(),
            event_tx,
        }
    }

    /// Set a timer that delivers `Event::from_timer(id, tag)` after
    /// `duration`.
    ///
    /// If a timer with the same ID already exists, it is cancelled first.
    pub fn set_timer(&mut self, id: TimerId, duration: Duration, tag: u64) {
        self.cancel_timer(id);

        let event_tx = self.event_tx.clone();
        let handle = tokio::spawn(async move {
            trace!(?id, ?duration, "Timer task started, sleeping");
            tokio::time::sleep(duration).await;
            trace!(?id, tag, "Timer fired, sending event");
            // the runner is gone when the channel is closed
            let _ = event_tx.send(Event::from_timer(id, tag)).await;
        });

        self.timers.insert(id, handle);
        debug!(?id, ?duration, tag, "Timer set");
    }

    /// Cancel a timer.
    ///
    /// If the timer doesn't exist or has already fired, this is a no-op.
    pub fn cancel_timer(&mut self, id: TimerId) {
        if let Some(handle) = self.timers.remove(&id) {
            handle.abort();
            debug!(?id, "Timer cancelled");
        }
    }

    /// Cancel all timers. Called during shutdown.
    pub fn cancel_all(&mut self) {
        for (id, handle) in self.timers.drain() {
            handle.abort();
            trace!(?id, "Timer cancelled (shutdown)");
        }
    }

    /// Number of timers set and not cancelled (fired timers included).
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }
}

impl Drop for TimerManager {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
