//! Broadcast bus carrying UI events to displays and consoles.

use barbell_core::UiEvent;
use barbell_types::PlatformIndex;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::trace;

/// A UI event tagged with the platform that posted it.
#[derive(Debug, Clone, Serialize)]
pub struct UiMessage {
    pub platform: PlatformIndex,
    pub event: UiEvent,
}

/// Fan-out of UI events to any number of observers.
///
/// Publishing never blocks the field of play: slow subscribers lag and
/// miss messages, and publishing with no subscriber is not an error.
/// Cloning the bus shares the underlying channel, so several platforms can
/// publish to the same displays.
#[derive(Debug, Clone)]
pub struct UiBus {
    tx: broadcast::Sender<UiMessage>,
    capacity: usize,
}

impl UiBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx, capacity }
    }

    /// Receive every message published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<UiMessage> {
        self.tx.subscribe()
    }

    /// Publish to all current subscribers; returns how many received it.
    pub fn publish(&self, platform: PlatformIndex, event: UiEvent) -> usize {
        trace!(platform = platform.0, event = event.type_name(), "publishing ui event");
        self.tx.send(UiMessage { platform, event }).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
