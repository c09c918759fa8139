//! Ordering key of the global event queue.

use barbell_core::{Event, EventPriority};
use barbell_types::PlatformIndex;
use std::time::Duration;

/// Key for deterministic event ordering.
///
/// Events are ordered by time first, then by priority so that timer expiries
/// at a given instant run before official inputs at the same instant, then by
/// insertion sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventKey {
    pub time: Duration,
    pub priority: EventPriority,
    pub sequence: u64,
    pub platform: PlatformIndex,
}

impl EventKey {
    pub fn new(time: Duration, event: &Event, platform: PlatformIndex, sequence: u64) -> Self {
        Self {
            time,
            priority: event.priority(),
            sequence,
            platform,
        }
    }
}
