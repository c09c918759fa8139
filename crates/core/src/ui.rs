//! Outbound UI events.

use crate::{BreakType, FopState, Origin};
use barbell_types::{Athlete, AthleteId, Group};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Commands mirrored to remote clock displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClockCommand {
    Start,
    Stop,
    Set,
}

/// Non-fatal messages surfaced to the officials' consoles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Notification {
    /// The clock owner confirmed the weight already on the board.
    Declaration { athlete: AthleteId, weight: u32 },
    /// An event arrived that the current state does not handle.
    UnexpectedEvent { event: &'static str, state: FopState },
}

/// Updates broadcast by a field of play.
///
/// Every payload is an immutable snapshot; observers may hold on to it while
/// the field of play processes further events.
#[derive(Debug, Clone, Serialize)]
pub enum UiEvent {
    /// Lifting order changed or the current athlete is (re)displayed.
    LiftingOrderUpdated {
        current: Option<Athlete>,
        next: Option<Athlete>,
        previous: Option<Athlete>,
        changing: Option<Athlete>,
        lifting_order: Arc<[Athlete]>,
        display_order: Arc<[Athlete]>,
        clock: Duration,
        clock_stopped: bool,
        origin: Origin,
    },

    /// Referee decision shown on the displays.
    Decision {
        athlete: Option<Athlete>,
        good_lift: bool,
        decisions: [Option<bool>; 3],
        origin: Origin,
    },

    DownSignal { origin: Origin },

    /// Individual referee lights for the jury.
    RefereeUpdate {
        athlete: Option<Athlete>,
        decisions: [Option<bool>; 3],
        times: [Option<Duration>; 3],
        origin: Origin,
    },

    BreakStarted {
        break_type: BreakType,
        remaining: Option<Duration>,
        origin: Origin,
    },

    BreakPaused { origin: Origin },

    GroupDone { group: Option<Group>, origin: Origin },

    DecisionReset { origin: Origin },

    /// Athlete clock command for remote clocks.
    AthleteClock {
        command: ClockCommand,
        remaining: Duration,
        origin: Origin,
    },

    /// Break clock command for remote clocks.
    BreakClock {
        command: ClockCommand,
        remaining: Duration,
        origin: Origin,
    },

    Notification {
        notification: Notification,
        origin: Origin,
    },
}

impl UiEvent {
    /// Get the UI event type name for telemetry.
    pub fn type_name(&self) -> &'static str {
        match self {
            UiEvent::LiftingOrderUpdated { .. } => "LiftingOrderUpdated",
            UiEvent::Decision { .. } => "Decision",
            UiEvent::DownSignal { .. } => "DownSignal",
            UiEvent::RefereeUpdate { .. } => "RefereeUpdate",
            UiEvent::BreakStarted { .. } => "BreakStarted",
            UiEvent::BreakPaused { .. } => "BreakPaused",
            UiEvent::GroupDone { .. } => "GroupDone",
            UiEvent::DecisionReset { .. } => "DecisionReset",
            UiEvent::AthleteClock { .. } => "AthleteClock",
            UiEvent::BreakClock { .. } => "BreakClock",
            UiEvent::Notification { .. } => "Notification",
        }
    }

    pub fn origin(&self) -> &Origin {
        match self {
            UiEvent::LiftingOrderUpdated { origin, .. }
            | UiEvent::Decision { origin, .. }
            | UiEvent::DownSignal { origin }
            | UiEvent::RefereeUpdate { origin, .. }
            | UiEvent::BreakStarted { origin, .. }
            | UiEvent::BreakPaused { origin }
            | UiEvent::GroupDone { origin, .. }
            | UiEvent::DecisionReset { origin }
            | UiEvent::AthleteClock { origin, .. }
            | UiEvent::BreakClock { origin, .. }
            | UiEvent::Notification { origin, .. } => origin,
        }
    }
}
