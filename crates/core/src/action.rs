//! Action types for the deterministic state machine.

use crate::{Origin, TimerId, UiEvent};
use barbell_types::{Athlete, Group};
use serde::Serialize;
use std::time::Duration;

/// Actions the state machine wants to perform.
///
/// Actions are **commands** - they describe something to do.
/// The runner executes actions and may convert results back into events.
#[derive(Debug, Clone)]
pub enum Action {
    // ═══════════════════════════════════════════════════════════════════════
    // Displays
    // ═══════════════════════════════════════════════════════════════════════
    /// Broadcast an immutable update to every display and console.
    ///
    /// Fire-and-forget: observers may process it concurrently with the next
    /// event.
    PostUi { event: UiEvent },

    // ═══════════════════════════════════════════════════════════════════════
    // Timers
    // ═══════════════════════════════════════════════════════════════════════
    /// Set a timer to fire after a duration, replacing any timer with the
    /// same id. The runner delivers `Event::from_timer(id, tag)` on expiry,
    /// into the same serialized event stream.
    SetTimer {
        id: TimerId,
        duration: Duration,
        tag: u64,
    },

    /// Cancel a previously set timer.
    CancelTimer { id: TimerId },

    // ═══════════════════════════════════════════════════════════════════════
    // Sound
    // ═══════════════════════════════════════════════════════════════════════
    /// Play a cue on the platform's sound emitter.
    EmitSound { cue: Cue },

    // ═══════════════════════════════════════════════════════════════════════
    // Persistence (runner calls the store, failures propagate to the caller)
    // ═══════════════════════════════════════════════════════════════════════
    /// Save an athlete after a lift result was applied.
    PersistAthlete { athlete: Athlete },

    /// Load the weighed-in athletes of a group.
    ///
    /// Returns `Event::AthletesLoaded` when complete.
    LoadAthletes { group: Option<Group>, origin: Origin },
}

impl Action {
    /// Get the action type name for telemetry.
    pub fn type_name(&self) -> &'static str {
        match self {
            Action::PostUi { .. } => "PostUi",
            Action::SetTimer { .. } => "SetTimer",
            Action::CancelTimer { .. } => "CancelTimer",
            Action::EmitSound { .. } => "EmitSound",
            Action::PersistAthlete { .. } => "PersistAthlete",
            Action::LoadAthletes { .. } => "LoadAthletes",
        }
    }
}

/// Audible cues emitted by a field of play, each at most once per clock cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Cue {
    InitialWarning,
    FinalWarning,
    TimeOver,
    Down,
}

/// What the sound emitter should play.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Tone {
    /// A bundled sound sample.
    Sample(&'static str),
    /// A generated sine tone.
    Beep {
        frequency_hz: u32,
        duration: Duration,
        volume: f32,
    },
}

impl Cue {
    pub fn tone(self) -> Tone {
        match self {
            // the final warning deliberately does not sound like the down signal
            Cue::InitialWarning | Cue::FinalWarning => Tone::Sample("initialWarning2.wav"),
            Cue::TimeOver => Tone::Sample("timeOver2.wav"),
            Cue::Down => Tone::Beep {
                frequency_hz: 1100,
                duration: Duration::from_millis(1200),
                volume: 1.0,
            },
        }
    }
}
