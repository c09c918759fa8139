//! Core types for the field-of-play state machine.
//!
//! This crate provides the foundational types of the session architecture:
//!
//! - [`Event`]: All possible inputs to the state machine
//! - [`Action`]: All possible outputs from the state machine
//! - [`UiEvent`]: Immutable broadcasts to displays and consoles
//! - [`EventPriority`]: Ordering priority for events at the same timestamp
//! - [`StateMachine`]: The trait that a field of play implements
//! - Collaborator ports: [`TimerPort`], [`SoundPort`], [`AthleteStore`], [`GroupStore`]
//!
//! # Architecture
//!
//! The core is built on a simple event-driven model:
//!
//! ```text
//! Events → StateMachine::handle() → Actions
//! ```
//!
//! The state machine is:
//! - **Synchronous**: No async, no .await
//! - **Deterministic**: Same state + event = same actions
//! - **Pure-ish**: Mutates self, but performs no I/O
//!
//! All I/O is handled by the runner (simulation or production) which:
//! 1. Delivers events to the state machine, one at a time per field of play
//! 2. Executes the returned actions
//! 3. Converts timer expiries and store reads back into events

mod action;
mod event;
mod traits;
mod ui;

pub use action::{Action, Cue, Tone};
pub use event::{Event, EventPriority};
pub use traits::{AthleteStore, GroupStore, SoundPort, StateMachine, StoreError, TimerPort};
pub use ui::{ClockCommand, Notification, UiEvent};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Timers a field of play schedules for itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerId {
    /// Referee majority becomes authoritative.
    DecisionSettle,
    /// Decision display returns to the lifting order.
    DecisionReset,
    /// Athlete clock reached the initial warning threshold.
    InitialWarning,
    /// Athlete clock reached the final warning threshold.
    FinalWarning,
    /// Athlete clock ran out.
    ClockExpired,
}

impl TimerId {
    /// Timers tied to the athlete clock, cancelled whenever it stops.
    pub const CLOCK: [TimerId; 3] = [
        TimerId::InitialWarning,
        TimerId::FinalWarning,
        TimerId::ClockExpired,
    ];

    /// Timers tied to a decision cycle.
    pub const DECISION: [TimerId; 2] = [TimerId::DecisionSettle, TimerId::DecisionReset];
}

/// Session state of a field of play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FopState {
    Inactive,
    Break,
    AthleteDisplayed,
    TimeRunning,
    TimeStopped,
    DownSignalVisible,
    DecisionVisible,
}

impl fmt::Display for FopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Reason lifting is paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BreakType {
    BeforeIntroduction,
    FirstSnatch,
    FirstCleanJerk,
    Technical,
    Jury,
    Marshal,
    GroupDone,
}

/// How the break clock counts down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountdownType {
    /// Fixed duration from the moment the break starts.
    Duration(Duration),
    /// Count down to the event's target time.
    Target,
    /// No countdown; the break lasts until lifting resumes.
    Indefinite,
}

/// Opaque identity of whoever caused an event, echoed in UI events so that a
/// console can ignore its own updates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Origin(Option<Arc<str>>);

impl Origin {
    /// Events generated by the field of play itself.
    pub fn internal() -> Self {
        Origin(None)
    }

    pub fn named(name: &str) -> Self {
        Origin(Some(Arc::from(name)))
    }

    pub fn name(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_internal(&self) -> bool {
        self.0.is_none()
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "internal"),
        }
    }
}
