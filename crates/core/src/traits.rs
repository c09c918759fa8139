//! State machine trait and collaborator ports.

use crate::{Action, Event, Tone};
use barbell_types::{Athlete, AthleteId, Group};
use std::time::Duration;
use thiserror::Error;

/// A deterministic, synchronous state machine.
///
/// Runners call [`set_time`](StateMachine::set_time) before every
/// [`handle`](StateMachine::handle), with at most one event in flight.
pub trait StateMachine {
    /// Process one event and return the actions to execute.
    fn handle(&mut self, event: Event) -> Vec<Action>;

    /// Advance the state machine's notion of the current time.
    fn set_time(&mut self, now: Duration);

    /// Current time as last set by the runner.
    fn now(&self) -> Duration;
}

/// Countdown clock used for the athlete clock and the break clock.
pub trait TimerPort: Send {
    /// Start counting down from the current remaining time.
    fn start(&mut self);

    /// Stop counting down. Idempotent; freezes the remaining time and
    /// records it as the time at last stop.
    fn stop(&mut self);

    fn set_time_remaining(&mut self, remaining: Duration);

    fn time_remaining(&self) -> Duration;

    fn time_remaining_at_last_stop(&self) -> Duration;

    fn is_running(&self) -> bool;

    /// Advance the clock's notion of the current time.
    fn set_time(&mut self, now: Duration);
}

/// Platform sound output.
pub trait SoundPort: Send + Sync {
    fn emit(&self, tone: &Tone);
}

/// Errors reported by the persistence collaborators.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    AthleteNotFound(AthleteId),

    #[error("group {0} not found")]
    GroupNotFound(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Athlete persistence.
pub trait AthleteStore: Send + Sync {
    /// Weighed-in athletes of a group; all weighed-in athletes for `None`.
    fn find_all_by_group_and_weigh_in(&self, group: Option<&Group>) -> Result<Vec<Athlete>, StoreError>;

    fn save(&self, athlete: &Athlete) -> Result<(), StoreError>;
}

/// Group persistence.
pub trait GroupStore: Send + Sync {
    /// Whether every athlete of the group has finished lifting.
    fn is_done(&self, group: &Group) -> Result<bool, StoreError>;
}
