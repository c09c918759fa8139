//! Event types for the deterministic state machine.

use crate::{BreakType, CountdownType, Origin, TimerId};
use barbell_types::{Athlete, Group};
use std::time::Duration;

/// Priority levels for event ordering within the same timestamp.
///
/// Events at the same simulation time are processed in priority order.
/// Lower values = higher priority (processed first).
///
/// Internal events (consequences of processing an event) are handled before
/// new inputs from officials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum EventPriority {
    /// Internal events: callbacks for actions the field of play requested.
    Internal = 0,

    /// Timer events: scheduled by the field of play itself.
    Timer = 1,

    /// Official events: announcer, timekeeper, referees, marshal, jury.
    Official = 2,
}

/// All possible events a field of play can receive.
///
/// Events are **passive data** - they describe something that happened.
/// The state machine processes events and returns actions.
#[derive(Debug, Clone)]
pub enum Event {
    // ═══════════════════════════════════════════════════════════════════════
    // Timers (priority: Timer)
    // ═══════════════════════════════════════════════════════════════════════
    /// Settle delay after the third referee vote elapsed.
    DecisionSettleTimer { generation: u64 },

    /// Decision display delay elapsed.
    DecisionResetTimer { generation: u64 },

    /// Athlete clock reached the initial warning threshold.
    InitialWarningTimer { clock_run: u64 },

    /// Athlete clock reached the final warning threshold.
    FinalWarningTimer { clock_run: u64 },

    /// Athlete clock reached zero.
    ClockExpiredTimer { clock_run: u64 },

    // ═══════════════════════════════════════════════════════════════════════
    // Officials (priority: Official)
    // ═══════════════════════════════════════════════════════════════════════
    /// A break starts (or its parameters change).
    BreakStarted {
        break_type: BreakType,
        countdown: CountdownType,
        /// Target time on the runner's clock, for [`CountdownType::Target`].
        target: Option<Duration>,
        indefinite: bool,
        origin: Origin,
    },

    /// The break clock is paused.
    BreakPaused { origin: Origin },

    /// Lifting starts or resumes after a break.
    StartLifting { origin: Origin },

    /// Timekeeper starts the athlete clock.
    TimeStarted { origin: Origin },

    /// Timekeeper stops the athlete clock.
    TimeStopped { origin: Origin },

    /// The athlete clock ran out (reported by a remote clock).
    TimeOver { origin: Origin },

    /// Down signal given manually.
    DownSignal { origin: Origin },

    /// One referee decision, `referee` in 0..3.
    DecisionUpdate {
        referee: usize,
        decision: bool,
        origin: Origin,
    },

    /// Full refresh of the three referee slots with their vote times.
    DecisionFullUpdate {
        decisions: [Option<bool>; 3],
        times: [Option<Duration>; 3],
        origin: Origin,
    },

    /// Single-voice decision from the announcer or a single referee.
    ExplicitDecision {
        success: bool,
        /// Referee lights as entered on the console, informational only.
        referees: [Option<bool>; 3],
        origin: Origin,
    },

    /// An athlete's requested weight changed; carries the updated athlete.
    WeightChange { athlete: Athlete, origin: Origin },

    /// Force the athlete clock to a given time allowed.
    ForceTime { time_allowed: Duration, origin: Origin },

    /// Return from decision display to the lifting order.
    DecisionReset { origin: Origin },

    /// Switch the field of play to another group (or none).
    SwitchGroup { group: Option<Group>, origin: Origin },

    // ═══════════════════════════════════════════════════════════════════════
    // Callbacks (priority: Internal)
    // ═══════════════════════════════════════════════════════════════════════
    /// Athletes of a group were loaded from the athlete store.
    AthletesLoaded {
        group: Option<Group>,
        athletes: Vec<Athlete>,
        group_done: bool,
        origin: Origin,
    },
}

impl Event {
    /// Event delivered when a timer scheduled with `tag` expires.
    pub fn from_timer(id: TimerId, tag: u64) -> Event {
        match id {
            TimerId::DecisionSettle => Event::DecisionSettleTimer { generation: tag },
            TimerId::DecisionReset => Event::DecisionResetTimer { generation: tag },
            TimerId::InitialWarning => Event::InitialWarningTimer { clock_run: tag },
            TimerId::FinalWarning => Event::FinalWarningTimer { clock_run: tag },
            TimerId::ClockExpired => Event::ClockExpiredTimer { clock_run: tag },
        }
    }

    /// Get the priority of this event for ordering.
    pub fn priority(&self) -> EventPriority {
        match self {
            Event::AthletesLoaded { .. } => EventPriority::Internal,

            Event::DecisionSettleTimer { .. }
            | Event::DecisionResetTimer { .. }
            | Event::InitialWarningTimer { .. }
            | Event::FinalWarningTimer { .. }
            | Event::ClockExpiredTimer { .. } => EventPriority::Timer,

            Event::BreakStarted { .. }
            | Event::BreakPaused { .. }
            | Event::StartLifting { .. }
            | Event::TimeStarted { .. }
            | Event::TimeStopped { .. }
            | Event::TimeOver { .. }
            | Event::DownSignal { .. }
            | Event::DecisionUpdate { .. }
            | Event::DecisionFullUpdate { .. }
            | Event::ExplicitDecision { .. }
            | Event::WeightChange { .. }
            | Event::ForceTime { .. }
            | Event::DecisionReset { .. }
            | Event::SwitchGroup { .. } => EventPriority::Official,
        }
    }

    /// Check if this is a timer event.
    pub fn is_timer(&self) -> bool {
        self.priority() == EventPriority::Timer
    }

    /// Who caused the event. Timer events originate from the field of play.
    pub fn origin(&self) -> Origin {
        match self {
            Event::BreakStarted { origin, .. }
            | Event::BreakPaused { origin }
            | Event::StartLifting { origin }
            | Event::TimeStarted { origin }
            | Event::TimeStopped { origin }
            | Event::TimeOver { origin }
            | Event::DownSignal { origin }
            | Event::DecisionUpdate { origin, .. }
            | Event::DecisionFullUpdate { origin, .. }
            | Event::ExplicitDecision { origin, .. }
            | Event::WeightChange { origin, .. }
            | Event::ForceTime { origin, .. }
            | Event::DecisionReset { origin }
            | Event::SwitchGroup { origin, .. }
            | Event::AthletesLoaded { origin, .. } => origin.clone(),

            Event::DecisionSettleTimer { .. }
            | Event::DecisionResetTimer { .. }
            | Event::InitialWarningTimer { .. }
            | Event::FinalWarningTimer { .. }
            | Event::ClockExpiredTimer { .. } => Origin::internal(),
        }
    }

    /// Get the event type name for telemetry.
    pub fn type_name(&self) -> &'static str {
        match self {
            // Timers
            Event::DecisionSettleTimer { .. } => "DecisionSettleTimer",
            Event::DecisionResetTimer { .. } => "DecisionResetTimer",
            Event::InitialWarningTimer { .. } => "InitialWarningTimer",
            Event::FinalWarningTimer { .. } => "FinalWarningTimer",
            Event::ClockExpiredTimer { .. } => "ClockExpiredTimer",

            // Officials
            Event::BreakStarted { .. } => "BreakStarted",
            Event::BreakPaused { .. } => "BreakPaused",
            Event::StartLifting { .. } => "StartLifting",
            Event::TimeStarted { .. } => "TimeStarted",
            Event::TimeStopped { .. } => "TimeStopped",
            Event::TimeOver { .. } => "TimeOver",
            Event::DownSignal { .. } => "DownSignal",
            Event::DecisionUpdate { .. } => "DecisionUpdate",
            Event::DecisionFullUpdate { .. } => "DecisionFullUpdate",
            Event::ExplicitDecision { .. } => "ExplicitDecision",
            Event::WeightChange { .. } => "WeightChange",
            Event::ForceTime { .. } => "ForceTime",
            Event::DecisionReset { .. } => "DecisionReset",
            Event::SwitchGroup { .. } => "SwitchGroup",

            // Callbacks
            Event::AthletesLoaded { .. } => "AthletesLoaded",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_events_round_trip_their_tag() {
        match Event::from_timer(TimerId::DecisionReset, 7) {
            Event::DecisionResetTimer { generation } => assert_eq!(generation, 7),
            other => panic!("unexpected event {}", other.type_name()),
        }
        assert!(Event::from_timer(TimerId::ClockExpired, 1).is_timer());
    }

    #[test]
    fn test_priorities_order_callbacks_first() {
        let loaded = Event::AthletesLoaded {
            group: None,
            athletes: vec![],
            group_done: false,
            origin: Origin::internal(),
        };
        let started = Event::TimeStarted {
            origin: Origin::named("timekeeper"),
        };
        assert!(loaded.priority() < Event::from_timer(TimerId::DecisionSettle, 0).priority());
        assert!(Event::from_timer(TimerId::DecisionSettle, 0).priority() < started.priority());
        assert_eq!(started.origin().name(), Some("timekeeper"));
    }
}
