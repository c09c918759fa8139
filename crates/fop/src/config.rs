//! Field-of-play configuration.

use barbell_types::CompetitionConfig;
use std::time::Duration;

/// Clock granted to an athlete who is called up.
pub const DEFAULT_TIME_ALLOWED: Duration = Duration::from_secs(60);

/// Clock granted to an athlete who follows themselves.
pub const CONSECUTIVE_TIME_ALLOWED: Duration = Duration::from_secs(120);

/// Timing and behaviour of one field of play.
#[derive(Debug, Clone, PartialEq)]
pub struct FopConfig {
    /// Delay between the last referee vote and the decision being applied.
    pub decision_settle_delay: Duration,

    /// Delay between the decision being applied and the board returning to
    /// the lifting order.
    pub decision_reset_delay: Duration,

    /// Remaining time at which the initial warning sounds.
    pub initial_warning: Duration,

    /// Remaining time at which the final warning sounds.
    pub final_warning: Duration,

    /// Whether a sound emitter is attached to this platform.
    pub emit_sounds: bool,

    pub competition: CompetitionConfig,
}

impl Default for FopConfig {
    fn default() -> Self {
        Self {
            decision_settle_delay: Duration::from_millis(3000),
            decision_reset_delay: Duration::from_millis(3000),
            initial_warning: Duration::from_secs(90),
            final_warning: Duration::from_secs(30),
            emit_sounds: false,
            competition: CompetitionConfig::default(),
        }
    }
}

impl FopConfig {
    /// Test mode: decision timers fire with no delay, right after the event
    /// that scheduled them.
    pub fn testing() -> Self {
        Self {
            decision_settle_delay: Duration::ZERO,
            decision_reset_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    pub fn with_competition(mut self, competition: CompetitionConfig) -> Self {
        self.competition = competition;
        self
    }

    pub fn with_sounds(mut self, emit_sounds: bool) -> Self {
        self.emit_sounds = emit_sounds;
        self
    }

    pub fn is_testing(&self) -> bool {
        self.decision_settle_delay.is_zero() && self.decision_reset_delay.is_zero()
    }
}
