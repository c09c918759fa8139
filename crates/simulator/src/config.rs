//! Simulator configuration.

use barbell_fop::FopConfig;
use barbell_simulation::ConsoleConfig;
use barbell_types::CompetitionConfig;
use std::time::Duration;

/// Configuration for a simulated session.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Athletes generated for the group.
    pub athletes: usize,

    /// Random seed; the same seed reproduces the same session.
    pub seed: u64,

    /// Behaviour of the officials and coaches.
    pub officials: OfficialsConfig,

    /// Officials' consoles (latency, jitter, loss).
    pub consoles: ConsoleConfig,

    pub fop: FopConfig,

    /// Simulated time after which an unfinished session is reported as
    /// stalled.
    pub max_duration: Duration,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            athletes: 8,
            seed: 42,
            officials: OfficialsConfig::default(),
            consoles: ConsoleConfig::default(),
            fop: FopConfig::default(),
            max_duration: Duration::from_secs(6 * 3600),
        }
    }
}

impl SimulatorConfig {
    pub fn new(athletes: usize) -> Self {
        Self {
            athletes,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_officials(mut self, officials: OfficialsConfig) -> Self {
        self.officials = officials;
        self
    }

    pub fn with_consoles(mut self, consoles: ConsoleConfig) -> Self {
        self.consoles = consoles;
        self
    }

    pub fn with_competition(mut self, competition: CompetitionConfig) -> Self {
        self.fop = self.fop.with_competition(competition);
        self
    }

    pub fn with_max_duration(mut self, max_duration: Duration) -> Self {
        self.max_duration = max_duration;
        self
    }
}

/// How the simulated officials and coaches behave.
#[derive(Debug, Clone)]
pub struct OfficialsConfig {
    /// Probability that a referee judges a lift good.
    pub good_lift_rate: f64,

    /// Probability that a coach changes the weight before the clock starts.
    pub weight_change_rate: f64,

    /// Delay between an athlete being called and the timekeeper starting
    /// the clock.
    pub call_delay: (Duration, Duration),

    /// Time an athlete takes to lift once the clock runs.
    pub lift_time: (Duration, Duration),

    /// Spread of the three referees' votes after the lift.
    pub vote_spread: Duration,
}

impl Default for OfficialsConfig {
    fn default() -> Self {
        Self {
            good_lift_rate: 0.7,
            weight_change_rate: 0.2,
            call_delay: (Duration::from_secs(2), Duration::from_secs(8)),
            lift_time: (Duration::from_secs(5), Duration::from_secs(45)),
            vote_spread: Duration::from_millis(800),
        }
    }
}

impl OfficialsConfig {
    pub fn with_good_lift_rate(mut self, rate: f64) -> Self {
        self.good_lift_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_weight_change_rate(mut self, rate: f64) -> Self {
        self.weight_change_rate = rate.clamp(0.0, 1.0);
        self
    }
}
