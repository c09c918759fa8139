//! Session simulator.
//!
//! Drives one simulated platform through a whole group: the announcer loads
//! the group, coaches change weights, the timekeeper starts the clock, the
//! referees vote, and the jury steps in when votes never arrive.

use crate::config::SimulatorConfig;
use crate::generator::generate_group;
use crate::metrics::{AthleteResult, MetricsCollector, SessionReport, SessionSummary, TeamResult};
use barbell_core::{AthleteStore, BreakType, Event, FopState, Origin, StoreError};
use barbell_ranking::{assign_session_ranks, results_order, team_scores};
use barbell_simulation::{
    Console, MemoryStore, SimulationConfig, SimulationError, SimulationRunner,
};
use barbell_types::{Athlete, AthleteId, Group, PlatformIndex, RankingType};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

const PLATFORM: PlatformIndex = PlatformIndex(0);

/// Time allowed for stray inputs to land after the decision display.
const GRACE: Duration = Duration::from_secs(2);

/// Errors that can occur during a simulated session.
#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error("Simulation error: {0}")]
    Simulation(#[from] SimulationError),

    #[error("Athlete store error: {0}")]
    Store(#[from] StoreError),

    #[error("Cannot simulate an empty group")]
    EmptyGroup,

    #[error("Session stalled after {elapsed:?} with {attempts} attempts")]
    Stalled { elapsed: Duration, attempts: u64 },

    #[error("Metrics error: {0}")]
    Metrics(String),
}

/// Attempt under way: who was called, when, and what the referees will vote.
#[derive(Debug, Clone, Copy)]
struct InProgress {
    athlete: AthleteId,
    called_at: Duration,
    attempts_before: usize,
    votes: [bool; 3],
}

/// Simulates a complete session on one platform.
pub struct SessionSimulator {
    runner: SimulationRunner,
    group: Group,
    config: SimulatorConfig,
    /// RNG for officials' behaviour, separate from the console RNG.
    rng: ChaCha8Rng,
    metrics: MetricsCollector,
    in_progress: Option<InProgress>,
}

impl SessionSimulator {
    /// Generate a group from the seed and set up the platform.
    pub fn new(config: SimulatorConfig) -> Result<Self, SimulatorError> {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed.wrapping_add(1));
        let athletes = generate_group(config.athletes, &mut rng);
        Self::with_athletes(config, athletes, rng)
    }

    /// Set up the platform with a given group of athletes.
    pub fn with_roster(
        config: SimulatorConfig,
        athletes: Vec<Athlete>,
    ) -> Result<Self, SimulatorError> {
        let rng = ChaCha8Rng::seed_from_u64(config.seed.wrapping_add(1));
        Self::with_athletes(config, athletes, rng)
    }

    fn with_athletes(
        config: SimulatorConfig,
        athletes: Vec<Athlete>,
        rng: ChaCha8Rng,
    ) -> Result<Self, SimulatorError> {
        if athletes.is_empty() {
            return Err(SimulatorError::EmptyGroup);
        }

        info!(
            athletes = athletes.len(),
            seed = config.seed,
            good_lift_rate = config.officials.good_lift_rate,
            weight_change_rate = config.officials.weight_change_rate,
            "Session simulator created"
        );

        let group = Group::new("SIM");
        let store = Arc::new(MemoryStore::new());
        store.insert_group(group.clone(), athletes);

        let simulation = SimulationConfig {
            platforms: 1,
            fop: config.fop.clone(),
            consoles: config.consoles.clone(),
        };
        let runner = SimulationRunner::new(simulation, store, config.seed);

        Ok(Self {
            runner,
            group,
            config,
            rng,
            metrics: MetricsCollector::new()?,
            in_progress: None,
        })
    }

    pub fn runner(&self) -> &SimulationRunner {
        &self.runner
    }

    pub fn runner_mut(&mut self) -> &mut SimulationRunner {
        &mut self.runner
    }

    pub fn group(&self) -> &Group {
        &self.group
    }

    /// Run the session until the group is done.
    pub fn run(mut self) -> Result<SessionReport, SimulatorError> {
        let start = self.runner.now();
        let deadline = start + self.config.max_duration;
        self.load_group()?;

        while !self.group_done() {
            if self.runner.now() >= deadline {
                return Err(SimulatorError::Stalled {
                    elapsed: self.runner.now() - start,
                    attempts: self.metrics.attempts(),
                });
            }

            match self.state() {
                FopState::AthleteDisplayed => {
                    self.complete_attempt();
                    self.call_athlete()?;
                }
                FopState::Break => {
                    self.complete_attempt();
                    self.resume_lifting()?;
                }
                FopState::TimeRunning | FopState::TimeStopped | FopState::DownSignalVisible => {
                    self.jury_decision()?;
                }
                FopState::DecisionVisible => {
                    let wait = self.config.fop.decision_reset_delay + GRACE;
                    self.runner.run_until(self.runner.now() + wait)?;
                }
                FopState::Inactive => {
                    warn!("Platform inactive, reloading group");
                    self.metrics.record_restart();
                    self.load_group()?;
                }
            }
        }
        self.complete_attempt();

        let duration = self.runner.now() - start;
        info!(
            duration_secs = duration.as_secs(),
            attempts = self.metrics.attempts(),
            "Session complete"
        );
        self.report(duration)
    }

    fn state(&self) -> FopState {
        self.runner
            .platform(PLATFORM)
            .map_or(FopState::Inactive, |fop| fop.state())
    }

    fn group_done(&self) -> bool {
        self.runner.platform(PLATFORM).is_some_and(|fop| {
            fop.state() == FopState::Break && fop.break_type() == Some(BreakType::GroupDone)
        })
    }

    fn attempts_done(&self, athlete: AthleteId) -> usize {
        self.runner
            .store()
            .athlete(athlete)
            .map_or(0, |a| a.attempts_done())
    }

    fn sample(&mut self, (low, high): (Duration, Duration)) -> Duration {
        if high <= low {
            return low;
        }
        Duration::from_millis(self.rng.gen_range(low.as_millis() as u64..=high.as_millis() as u64))
    }

    fn load_group(&mut self) -> Result<(), SimulatorError> {
        let event = Event::SwitchGroup {
            group: Some(self.group.clone()),
            origin: Origin::named(&Console::Announcer.to_string()),
        };
        self.runner
            .schedule_initial_event(PLATFORM, Duration::ZERO, event)?;
        self.runner.run_until(self.runner.now() + GRACE)?;
        Ok(())
    }

    fn resume_lifting(&mut self) -> Result<(), SimulatorError> {
        let event = Event::StartLifting {
            origin: Origin::named(&Console::Announcer.to_string()),
        };
        self.runner
            .schedule_initial_event(PLATFORM, Duration::ZERO, event)?;
        self.runner.run_until(self.runner.now() + GRACE)?;
        Ok(())
    }

    /// Close the bookkeeping of the attempt under way, if any.
    fn complete_attempt(&mut self) {
        let Some(attempt) = self.in_progress.take() else {
            return;
        };
        if self.attempts_done(attempt.athlete) > attempt.attempts_before {
            let elapsed = self.runner.now().saturating_sub(attempt.called_at);
            self.metrics.record_attempt(elapsed);
        } else {
            debug!(athlete = %attempt.athlete, "Attempt not recorded, calling again");
            self.metrics.record_restart();
        }
    }

    /// One attempt: an optional weight change, then clock start, lift and
    /// the three referee votes.
    fn call_athlete(&mut self) -> Result<(), SimulatorError> {
        let Some(athlete) = self
            .runner
            .platform(PLATFORM)
            .and_then(|fop| fop.current_athlete().cloned())
        else {
            // nobody up but not done either; let pending events land
            self.runner.run_until(self.runner.now() + GRACE)?;
            return Ok(());
        };

        if self.rng.gen_bool(self.config.officials.weight_change_rate) {
            let mut changed = athlete.clone();
            let weight = changed.next_attempt_requested_weight() + self.rng.gen_range(1..=3);
            if changed.change_weight(weight).is_ok() {
                debug!(athlete = %athlete.id, weight, "Coach changes weight");
                let event = Event::WeightChange {
                    athlete: changed,
                    origin: Origin::named(&Console::Marshal.to_string()),
                };
                self.runner
                    .submit(PLATFORM, Console::Marshal, Duration::from_secs(1), event)?;
                self.metrics.record_weight_change();
                self.runner
                    .run_until(self.runner.now() + Duration::from_secs(1) + GRACE)?;
                return Ok(());
            }
        }

        let officials = self.config.officials.clone();
        let call_delay = self.sample(officials.call_delay);
        let lift_time = self.sample(officials.lift_time);
        let mut votes = [false; 3];
        for vote in &mut votes {
            *vote = self.rng.gen_bool(officials.good_lift_rate);
        }

        self.in_progress = Some(InProgress {
            athlete: athlete.id,
            called_at: self.runner.now(),
            attempts_before: self.attempts_done(athlete.id),
            votes,
        });

        let started = Event::TimeStarted {
            origin: Origin::named(&Console::Timekeeper.to_string()),
        };
        self.runner
            .submit(PLATFORM, Console::Timekeeper, call_delay, started)?;

        let lifted = call_delay + lift_time;
        for (referee, decision) in votes.into_iter().enumerate() {
            let spread = self.sample((Duration::ZERO, officials.vote_spread));
            let console = Console::Referee(referee);
            let event = Event::DecisionUpdate {
                referee,
                decision,
                origin: Origin::named(&console.to_string()),
            };
            self.runner.submit(PLATFORM, console, lifted + spread, event)?;
        }

        let done = lifted
            + officials.vote_spread
            + self.config.fop.decision_settle_delay
            + self.config.fop.decision_reset_delay
            + GRACE;
        self.runner.run_until(self.runner.now() + done)?;
        Ok(())
    }

    /// Referee votes went missing: the jury enters the majority decision.
    fn jury_decision(&mut self) -> Result<(), SimulatorError> {
        let votes = self.in_progress.map_or([true; 3], |attempt| attempt.votes);
        let success = votes.iter().filter(|v| **v).count() >= 2;
        debug!(success, "Jury enters decision");

        let event = Event::ExplicitDecision {
            success,
            referees: votes.map(Some),
            origin: Origin::named(&Console::Jury.to_string()),
        };
        self.runner
            .schedule_initial_event(PLATFORM, Duration::ZERO, event)?;
        self.metrics.record_jury_decision();

        let wait =
            self.config.fop.decision_settle_delay + self.config.fop.decision_reset_delay + GRACE;
        self.runner.run_until(self.runner.now() + wait)?;
        Ok(())
    }

    fn report(self, duration: Duration) -> Result<SessionReport, SimulatorError> {
        let competition = &self.config.fop.competition;
        let mut athletes = self
            .runner
            .store()
            .find_all_by_group_and_weigh_in(Some(&self.group))?;
        assign_session_ranks(&mut athletes, competition);
        results_order(&mut athletes, RankingType::Total, competition);

        let good_lifts = athletes
            .iter()
            .flat_map(|a| a.snatch.iter().chain(a.clean_jerk.iter()))
            .filter(|attempt| attempt.result.is_some_and(|lift| lift.is_good()))
            .count() as u64;

        let stats = self.runner.stats();
        let summary = SessionSummary {
            seed: self.config.seed,
            duration,
            good_lifts,
            inputs_dropped: stats.inputs_dropped(),
            delivery_rate: stats.delivery_rate(),
        };
        let results = athletes
            .iter()
            .map(|athlete| AthleteResult::from_athlete(athlete, competition))
            .collect();
        let teams = team_scores(&athletes, RankingType::Total)
            .iter()
            .map(TeamResult::from)
            .collect();
        Ok(self.metrics.finalize(summary, results).with_teams(teams))
    }
}
