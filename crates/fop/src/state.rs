//! Field-of-play state machine.

use crate::config::{CONSECUTIVE_TIME_ALLOWED, DEFAULT_TIME_ALLOWED};
use crate::{CountdownClock, FopConfig};
use barbell_core::{
    Action, BreakType, ClockCommand, CountdownType, Cue, Event, FopState, Notification, Origin,
    StateMachine, TimerId, TimerPort, UiEvent,
};
use barbell_decision::{CueFlags, DecisionAggregator, DecisionPhase, Evaluation, REFEREES};
use barbell_ranking::{assign_session_ranks, count_lifts_done, display_order_copy, lifting_order};
use barbell_types::{Athlete, AthleteId, Group, PlatformIndex};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// A decision whose votes are all in, waiting for the settle delay.
#[derive(Debug, Clone)]
struct PendingDecision {
    athlete: Option<AthleteId>,
    origin: Origin,
}

/// One competition platform.
///
/// Owns the athletes of the current group (kept in lifting order), the
/// athlete and break clocks, the referee slate and the session state. All
/// mutation happens in [`StateMachine::handle`]; the runner guarantees one
/// event at a time per field of play.
pub struct FieldOfPlay {
    platform: PlatformIndex,
    config: FopConfig,
    group: Option<Group>,

    state: FopState,
    break_type: Option<BreakType>,

    /// Athletes of the group, in lifting order.
    athletes: Vec<Athlete>,
    display_order: Arc<[Athlete]>,

    current: Option<AthleteId>,
    previous: Option<AthleteId>,

    /// Athlete for whom the athlete clock value is meaningful.
    clock_owner: Option<AthleteId>,

    /// Requested weight shown on the board for the current athlete.
    displayed_weight: u32,

    athlete_clock: Box<dyn TimerPort>,
    break_clock: Box<dyn TimerPort>,

    decision: DecisionAggregator,
    pending: Option<PendingDecision>,
    cues: CueFlags,

    /// Decision cycle; decision timers carry the value they were set under.
    generation: u64,

    /// Bumped on every athlete clock start; cue timers carry it.
    clock_run: u64,

    /// Order in which lift results were applied.
    lift_sequence: u64,

    now: Duration,
}

impl std::fmt::Debug for FieldOfPlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldOfPlay")
            .field("platform", &self.platform)
            .field("group", &self.group.as_ref().map(|g| g.name.as_str()))
            .field("state", &self.state)
            .field("break_type", &self.break_type)
            .field("current", &self.current)
            .field("previous", &self.previous)
            .field("clock_owner", &self.clock_owner)
            .field("athletes", &self.athletes.len())
            .field("generation", &self.generation)
            .field("now", &self.now)
            .finish()
    }
}

impl FieldOfPlay {
    /// Create an inactive field of play with deterministic clocks.
    pub fn new(
        platform: PlatformIndex,
        group: Option<Group>,
        athletes: Vec<Athlete>,
        config: FopConfig,
    ) -> Self {
        Self::with_clocks(
            platform,
            group,
            athletes,
            config,
            Box::new(CountdownClock::default()),
            Box::new(CountdownClock::default()),
        )
    }

    /// Create an inactive field of play around the given clocks.
    pub fn with_clocks(
        platform: PlatformIndex,
        group: Option<Group>,
        athletes: Vec<Athlete>,
        config: FopConfig,
        athlete_clock: Box<dyn TimerPort>,
        break_clock: Box<dyn TimerPort>,
    ) -> Self {
        let mut fop = Self {
            platform,
            config,
            group,
            state: FopState::Inactive,
            break_type: None,
            athletes: Vec::new(),
            display_order: Arc::from(Vec::new()),
            current: None,
            previous: None,
            clock_owner: None,
            displayed_weight: 0,
            athlete_clock,
            break_clock,
            decision: DecisionAggregator::new(),
            pending: None,
            cues: CueFlags::default(),
            generation: 0,
            clock_run: 0,
            lift_sequence: 0,
            now: Duration::ZERO,
        };
        fop.install_athletes(athletes);
        fop
    }

    pub fn platform(&self) -> PlatformIndex {
        self.platform
    }

    pub fn config(&self) -> &FopConfig {
        &self.config
    }

    pub fn group(&self) -> Option<&Group> {
        self.group.as_ref()
    }

    pub fn state(&self) -> FopState {
        self.state
    }

    pub fn break_type(&self) -> Option<BreakType> {
        self.break_type
    }

    /// Athletes in lifting order.
    pub fn lifting_order(&self) -> &[Athlete] {
        &self.athletes
    }

    pub fn display_order(&self) -> &[Athlete] {
        &self.display_order
    }

    pub fn athlete(&self, id: AthleteId) -> Option<&Athlete> {
        self.athletes.iter().find(|a| a.id == id)
    }

    pub fn current_athlete(&self) -> Option<&Athlete> {
        self.current.and_then(|id| self.athlete(id))
    }

    pub fn previous_athlete(&self) -> Option<&Athlete> {
        self.previous.and_then(|id| self.athlete(id))
    }

    /// First athlete in lifting order other than the current one.
    pub fn next_athlete(&self) -> Option<&Athlete> {
        self.athletes.iter().find(|a| Some(a.id) != self.current)
    }

    pub fn clock_owner(&self) -> Option<AthleteId> {
        self.clock_owner
    }

    pub fn athlete_clock(&self) -> &dyn TimerPort {
        self.athlete_clock.as_ref()
    }

    pub fn break_clock(&self) -> &dyn TimerPort {
        self.break_clock.as_ref()
    }

    pub fn decisions(&self) -> [Option<bool>; REFEREES] {
        self.decision.decisions()
    }

    pub fn decision_phase(&self) -> DecisionPhase {
        self.decision.phase()
    }

    pub fn cues(&self) -> &CueFlags {
        &self.cues
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Lifting order
    // ═══════════════════════════════════════════════════════════════════════

    fn install_athletes(&mut self, athletes: Vec<Athlete>) {
        self.lift_sequence = athletes
            .iter()
            .filter_map(Athlete::last_lift_sequence)
            .max()
            .unwrap_or(0);
        self.athletes = athletes;
        self.current = None;
        self.previous = None;
        self.clock_owner = None;
        if self.athletes.is_empty() {
            self.display_order = Arc::from(Vec::new());
        } else {
            self.recompute_lifting_order();
        }
    }

    /// Sort, rank, pick the current athlete and grant their clock.
    fn recompute_lifting_order(&mut self) {
        self.sort_athletes();
        self.current = self.athletes.first().map(|a| a.id);
        self.displayed_weight = self
            .current_athlete()
            .map_or(0, Athlete::next_attempt_requested_weight);
        let time_allowed = self.time_allowed();
        self.athlete_clock.set_time_remaining(time_allowed);
        debug!(
            platform = self.platform.0,
            current = ?self.current,
            previous = ?self.previous,
            ?time_allowed,
            lifts_done = count_lifts_done(&self.athletes),
            "recomputed lifting order"
        );
    }

    /// Sort and rank without touching the current athlete or the clock.
    fn sort_athletes(&mut self) {
        lifting_order(&mut self.athletes);
        assign_session_ranks(&mut self.athletes, &self.config.competition);
        self.display_order = Arc::from(display_order_copy(&self.athletes));
    }

    /// Clock granted to the current athlete.
    ///
    /// The clock owner resumes where their clock stopped. An athlete
    /// following themselves gets two minutes, unless someone else already
    /// holds the clock or it is their first attempt of the lift.
    fn time_allowed(&mut self) -> Duration {
        let Some(current) = self.current else {
            self.reset_decisions();
            return DEFAULT_TIME_ALLOWED;
        };
        if self.clock_owner == Some(current) {
            return self.athlete_clock.time_remaining_at_last_stop();
        }

        let attempt_number = self.athlete(current).map_or(1, Athlete::attempt_number);
        self.reset_decisions();
        if self.previous == Some(current) {
            if self.clock_owner.is_some() || attempt_number == 1 {
                DEFAULT_TIME_ALLOWED
            } else {
                CONSECUTIVE_TIME_ALLOWED
            }
        } else {
            DEFAULT_TIME_ALLOWED
        }
    }

    fn reset_decisions(&mut self) {
        self.decision.reset();
        self.pending = None;
    }

    fn display_current(&mut self, clock_stopped: bool, changing: Option<Athlete>, origin: Origin) -> Action {
        let current = self.current_athlete().cloned();
        self.displayed_weight = current
            .as_ref()
            .map_or(0, Athlete::next_attempt_requested_weight);
        let clock = self.athlete_clock.time_remaining();

        info!(
            platform = self.platform.0,
            current = ?self.current,
            attempt = current.as_ref().map_or(0, |a| a.attempts_done() + 1),
            requested = self.displayed_weight,
            ?clock,
            "athlete displayed"
        );

        Action::PostUi {
            event: UiEvent::LiftingOrderUpdated {
                current,
                next: self.next_athlete().cloned(),
                previous: self.previous_athlete().cloned(),
                changing,
                lifting_order: Arc::from(self.athletes.clone()),
                display_order: Arc::clone(&self.display_order),
                clock,
                clock_stopped,
                origin,
            },
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Clocks
    // ═══════════════════════════════════════════════════════════════════════

    fn start_athlete_clock(&mut self, origin: &Origin) -> Vec<Action> {
        self.athlete_clock.start();
        self.clock_run += 1;
        let remaining = self.athlete_clock.time_remaining();

        let mut actions = Vec::new();
        for (id, threshold) in [
            (TimerId::InitialWarning, self.config.initial_warning),
            (TimerId::FinalWarning, self.config.final_warning),
        ] {
            if remaining > threshold {
                actions.push(Action::SetTimer {
                    id,
                    duration: remaining - threshold,
                    tag: self.clock_run,
                });
            }
        }
        actions.push(Action::SetTimer {
            id: TimerId::ClockExpired,
            duration: remaining,
            tag: self.clock_run,
        });
        actions.push(self.athlete_clock_ui(ClockCommand::Start, origin));
        actions
    }

    /// Stop the athlete clock and its cue timers. No-op when already stopped.
    fn stop_athlete_clock(&mut self, origin: &Origin) -> Vec<Action> {
        if !self.athlete_clock.is_running() {
            return vec![];
        }
        self.athlete_clock.stop();
        let mut actions: Vec<Action> = TimerId::CLOCK
            .iter()
            .map(|&id| Action::CancelTimer { id })
            .collect();
        actions.push(self.athlete_clock_ui(ClockCommand::Stop, origin));
        actions
    }

    fn athlete_clock_ui(&self, command: ClockCommand, origin: &Origin) -> Action {
        Action::PostUi {
            event: UiEvent::AthleteClock {
                command,
                remaining: self.athlete_clock.time_remaining(),
                origin: origin.clone(),
            },
        }
    }

    fn stop_break_clock(&mut self, origin: &Origin) -> Vec<Action> {
        if !self.break_clock.is_running() {
            return vec![];
        }
        self.break_clock.stop();
        vec![Action::PostUi {
            event: UiEvent::BreakClock {
                command: ClockCommand::Stop,
                remaining: self.break_clock.time_remaining(),
                origin: origin.clone(),
            },
        }]
    }

    fn sound(&mut self, cue: Cue) -> Vec<Action> {
        if self.cues.fire(cue) && self.config.emit_sounds {
            vec![Action::EmitSound { cue }]
        } else {
            vec![]
        }
    }

    fn on_clock_cue(&mut self, cue: Cue, clock_run: u64) -> Vec<Action> {
        if clock_run != self.clock_run || !self.athlete_clock.is_running() {
            debug!(?cue, clock_run, current = self.clock_run, "stale clock cue");
            return vec![];
        }
        self.sound(cue)
    }

    fn on_clock_expired(&mut self, clock_run: u64) -> Vec<Action> {
        if clock_run != self.clock_run || !self.athlete_clock.is_running() {
            debug!(clock_run, current = self.clock_run, "stale clock expiry");
            return vec![];
        }
        let mut actions = self.time_over(&Origin::internal());
        if self.state == FopState::TimeRunning {
            self.state = FopState::TimeStopped;
        }
        actions.extend(self.sound_time_over());
        actions
    }

    fn time_over(&mut self, origin: &Origin) -> Vec<Action> {
        debug!(platform = self.platform.0, "time over");
        self.stop_athlete_clock(origin)
    }

    fn sound_time_over(&mut self) -> Vec<Action> {
        self.sound(Cue::TimeOver)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Transitions available in every state
    // ═══════════════════════════════════════════════════════════════════════

    /// Cancel decision timers; a decision still settling is dropped.
    fn cancel_decision_timers(&mut self) -> Vec<Action> {
        if matches!(self.decision.phase(), DecisionPhase::Settling { .. }) {
            debug!(platform = self.platform.0, "pending decision dropped");
            self.reset_decisions();
        }
        TimerId::DECISION
            .iter()
            .map(|&id| Action::CancelTimer { id })
            .collect()
    }

    fn transition_to_break(
        &mut self,
        break_type: BreakType,
        countdown: CountdownType,
        target: Option<Duration>,
        indefinite: bool,
        origin: Origin,
    ) -> Vec<Action> {
        let mut actions = self.cancel_decision_timers();
        self.generation += 1;

        let remaining = match countdown {
            _ if indefinite => None,
            CountdownType::Duration(duration) => Some(duration),
            CountdownType::Target => target.map(|t| t.saturating_sub(self.now)),
            CountdownType::Indefinite => None,
        };

        self.break_clock.stop();
        if let Some(remaining) = remaining {
            self.break_clock.set_time_remaining(remaining);
            self.break_clock.start();
            actions.push(Action::PostUi {
                event: UiEvent::BreakClock {
                    command: ClockCommand::Start,
                    remaining,
                    origin: origin.clone(),
                },
            });
        }

        info!(platform = self.platform.0, ?break_type, ?remaining, "break started");
        self.break_type = Some(break_type);
        self.state = FopState::Break;
        actions.push(Action::PostUi {
            event: UiEvent::BreakStarted {
                break_type,
                remaining,
                origin,
            },
        });
        actions
    }

    fn transition_to_lifting(&mut self, origin: Origin) -> Vec<Action> {
        let mut actions = self.cancel_decision_timers();
        self.generation += 1;
        actions.extend(self.stop_athlete_clock(&origin));
        actions.extend(self.stop_break_clock(&origin));

        self.recompute_lifting_order();
        self.break_type = None;
        self.state = FopState::AthleteDisplayed;
        actions.push(self.display_current(true, None, origin));
        actions
    }

    fn switch_group(&mut self, group: Option<Group>, origin: Origin) -> Vec<Action> {
        info!(
            platform = self.platform.0,
            group = group.as_ref().map_or("-", |g| g.name.as_str()),
            "switching group"
        );
        vec![Action::LoadAthletes { group, origin }]
    }

    fn load_athletes(
        &mut self,
        group: Option<Group>,
        athletes: Vec<Athlete>,
        group_done: bool,
        origin: Origin,
    ) -> Vec<Action> {
        let mut actions = self.cancel_decision_timers();
        actions.extend(self.stop_athlete_clock(&origin));
        self.reset_decisions();
        self.cues.reset();
        self.generation += 1;
        self.group = group;
        info!(
            platform = self.platform.0,
            group = self.group.as_ref().map_or("-", |g| g.name.as_str()),
            athletes = athletes.len(),
            group_done,
            "group loaded"
        );
        self.install_athletes(athletes);

        if group_done {
            actions.extend(self.stop_break_clock(&origin));
            actions.extend(self.group_done(origin));
            return actions;
        }
        actions.extend(self.transition_to_lifting(origin));
        actions
    }

    fn group_done(&mut self, origin: Origin) -> Vec<Action> {
        info!(
            platform = self.platform.0,
            group = self.group.as_ref().map_or("-", |g| g.name.as_str()),
            "group done"
        );
        self.break_type = Some(BreakType::GroupDone);
        self.state = FopState::Break;
        vec![Action::PostUi {
            event: UiEvent::GroupDone {
                group: self.group.clone(),
                origin,
            },
        }]
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Clock ownership
    // ═══════════════════════════════════════════════════════════════════════

    /// A fresh clock for the current athlete: they become the owner and the
    /// cue flags start over.
    fn transition_to_time_running(&mut self, origin: Origin) -> Vec<Action> {
        let actions = self.start_athlete_clock(&origin);
        self.clock_owner = self.current;
        self.cues.reset();
        self.state = FopState::TimeRunning;
        actions
    }

    /// Clock restarted after a stop; votes and cue flags are kept.
    fn restart_time(&mut self, origin: Origin) -> Vec<Action> {
        let actions = self.start_athlete_clock(&origin);
        self.clock_owner = self.current;
        self.state = FopState::TimeRunning;
        actions
    }

    fn stop_time(&mut self, origin: Origin) -> Vec<Action> {
        let actions = self.stop_athlete_clock(&origin);
        self.state = FopState::TimeStopped;
        actions
    }

    fn force_time(&mut self, time_allowed: Duration, origin: Origin) -> Vec<Action> {
        debug!(platform = self.platform.0, ?time_allowed, "time forced");
        self.athlete_clock.set_time_remaining(time_allowed);
        self.state = FopState::AthleteDisplayed;
        vec![self.athlete_clock_ui(ClockCommand::Set, &origin)]
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Weight changes
    // ═══════════════════════════════════════════════════════════════════════

    /// Store the new snapshot; `false` when the athlete is not in this group.
    fn replace_athlete(&mut self, changed: &Athlete) -> bool {
        match self.athletes.iter_mut().find(|a| a.id == changed.id) {
            Some(slot) => {
                *slot = changed.clone();
                true
            }
            None => false,
        }
    }

    fn weight_change(&mut self, changed: Athlete, origin: Origin) -> Vec<Action> {
        if !self.replace_athlete(&changed) {
            warn!(athlete = %changed.id, "weight change for an athlete outside the group");
            return self.unexpected("WeightChange", origin);
        }
        let new_weight = changed.next_attempt_requested_weight();

        match self.clock_owner {
            None => {
                self.recompute_lifting_order();
                vec![self.display_current(true, Some(changed), origin)]
            }
            Some(owner) if owner == changed.id => {
                if new_weight != self.displayed_weight {
                    debug!(athlete = %owner, new_weight, "weight change for clock owner");
                    let on_group_done_break =
                        self.state == FopState::Break && self.break_type == Some(BreakType::GroupDone);
                    let mut actions = self.stop_athlete_clock(&origin);
                    self.recompute_lifting_order();
                    self.state = FopState::AthleteDisplayed;
                    if on_group_done_break {
                        actions.extend(self.stop_break_clock(&origin));
                    }
                    actions.push(self.display_current(true, Some(changed), origin));
                    actions
                } else if changed.current_declaration() == Some(new_weight) {
                    debug!(athlete = %owner, new_weight, "declaration for clock owner");
                    vec![Action::PostUi {
                        event: UiEvent::Notification {
                            notification: Notification::Declaration {
                                athlete: owner,
                                weight: new_weight,
                            },
                            origin,
                        },
                    }]
                } else {
                    vec![]
                }
            }
            Some(_) => self.reorder_quietly(changed, origin),
        }
    }

    /// Refresh the order for off-screen views without touching the clock or
    /// the athlete being judged.
    fn weight_change_do_not_disturb(&mut self, changed: Athlete, origin: Origin) -> Vec<Action> {
        if !self.replace_athlete(&changed) {
            warn!(athlete = %changed.id, "weight change for an athlete outside the group");
            return self.unexpected("WeightChange", origin);
        }
        self.reorder_quietly(changed, origin)
    }

    fn reorder_quietly(&mut self, changed: Athlete, origin: Origin) -> Vec<Action> {
        trace!(athlete = %changed.id, "reordering without disturbing the clock");
        self.sort_athletes();
        let clock = self.athlete_clock.time_remaining();
        vec![Action::PostUi {
            event: UiEvent::LiftingOrderUpdated {
                current: self.current_athlete().cloned(),
                next: self.next_athlete().cloned(),
                previous: self.previous_athlete().cloned(),
                changing: Some(changed),
                lifting_order: Arc::from(self.athletes.clone()),
                display_order: Arc::clone(&self.display_order),
                clock,
                clock_stopped: !self.athlete_clock.is_running(),
                origin,
            },
        }]
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Decisions
    // ═══════════════════════════════════════════════════════════════════════

    fn emit_down(&mut self, origin: Origin) -> Vec<Action> {
        let mut actions = self.stop_athlete_clock(&origin);
        if self.cues.fire(Cue::Down) {
            info!(platform = self.platform.0, current = ?self.current, "down signal");
            actions.push(Action::PostUi {
                event: UiEvent::DownSignal { origin },
            });
            if self.config.emit_sounds {
                actions.push(Action::EmitSound { cue: Cue::Down });
            }
        }
        self.state = FopState::DownSignalVisible;
        actions
    }

    fn referee_update(&self, origin: Origin) -> Action {
        Action::PostUi {
            event: UiEvent::RefereeUpdate {
                athlete: self.current_athlete().cloned(),
                decisions: self.decision.decisions(),
                times: self.decision.times(),
                origin,
            },
        }
    }

    fn on_decision_update(&mut self, referee: usize, decision: bool, origin: Origin) -> Vec<Action> {
        match self.decision.record(referee, decision, self.now) {
            Ok(evaluation) => self.process_referee_decisions(evaluation, origin),
            Err(error) => {
                warn!(%error, "rejected referee decision");
                self.unexpected("DecisionUpdate", origin)
            }
        }
    }

    fn on_decision_full_update(
        &mut self,
        decisions: [Option<bool>; REFEREES],
        times: [Option<Duration>; REFEREES],
        origin: Origin,
    ) -> Vec<Action> {
        let evaluation = self.decision.record_all(decisions, times);
        self.process_referee_decisions(evaluation, origin)
    }

    /// Down signal on the first majority, provisional decision and settle
    /// timer once all votes are in. Once a decision is shown, further votes
    /// only refresh the jury display.
    fn process_referee_decisions(&mut self, evaluation: Evaluation, origin: Origin) -> Vec<Action> {
        if self.state == FopState::DecisionVisible {
            return vec![self.referee_update(origin)];
        }

        let mut actions = Vec::new();
        if evaluation.majority.is_some() && !self.cues.has_fired(Cue::Down) {
            actions.extend(self.emit_down(origin.clone()));
        }
        actions.push(self.referee_update(origin.clone()));

        if let Some(good_lift) = evaluation.completed {
            debug!(
                platform = self.platform.0,
                good_lift,
                delay = ?self.config.decision_settle_delay,
                "decision settling"
            );
            self.pending = Some(PendingDecision {
                athlete: self.current,
                origin: origin.clone(),
            });
            actions.push(Action::PostUi {
                event: UiEvent::Decision {
                    athlete: self.current_athlete().cloned(),
                    good_lift,
                    decisions: self.decision.decisions(),
                    origin,
                },
            });
            actions.push(Action::SetTimer {
                id: TimerId::DecisionSettle,
                duration: self.config.decision_settle_delay,
                tag: self.generation,
            });
        }
        actions
    }

    fn on_settle_timer(&mut self, generation: u64) -> Vec<Action> {
        let deciding = matches!(
            self.state,
            FopState::TimeRunning | FopState::TimeStopped | FopState::DownSignalVisible
        );
        let provisional = match self.decision.phase() {
            DecisionPhase::Settling { provisional } => provisional,
            _ => {
                debug!(generation, "no decision settling");
                return vec![];
            }
        };
        if generation != self.generation || !deciding {
            debug!(generation, current = self.generation, state = %self.state, "stale decision settle timer");
            return vec![];
        }
        let Some(good_lift) = self.decision.settle() else {
            return vec![];
        };
        let pending = self.pending.take();
        let (athlete, origin) = match pending {
            Some(p) => (p.athlete, p.origin),
            None => (self.current, Origin::internal()),
        };

        let mut actions = self.stop_athlete_clock(&origin);
        self.previous = self.current;
        self.clock_owner = None;
        let decisions = self.decision.decisions();
        actions.extend(self.finalize_decision(athlete, good_lift, decisions, good_lift != provisional, origin));
        actions
    }

    fn explicit_decision(&mut self, success: bool, origin: Origin) -> Vec<Action> {
        let mut actions = self.stop_athlete_clock(&origin);
        actions.extend(self.cancel_decision_timers());
        self.previous = self.current;
        self.clock_owner = None;
        let decisions = self.decision.explicit(success, self.now);
        actions.extend(self.finalize_decision(self.current, success, decisions, true, origin));
        actions
    }

    /// Apply the lift result to the judged athlete, persist it, recompute the
    /// order and schedule the return to the lifting order.
    fn finalize_decision(
        &mut self,
        athlete: Option<AthleteId>,
        good_lift: bool,
        decisions: [Option<bool>; REFEREES],
        announce: bool,
        origin: Origin,
    ) -> Vec<Action> {
        let mut actions = Vec::new();
        self.lift_sequence += 1;
        let sequence = self.lift_sequence;

        let mut judged = None;
        if let Some(slot) = athlete.and_then(|id| self.athletes.iter_mut().find(|a| a.id == id)) {
            let result = if good_lift {
                slot.successful_lift(sequence)
            } else {
                slot.failed_lift(sequence)
            };
            match result {
                Ok(lift) => {
                    info!(athlete = %slot.id, ?lift, sequence, "decision applied");
                    actions.push(Action::PersistAthlete {
                        athlete: slot.clone(),
                    });
                }
                Err(error) => warn!(%error, "decision not applied"),
            }
            judged = Some(slot.clone());
        } else {
            warn!(?athlete, "decision without an athlete to judge");
        }

        if announce {
            actions.push(Action::PostUi {
                event: UiEvent::Decision {
                    athlete: judged,
                    good_lift,
                    decisions,
                    origin,
                },
            });
        }

        self.recompute_lifting_order();
        self.state = FopState::DecisionVisible;
        actions.push(Action::SetTimer {
            id: TimerId::DecisionReset,
            duration: self.config.decision_reset_delay,
            tag: self.generation,
        });
        actions
    }

    fn on_reset_timer(&mut self, generation: u64) -> Vec<Action> {
        if generation != self.generation || self.state != FopState::DecisionVisible {
            debug!(generation, current = self.generation, state = %self.state, "stale decision reset timer");
            return vec![];
        }
        self.reset_decision_display(Origin::internal())
    }

    fn reset_decision_display(&mut self, origin: Origin) -> Vec<Action> {
        debug!(platform = self.platform.0, "resetting decisions");
        let mut actions = vec![
            Action::CancelTimer {
                id: TimerId::DecisionReset,
            },
            Action::PostUi {
                event: UiEvent::DecisionReset {
                    origin: origin.clone(),
                },
            },
        ];
        self.reset_decisions();
        self.clock_owner = None;
        self.generation += 1;
        actions.extend(self.display_or_break_if_done(origin));
        actions
    }

    fn display_or_break_if_done(&mut self, origin: Origin) -> Vec<Action> {
        match self.current_athlete() {
            Some(current) if !current.is_finished() => {
                self.state = FopState::AthleteDisplayed;
                vec![self.display_current(true, None, origin)]
            }
            _ => self.group_done(origin),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Unexpected input
    // ═══════════════════════════════════════════════════════════════════════

    /// Report an event the current state has no transition for. The state is
    /// left unchanged.
    fn unexpected(&self, event: &'static str, origin: Origin) -> Vec<Action> {
        if matches!(event, "DecisionReset" | "DecisionFullUpdate") {
            trace!(event, state = %self.state, "ignored stray event");
            return vec![];
        }
        warn!(platform = self.platform.0, event, state = %self.state, "unexpected event in state");
        vec![Action::PostUi {
            event: UiEvent::Notification {
                notification: Notification::UnexpectedEvent {
                    event,
                    state: self.state,
                },
                origin,
            },
        }]
    }

    fn handle_in_state(&mut self, event: Event) -> Vec<Action> {
        use FopState::*;

        // whatever happens next, the clock measurement of the judged lift is spent
        if self.state == DownSignalVisible {
            self.previous = self.current;
            self.clock_owner = None;
        }

        match (self.state, event) {
            (Inactive | AthleteDisplayed, Event::TimeStarted { origin }) => {
                self.transition_to_time_running(origin)
            }
            (TimeStopped, Event::TimeStarted { origin }) => self.restart_time(origin),

            (Break, Event::BreakPaused { origin }) => {
                let mut actions = self.stop_break_clock(&origin);
                actions.push(Action::PostUi {
                    event: UiEvent::BreakPaused { origin },
                });
                actions
            }

            (AthleteDisplayed | TimeStopped, Event::ForceTime { time_allowed, origin }) => {
                self.force_time(time_allowed, origin)
            }

            (TimeRunning | TimeStopped, Event::DownSignal { origin }) => self.emit_down(origin),

            (TimeRunning, Event::TimeStopped { origin }) => self.stop_time(origin),
            (TimeRunning, Event::TimeOver { origin }) => {
                let mut actions = self.time_over(&origin);
                self.state = TimeStopped;
                actions.extend(self.sound_time_over());
                actions
            }
            (TimeStopped, Event::TimeStopped { .. } | Event::TimeOver { .. }) => {
                trace!("clock already stopped");
                vec![]
            }

            (
                TimeRunning | TimeStopped | DownSignalVisible | DecisionVisible,
                Event::DecisionUpdate {
                    referee,
                    decision,
                    origin,
                },
            ) => self.on_decision_update(referee, decision, origin),
            (
                TimeRunning | TimeStopped | DownSignalVisible | DecisionVisible,
                Event::DecisionFullUpdate {
                    decisions,
                    times,
                    origin,
                },
            ) => self.on_decision_full_update(decisions, times, origin),

            (
                TimeRunning | TimeStopped | DownSignalVisible,
                Event::ExplicitDecision { success, origin, .. },
            ) => self.explicit_decision(success, origin),

            (
                Inactive | Break | AthleteDisplayed | TimeRunning | TimeStopped,
                Event::WeightChange { athlete, origin },
            ) => self.weight_change(athlete, origin),
            (DownSignalVisible | DecisionVisible, Event::WeightChange { athlete, origin }) => {
                self.weight_change_do_not_disturb(athlete, origin)
            }

            (DecisionVisible, Event::DecisionReset { origin }) => self.reset_decision_display(origin),

            (_, event) => self.unexpected(event.type_name(), event.origin()),
        }
    }
}

impl StateMachine for FieldOfPlay {
    fn handle(&mut self, event: Event) -> Vec<Action> {
        trace!(
            platform = self.platform.0,
            state = %self.state,
            event = event.type_name(),
            "handling event"
        );

        match event {
            Event::DecisionSettleTimer { generation } => self.on_settle_timer(generation),
            Event::DecisionResetTimer { generation } => self.on_reset_timer(generation),
            Event::InitialWarningTimer { clock_run } => self.on_clock_cue(Cue::InitialWarning, clock_run),
            Event::FinalWarningTimer { clock_run } => self.on_clock_cue(Cue::FinalWarning, clock_run),
            Event::ClockExpiredTimer { clock_run } => self.on_clock_expired(clock_run),

            // a break or the start of lifting can always be forced
            Event::BreakStarted {
                break_type,
                countdown,
                target,
                indefinite,
                origin,
            } => self.transition_to_break(break_type, countdown, target, indefinite, origin),
            Event::StartLifting { origin } => self.transition_to_lifting(origin),

            Event::SwitchGroup { group, origin } => self.switch_group(group, origin),
            Event::AthletesLoaded {
                group,
                athletes,
                group_done,
                origin,
            } => self.load_athletes(group, athletes, group_done, origin),

            event => self.handle_in_state(event),
        }
    }

    fn set_time(&mut self, now: Duration) {
        self.now = now;
        self.athlete_clock.set_time(now);
        self.break_clock.set_time(now);
    }

    fn now(&self) -> Duration {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barbell_types::test_utils::test_athlete;
    use tracing_test::traced_test;

    fn official() -> Origin {
        Origin::named("console")
    }

    /// Three athletes requesting 100, 105 and 110.
    fn session(config: FopConfig) -> FieldOfPlay {
        let athletes = vec![test_athlete(3, 110), test_athlete(1, 100), test_athlete(2, 105)];
        FieldOfPlay::new(PlatformIndex(0), Some(Group::new("A")), athletes, config)
    }

    fn ui(actions: &[Action]) -> Vec<&UiEvent> {
        actions
            .iter()
            .filter_map(|a| match a {
                Action::PostUi { event } => Some(event),
                _ => None,
            })
            .collect()
    }

    fn ui_names(actions: &[Action]) -> Vec<&'static str> {
        ui(actions).iter().map(|e| e.type_name()).collect()
    }

    fn timer(actions: &[Action], wanted: TimerId) -> Option<(Duration, u64)> {
        actions.iter().rev().find_map(|a| match a {
            Action::SetTimer { id, duration, tag } if *id == wanted => Some((*duration, *tag)),
            _ => None,
        })
    }

    fn fire(fop: &mut FieldOfPlay, actions: &[Action], id: TimerId) -> Vec<Action> {
        let (_, tag) = timer(actions, id).expect("timer scheduled");
        fop.handle(Event::from_timer(id, tag))
    }

    fn vote(fop: &mut FieldOfPlay, referee: usize, decision: bool) -> Vec<Action> {
        fop.handle(Event::DecisionUpdate {
            referee,
            decision,
            origin: official(),
        })
    }

    /// Lifting started and the clock running for the first athlete.
    fn running(config: FopConfig) -> FieldOfPlay {
        let mut fop = session(config);
        fop.handle(Event::StartLifting { origin: official() });
        fop.handle(Event::TimeStarted { origin: official() });
        assert_eq!(fop.state(), FopState::TimeRunning);
        fop
    }

    #[test]
    fn test_new_session_is_inactive_with_lightest_request_up() {
        let fop = session(FopConfig::testing());
        assert_eq!(fop.state(), FopState::Inactive);
        assert_eq!(fop.current_athlete().map(|a| a.id), Some(AthleteId(1)));
        assert_eq!(fop.athlete_clock().time_remaining(), DEFAULT_TIME_ALLOWED);
        let order: Vec<u64> = fop.lifting_order().iter().map(|a| a.id.0).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn test_start_lifting_displays_current_athlete() {
        let mut fop = session(FopConfig::testing());
        let actions = fop.handle(Event::StartLifting { origin: official() });

        assert_eq!(fop.state(), FopState::AthleteDisplayed);
        match ui(&actions).last() {
            Some(UiEvent::LiftingOrderUpdated {
                current,
                next,
                clock,
                clock_stopped,
                ..
            }) => {
                assert_eq!(current.as_ref().map(|a| a.id), Some(AthleteId(1)));
                assert_eq!(next.as_ref().map(|a| a.id), Some(AthleteId(2)));
                assert_eq!(*clock, DEFAULT_TIME_ALLOWED);
                assert!(*clock_stopped);
            }
            other => panic!("expected lifting order, got {other:?}"),
        }
    }

    #[test]
    fn test_time_started_makes_current_athlete_clock_owner() {
        let fop = running(FopConfig::testing());
        assert_eq!(fop.clock_owner(), Some(AthleteId(1)));
        assert!(fop.athlete_clock().is_running());
    }

    #[test]
    fn test_clock_start_schedules_cues() {
        let mut fop = session(FopConfig::testing());
        fop.handle(Event::StartLifting { origin: official() });
        let actions = fop.handle(Event::TimeStarted { origin: official() });

        // 60 s on the clock: too short for the 90 s warning
        assert_eq!(timer(&actions, TimerId::InitialWarning), None);
        assert_eq!(
            timer(&actions, TimerId::FinalWarning),
            Some((Duration::from_secs(30), 1))
        );
        assert_eq!(
            timer(&actions, TimerId::ClockExpired),
            Some((Duration::from_secs(60), 1))
        );
        assert_eq!(ui_names(&actions), vec!["AthleteClock"]);
    }

    #[traced_test]
    #[test]
    fn test_unexpected_event_leaves_state_unchanged() {
        let mut fop = session(FopConfig::testing());
        fop.handle(Event::StartLifting { origin: official() });

        let actions = fop.handle(Event::DownSignal { origin: official() });

        assert_eq!(fop.state(), FopState::AthleteDisplayed);
        assert_eq!(actions.len(), 1);
        match ui(&actions)[0] {
            UiEvent::Notification {
                notification: Notification::UnexpectedEvent { event, state },
                ..
            } => {
                assert_eq!(*event, "DownSignal");
                assert_eq!(*state, FopState::AthleteDisplayed);
            }
            other => panic!("expected notification, got {other:?}"),
        }
        assert!(logs_contain("unexpected event in state"));
    }

    #[test]
    fn test_stray_reset_and_full_update_are_silently_ignored() {
        let mut fop = session(FopConfig::testing());
        fop.handle(Event::StartLifting { origin: official() });

        assert!(fop.handle(Event::DecisionReset { origin: official() }).is_empty());
        let full = Event::DecisionFullUpdate {
            decisions: [Some(true); 3],
            times: [None; 3],
            origin: official(),
        };
        assert!(fop.handle(full).is_empty());
        assert_eq!(fop.state(), FopState::AthleteDisplayed);
    }

    #[test]
    fn test_time_started_while_running_is_unexpected() {
        let mut fop = running(FopConfig::testing());
        let actions = fop.handle(Event::TimeStarted { origin: official() });
        assert_eq!(fop.state(), FopState::TimeRunning);
        assert!(actions.iter().all(|a| !matches!(a, Action::SetTimer { .. })));
        assert_eq!(ui_names(&actions), vec!["Notification"]);
    }

    #[test]
    fn test_duplicate_time_stopped_is_a_no_op() {
        let mut fop = running(FopConfig::testing());
        fop.set_time(Duration::from_secs(12));
        let first = fop.handle(Event::TimeStopped { origin: official() });
        assert_eq!(fop.state(), FopState::TimeStopped);
        assert!(first
            .iter()
            .any(|a| matches!(a, Action::CancelTimer { id: TimerId::ClockExpired })));

        assert!(fop.handle(Event::TimeStopped { origin: official() }).is_empty());
        assert!(fop.handle(Event::TimeOver { origin: official() }).is_empty());
        assert_eq!(fop.athlete_clock().time_remaining(), Duration::from_secs(48));
    }

    #[test]
    fn test_restart_after_stop_keeps_votes() {
        let mut fop = running(FopConfig::testing());
        fop.handle(Event::TimeStopped { origin: official() });
        vote(&mut fop, 0, true);

        fop.handle(Event::TimeStarted { origin: official() });

        assert_eq!(fop.state(), FopState::TimeRunning);
        assert_eq!(fop.decisions(), [Some(true), None, None]);
    }

    #[traced_test]
    #[test]
    fn test_down_signal_fires_once_then_decision_settles() {
        let mut fop = running(FopConfig::testing());

        let first = vote(&mut fop, 0, true);
        assert_eq!(ui_names(&first), vec!["RefereeUpdate"]);

        let second = vote(&mut fop, 1, true);
        assert_eq!(fop.state(), FopState::DownSignalVisible);
        assert_eq!(
            ui_names(&second).iter().filter(|n| **n == "DownSignal").count(),
            1
        );

        let third = vote(&mut fop, 2, true);
        assert!(!ui_names(&third).contains(&"DownSignal"));
        assert!(ui_names(&third).contains(&"Decision"));
        // shown, not yet applied
        assert_eq!(fop.athlete(AthleteId(1)).map(Athlete::attempts_done), Some(0));

        let settled = fire(&mut fop, &third, TimerId::DecisionSettle);
        assert_eq!(fop.state(), FopState::DecisionVisible);
        assert_eq!(fop.athlete(AthleteId(1)).map(|a| a.best_snatch()), Some(100));
        assert!(settled
            .iter()
            .any(|a| matches!(a, Action::PersistAthlete { athlete } if athlete.id == AthleteId(1))));
        // the outcome did not change while settling: no second announcement
        assert!(!ui_names(&settled).contains(&"Decision"));
        assert!(logs_contain("decision applied"));

        let reset = fire(&mut fop, &settled, TimerId::DecisionReset);
        assert_eq!(fop.state(), FopState::AthleteDisplayed);
        assert_eq!(ui_names(&reset), vec!["DecisionReset", "LiftingOrderUpdated"]);
        assert_eq!(fop.clock_owner(), None);
        assert_eq!(fop.decisions(), [None; 3]);
    }

    #[test]
    fn test_majority_of_three() {
        let cases = [
            ([true, true, false], true),
            ([true, false, true], true),
            ([false, true, true], true),
            ([false, false, true], false),
            ([true, false, false], false),
        ];
        for (votes, expected) in cases {
            let mut fop = running(FopConfig::testing());
            let mut last = Vec::new();
            for (referee, decision) in votes.into_iter().enumerate() {
                last = vote(&mut fop, referee, decision);
            }
            fire(&mut fop, &last, TimerId::DecisionSettle);
            let lifted = fop.athlete(AthleteId(1)).map(|a| a.best_snatch() > 0);
            assert_eq!(lifted, Some(expected), "votes {votes:?}");
        }
    }

    #[test]
    fn test_reversed_vote_during_settle_is_announced() {
        let mut fop = running(FopConfig::testing());
        vote(&mut fop, 0, true);
        vote(&mut fop, 1, true);
        let third = vote(&mut fop, 2, false);
        vote(&mut fop, 1, false);

        let settled = fire(&mut fop, &third, TimerId::DecisionSettle);

        assert_eq!(fop.athlete(AthleteId(1)).map(|a| a.best_snatch()), Some(0));
        let announced = ui(&settled).into_iter().any(|e| {
            matches!(e, UiEvent::Decision { good_lift: false, .. })
        });
        assert!(announced);
    }

    #[test]
    fn test_explicit_decision_uses_middle_slot_and_applies_immediately() {
        let mut fop = running(FopConfig::testing());
        vote(&mut fop, 0, false);

        let actions = fop.handle(Event::ExplicitDecision {
            success: true,
            referees: [None; 3],
            origin: official(),
        });

        assert_eq!(fop.state(), FopState::DecisionVisible);
        assert!(!fop.athlete_clock().is_running());
        assert_eq!(fop.clock_owner(), None);
        assert_eq!(fop.previous_athlete().map(|a| a.id), Some(AthleteId(1)));
        let decision = ui(&actions).into_iter().find_map(|e| match e {
            UiEvent::Decision {
                good_lift,
                decisions,
                ..
            } => Some((*good_lift, *decisions)),
            _ => None,
        });
        assert_eq!(decision, Some((true, [None, Some(true), None])));
        assert!(timer(&actions, TimerId::DecisionReset).is_some());
    }

    #[test]
    fn test_explicit_decision_not_accepted_once_decision_visible() {
        let mut fop = running(FopConfig::testing());
        fop.handle(Event::ExplicitDecision {
            success: false,
            referees: [None; 3],
            origin: official(),
        });
        let done_before = fop.athlete(AthleteId(1)).map(Athlete::attempts_done);

        let actions = fop.handle(Event::ExplicitDecision {
            success: true,
            referees: [None; 3],
            origin: official(),
        });

        assert_eq!(ui_names(&actions), vec!["Notification"]);
        assert_eq!(fop.athlete(AthleteId(1)).map(Athlete::attempts_done), done_before);
    }

    #[test]
    fn test_owner_weight_change_stops_clock_and_preserves_last_stop() {
        let mut fop = running(FopConfig::testing());
        fop.set_time(Duration::from_secs(20));

        let mut changed = fop.athlete(AthleteId(1)).cloned().expect("athlete");
        changed.change_weight(104).expect("change allowed");
        let actions = fop.handle(Event::WeightChange {
            athlete: changed,
            origin: official(),
        });

        assert_eq!(fop.state(), FopState::AthleteDisplayed);
        assert!(!fop.athlete_clock().is_running());
        assert_eq!(
            fop.athlete_clock().time_remaining_at_last_stop(),
            Duration::from_secs(40)
        );
        // athlete 2 at 105 is not the owner; athlete 1 at 104 still leads
        assert_eq!(fop.current_athlete().map(|a| a.id), Some(AthleteId(1)));
        assert_eq!(fop.athlete_clock().time_remaining(), Duration::from_secs(40));
        assert!(ui_names(&actions).contains(&"LiftingOrderUpdated"));
    }

    #[test]
    fn test_owner_weight_change_past_next_athlete_keeps_last_stop() {
        let mut fop = running(FopConfig::testing());
        fop.set_time(Duration::from_secs(25));

        let mut changed = fop.athlete(AthleteId(1)).cloned().expect("athlete");
        changed.change_weight(107).expect("change allowed");
        fop.handle(Event::WeightChange {
            athlete: changed,
            origin: official(),
        });

        assert_eq!(fop.current_athlete().map(|a| a.id), Some(AthleteId(2)));
        assert_eq!(fop.athlete_clock().time_remaining(), DEFAULT_TIME_ALLOWED);
        assert_eq!(
            fop.athlete_clock().time_remaining_at_last_stop(),
            Duration::from_secs(35)
        );
    }

    #[test]
    fn test_owner_declaration_only_notifies() {
        let mut fop = running(FopConfig::testing());
        fop.set_time(Duration::from_secs(5));

        // declared 100, declares 100 again
        let mut changed = fop.athlete(AthleteId(1)).cloned().expect("athlete");
        changed.change_weight(100).expect("change allowed");
        let actions = fop.handle(Event::WeightChange {
            athlete: changed,
            origin: official(),
        });

        assert_eq!(fop.state(), FopState::TimeRunning);
        assert!(fop.athlete_clock().is_running());
        assert_eq!(actions.len(), 1);
        match ui(&actions)[0] {
            UiEvent::Notification {
                notification: Notification::Declaration { athlete, weight },
                ..
            } => {
                assert_eq!(*athlete, AthleteId(1));
                assert_eq!(*weight, 100);
            }
            other => panic!("expected declaration, got {other:?}"),
        }
    }

    #[test]
    fn test_other_athlete_weight_change_does_not_disturb_clock() {
        let mut fop = running(FopConfig::testing());

        let mut changed = fop.athlete(AthleteId(3)).cloned().expect("athlete");
        changed.change_weight(95).expect("change allowed");
        let actions = fop.handle(Event::WeightChange {
            athlete: changed,
            origin: official(),
        });

        assert_eq!(fop.state(), FopState::TimeRunning);
        assert!(fop.athlete_clock().is_running());
        assert_eq!(fop.clock_owner(), Some(AthleteId(1)));
        assert_eq!(fop.current_athlete().map(|a| a.id), Some(AthleteId(1)));
        assert_eq!(fop.lifting_order()[0].id, AthleteId(3));
        match ui(&actions)[0] {
            UiEvent::LiftingOrderUpdated {
                current,
                next,
                clock_stopped,
                ..
            } => {
                assert_eq!(current.as_ref().map(|a| a.id), Some(AthleteId(1)));
                assert_eq!(next.as_ref().map(|a| a.id), Some(AthleteId(3)));
                assert!(!clock_stopped);
            }
            other => panic!("expected lifting order, got {other:?}"),
        }
    }

    #[test]
    fn test_background_reorder_reports_stopped_clock() {
        let mut fop = running(FopConfig::testing());
        fop.handle(Event::TimeStopped { origin: official() });

        let mut changed = fop.athlete(AthleteId(2)).cloned().expect("athlete");
        changed.change_weight(115).expect("change allowed");
        let actions = fop.handle(Event::WeightChange {
            athlete: changed,
            origin: official(),
        });

        assert_eq!(fop.state(), FopState::TimeStopped);
        match ui(&actions)[0] {
            UiEvent::LiftingOrderUpdated {
                next, clock_stopped, ..
            } => {
                assert_eq!(next.as_ref().map(|a| a.id), Some(AthleteId(3)));
                assert!(*clock_stopped);
            }
            other => panic!("expected lifting order, got {other:?}"),
        }
    }

    #[test]
    fn test_declaration_after_clock_started_from_inactive_keeps_clock() {
        let mut fop = session(FopConfig::testing());
        fop.handle(Event::TimeStarted { origin: official() });
        assert_eq!(fop.state(), FopState::TimeRunning);

        let mut changed = fop.athlete(AthleteId(1)).cloned().expect("athlete");
        changed.change_weight(100).expect("change allowed");
        let actions = fop.handle(Event::WeightChange {
            athlete: changed,
            origin: official(),
        });

        assert_eq!(fop.state(), FopState::TimeRunning);
        assert!(fop.athlete_clock().is_running());
        assert_eq!(ui_names(&actions), vec!["Notification"]);
    }

    #[test]
    fn test_weight_change_without_owner_reorders_and_redisplays() {
        let mut fop = session(FopConfig::testing());
        fop.handle(Event::StartLifting { origin: official() });

        let mut changed = fop.athlete(AthleteId(1)).cloned().expect("athlete");
        changed.change_weight(108).expect("change allowed");
        fop.handle(Event::WeightChange {
            athlete: changed,
            origin: official(),
        });

        assert_eq!(fop.state(), FopState::AthleteDisplayed);
        assert_eq!(fop.current_athlete().map(|a| a.id), Some(AthleteId(2)));
    }

    #[test]
    fn test_weight_change_for_unknown_athlete_is_unexpected() {
        let mut fop = session(FopConfig::testing());
        let actions = fop.handle(Event::WeightChange {
            athlete: test_athlete(99, 80),
            origin: official(),
        });
        assert_eq!(ui_names(&actions), vec!["Notification"]);
        assert_eq!(fop.lifting_order().len(), 3);
    }

    #[test]
    fn test_consecutive_attempt_gets_two_minutes() {
        let athletes = vec![test_athlete(1, 100), test_athlete(2, 120)];
        let mut fop = FieldOfPlay::new(PlatformIndex(0), None, athletes, FopConfig::testing());
        fop.handle(Event::StartLifting { origin: official() });
        fop.handle(Event::TimeStarted { origin: official() });

        let decided = fop.handle(Event::ExplicitDecision {
            success: true,
            referees: [None; 3],
            origin: official(),
        });
        fire(&mut fop, &decided, TimerId::DecisionReset);

        // athlete 1 follows themselves at 101 on attempt 2
        assert_eq!(fop.current_athlete().map(|a| a.id), Some(AthleteId(1)));
        assert_eq!(fop.athlete_clock().time_remaining(), CONSECUTIVE_TIME_ALLOWED);
    }

    #[test]
    fn test_stale_reset_timer_after_break_is_ignored() {
        let mut fop = running(FopConfig::testing());
        let decided = fop.handle(Event::ExplicitDecision {
            success: true,
            referees: [None; 3],
            origin: official(),
        });
        fop.handle(Event::BreakStarted {
            break_type: BreakType::Technical,
            countdown: CountdownType::Indefinite,
            target: None,
            indefinite: true,
            origin: official(),
        });

        let actions = fire(&mut fop, &decided, TimerId::DecisionReset);

        assert!(actions.is_empty());
        assert_eq!(fop.state(), FopState::Break);
        assert_eq!(fop.break_type(), Some(BreakType::Technical));
    }

    #[test]
    fn test_stale_clock_cue_is_ignored() {
        let mut fop = running(FopConfig::testing().with_sounds(true));
        fop.handle(Event::TimeStopped { origin: official() });

        let actions = fop.handle(Event::FinalWarningTimer { clock_run: 1 });
        assert!(actions.is_empty());
        assert!(!fop.cues().has_fired(Cue::FinalWarning));
    }

    #[test]
    fn test_clock_expiry_stops_time_and_sounds_once() {
        let mut fop = session(FopConfig::testing().with_sounds(true));
        fop.handle(Event::StartLifting { origin: official() });
        let started = fop.handle(Event::TimeStarted { origin: official() });

        fop.set_time(Duration::from_secs(30));
        let warning = fire(&mut fop, &started, TimerId::FinalWarning);
        assert!(matches!(
            warning.as_slice(),
            [Action::EmitSound { cue: Cue::FinalWarning }]
        ));

        fop.set_time(Duration::from_secs(60));
        let expired = fire(&mut fop, &started, TimerId::ClockExpired);
        assert_eq!(fop.state(), FopState::TimeStopped);
        assert!(expired
            .iter()
            .any(|a| matches!(a, Action::EmitSound { cue: Cue::TimeOver })));
        assert_eq!(fop.athlete_clock().time_remaining(), Duration::ZERO);

        assert!(fop.handle(Event::TimeOver { origin: official() }).is_empty());
    }

    #[test]
    fn test_break_with_duration_and_pause() {
        let mut fop = session(FopConfig::testing());
        let started = fop.handle(Event::BreakStarted {
            break_type: BreakType::FirstSnatch,
            countdown: CountdownType::Duration(Duration::from_secs(600)),
            target: None,
            indefinite: false,
            origin: official(),
        });
        assert_eq!(fop.state(), FopState::Break);
        assert!(fop.break_clock().is_running());
        assert_eq!(ui_names(&started), vec!["BreakClock", "BreakStarted"]);

        fop.set_time(Duration::from_secs(100));
        let paused = fop.handle(Event::BreakPaused { origin: official() });
        assert_eq!(ui_names(&paused), vec!["BreakClock", "BreakPaused"]);
        assert_eq!(fop.break_clock().time_remaining(), Duration::from_secs(500));
        assert_eq!(fop.state(), FopState::Break);

        fop.handle(Event::StartLifting { origin: official() });
        assert_eq!(fop.state(), FopState::AthleteDisplayed);
        assert_eq!(fop.break_type(), None);
    }

    #[test]
    fn test_break_to_target_time() {
        let mut fop = session(FopConfig::testing());
        fop.set_time(Duration::from_secs(1000));
        let actions = fop.handle(Event::BreakStarted {
            break_type: BreakType::BeforeIntroduction,
            countdown: CountdownType::Target,
            target: Some(Duration::from_secs(1300)),
            indefinite: false,
            origin: official(),
        });
        let remaining = ui(&actions).into_iter().find_map(|e| match e {
            UiEvent::BreakStarted { remaining, .. } => Some(*remaining),
            _ => None,
        });
        assert_eq!(remaining, Some(Some(Duration::from_secs(300))));
    }

    #[test]
    fn test_force_time() {
        let mut fop = running(FopConfig::testing());
        fop.handle(Event::TimeStopped { origin: official() });

        let actions = fop.handle(Event::ForceTime {
            time_allowed: Duration::from_secs(90),
            origin: official(),
        });

        assert_eq!(fop.state(), FopState::AthleteDisplayed);
        assert_eq!(fop.athlete_clock().time_remaining(), Duration::from_secs(90));
        assert_eq!(ui_names(&actions), vec!["AthleteClock"]);
    }

    #[test]
    fn test_group_done_after_last_attempt() {
        let mut athlete = test_athlete(1, 100);
        for sequence in 1..=5 {
            athlete.successful_lift(sequence).expect("attempt available");
        }
        let mut fop = FieldOfPlay::new(
            PlatformIndex(0),
            Some(Group::new("B")),
            vec![athlete],
            FopConfig::testing(),
        );
        fop.handle(Event::StartLifting { origin: official() });
        fop.handle(Event::TimeStarted { origin: official() });

        let decided = fop.handle(Event::ExplicitDecision {
            success: true,
            referees: [None; 3],
            origin: official(),
        });
        let reset = fire(&mut fop, &decided, TimerId::DecisionReset);

        assert_eq!(fop.state(), FopState::Break);
        assert_eq!(fop.break_type(), Some(BreakType::GroupDone));
        assert_eq!(ui_names(&reset), vec!["DecisionReset", "GroupDone"]);
    }

    #[test]
    fn test_switch_group_requests_athletes_then_starts_lifting() {
        let mut fop = FieldOfPlay::new(PlatformIndex(1), None, vec![], FopConfig::testing());
        let group = Group::new("C");

        let actions = fop.handle(Event::SwitchGroup {
            group: Some(group.clone()),
            origin: official(),
        });
        assert!(matches!(
            actions.as_slice(),
            [Action::LoadAthletes { group: Some(g), .. }] if g.name == "C"
        ));

        let generation = fop.generation();
        fop.handle(Event::AthletesLoaded {
            group: Some(group),
            athletes: vec![test_athlete(4, 90), test_athlete(5, 85)],
            group_done: false,
            origin: official(),
        });

        assert!(fop.generation() > generation);
        assert_eq!(fop.state(), FopState::AthleteDisplayed);
        assert_eq!(fop.group().map(|g| g.name.as_str()), Some("C"));
        assert_eq!(fop.current_athlete().map(|a| a.id), Some(AthleteId(5)));
    }

    #[test]
    fn test_loading_a_finished_group_goes_to_break() {
        let mut fop = FieldOfPlay::new(PlatformIndex(0), None, vec![], FopConfig::testing());
        let actions = fop.handle(Event::AthletesLoaded {
            group: Some(Group::new("D")),
            athletes: vec![],
            group_done: true,
            origin: official(),
        });
        assert_eq!(fop.state(), FopState::Break);
        assert_eq!(fop.break_type(), Some(BreakType::GroupDone));
        assert_eq!(ui_names(&actions), vec!["GroupDone"]);
    }

    #[test]
    fn test_invalid_referee_degrades_to_notification() {
        let mut fop = running(FopConfig::testing());
        let actions = vote(&mut fop, 3, true);
        assert_eq!(ui_names(&actions), vec!["Notification"]);
        assert_eq!(fop.state(), FopState::TimeRunning);
        assert_eq!(fop.decisions(), [None; 3]);
    }
}
