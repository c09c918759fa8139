//! Athletes and their attempts.

use crate::{AgeGroup, AthleteId, Category, CompetitionConfig, Gender, Group, RankingType};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Number of attempts per lift.
pub const ATTEMPTS_PER_LIFT: usize = 3;

/// Total number of attempts in a competition (3 snatch + 3 clean & jerk).
pub const TOTAL_ATTEMPTS: usize = 2 * ATTEMPTS_PER_LIFT;

/// The two competition lifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LiftKind {
    Snatch,
    CleanJerk,
}

impl fmt::Display for LiftKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiftKind::Snatch => write!(f, "snatch"),
            LiftKind::CleanJerk => write!(f, "clean&jerk"),
        }
    }
}

/// Outcome of one attempt, with the weight on the bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lift {
    Good(u32),
    NoLift(u32),
}

impl Lift {
    pub fn weight(self) -> u32 {
        match self {
            Lift::Good(w) | Lift::NoLift(w) => w,
        }
    }

    pub fn is_good(self) -> bool {
        matches!(self, Lift::Good(_))
    }

    /// Weight counted towards results (0 for a failed attempt).
    pub fn scored(self) -> u32 {
        match self {
            Lift::Good(w) => w,
            Lift::NoLift(_) => 0,
        }
    }
}

/// Weight requests and result for a single attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    pub declaration: Option<u32>,
    pub change1: Option<u32>,
    pub change2: Option<u32>,
    pub result: Option<Lift>,
    /// Position of this lift in the session's sequence of decisions.
    pub lift_sequence: Option<u64>,
}

impl Attempt {
    /// Latest weight explicitly requested for this attempt.
    pub fn requested(&self) -> Option<u32> {
        self.change2.or(self.change1).or(self.declaration)
    }

    pub fn is_done(&self) -> bool {
        self.result.is_some()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttemptError {
    #[error("{0} has already taken all six attempts")]
    NoAttemptsLeft(AthleteId),

    #[error("{0} has no weight changes left for this attempt")]
    NoChangesLeft(AthleteId),
}

fn team_member_by_default() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct RankSheet {
    ranks: [Option<i32>; RankingType::COUNT],
    points: [f64; RankingType::COUNT],
    order: [u32; RankingType::COUNT],
    #[serde(default)]
    team: [Option<i32>; RankingType::COUNT],
}

/// A registered competitor.
///
/// The field of play works on snapshots: events carry an updated copy, and UI
/// events carry immutable copies of the lifting and display orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Athlete {
    pub id: AthleteId,
    pub last_name: String,
    pub first_name: String,
    pub gender: Gender,
    pub body_weight: Option<f64>,
    pub year_of_birth: Option<i32>,
    pub category: Option<Category>,
    pub registration_category: Option<Category>,
    pub team: Option<String>,
    pub lot_number: Option<u32>,
    pub start_number: Option<u32>,
    pub group: Option<Group>,
    /// Competes outside the official ranking.
    #[serde(default)]
    pub invited: bool,
    /// Counts towards team scores.
    #[serde(default = "team_member_by_default")]
    pub team_member: bool,
    pub custom_score: Option<f64>,
    #[serde(default)]
    pub snatch: [Attempt; ATTEMPTS_PER_LIFT],
    #[serde(default)]
    pub clean_jerk: [Attempt; ATTEMPTS_PER_LIFT],
    /// 1-based position in the current lifting order.
    #[serde(default)]
    pub lift_order_rank: u32,
    #[serde(default)]
    ranks: RankSheet,
}

impl Athlete {
    pub fn new(id: AthleteId, last_name: impl Into<String>, first_name: impl Into<String>, gender: Gender) -> Self {
        Self {
            id,
            last_name: last_name.into(),
            first_name: first_name.into(),
            gender,
            body_weight: None,
            year_of_birth: None,
            category: None,
            registration_category: None,
            team: None,
            lot_number: None,
            start_number: None,
            group: None,
            invited: false,
            team_member: true,
            custom_score: None,
            snatch: Default::default(),
            clean_jerk: Default::default(),
            lift_order_rank: 0,
            ranks: RankSheet::default(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.last_name.to_uppercase(), self.first_name)
    }

    pub fn age_group(&self) -> Option<&AgeGroup> {
        self.category.as_ref().and_then(|c| c.age_group.as_ref())
    }

    /// Category used for ranking: the registration category when configured
    /// (or for custom rankings), otherwise the bodyweight category.
    pub fn ranking_category(&self, ranking: RankingType, config: &CompetitionConfig) -> Option<&Category> {
        if config.use_registration_category || ranking == RankingType::Custom {
            self.registration_category.as_ref().or(self.category.as_ref())
        } else {
            self.category.as_ref()
        }
    }

    pub fn age(&self, competition_year: i32) -> Option<u32> {
        self.year_of_birth
            .and_then(|year| u32::try_from(competition_year - year).ok())
    }

    pub fn attempts(&self, kind: LiftKind) -> &[Attempt; ATTEMPTS_PER_LIFT] {
        match kind {
            LiftKind::Snatch => &self.snatch,
            LiftKind::CleanJerk => &self.clean_jerk,
        }
    }

    fn attempts_mut(&mut self, kind: LiftKind) -> &mut [Attempt; ATTEMPTS_PER_LIFT] {
        match kind {
            LiftKind::Snatch => &mut self.snatch,
            LiftKind::CleanJerk => &mut self.clean_jerk,
        }
    }

    fn done_in(&self, kind: LiftKind) -> usize {
        self.attempts(kind).iter().take_while(|a| a.is_done()).count()
    }

    pub fn snatch_attempts_done(&self) -> usize {
        self.done_in(LiftKind::Snatch)
    }

    pub fn clean_jerk_attempts_done(&self) -> usize {
        self.done_in(LiftKind::CleanJerk)
    }

    /// Attempts completed so far, 0..=6.
    pub fn attempts_done(&self) -> usize {
        self.snatch_attempts_done() + self.clean_jerk_attempts_done()
    }

    /// Attempt number (1..=3) within the current lift.
    pub fn attempt_number(&self) -> usize {
        self.attempts_done() % ATTEMPTS_PER_LIFT + 1
    }

    pub fn is_finished(&self) -> bool {
        self.attempts_done() >= TOTAL_ATTEMPTS
    }

    /// The next attempt to be taken: lift and 0-based index.
    pub fn next_attempt(&self) -> Option<(LiftKind, usize)> {
        let snatches = self.snatch_attempts_done();
        if snatches < ATTEMPTS_PER_LIFT {
            return Some((LiftKind::Snatch, snatches));
        }
        let cjs = self.clean_jerk_attempts_done();
        if cjs < ATTEMPTS_PER_LIFT {
            return Some((LiftKind::CleanJerk, cjs));
        }
        None
    }

    /// Weight requested for a given attempt. Without an explicit request, the
    /// automatic progression applies: +1 kg after a good lift, same weight
    /// after a miss. A first attempt without declaration requests 0.
    pub fn requested_weight(&self, kind: LiftKind, index: usize) -> u32 {
        let attempts = self.attempts(kind);
        if let Some(weight) = attempts[index].requested() {
            return weight;
        }
        if index == 0 {
            return 0;
        }
        match attempts[index - 1].result {
            Some(Lift::Good(w)) => w + 1,
            Some(Lift::NoLift(w)) => w,
            None => self.requested_weight(kind, index - 1),
        }
    }

    /// Weight to be loaded for the athlete's next attempt, 0 once finished.
    pub fn next_attempt_requested_weight(&self) -> u32 {
        match self.next_attempt() {
            Some((kind, index)) => self.requested_weight(kind, index),
            None => 0,
        }
    }

    /// Declaration made for the next attempt, if any.
    pub fn current_declaration(&self) -> Option<u32> {
        self.next_attempt()
            .and_then(|(kind, index)| self.attempts(kind)[index].declaration)
    }

    /// Record the declaration for the next attempt.
    pub fn declare(&mut self, weight: u32) -> Result<(), AttemptError> {
        let (kind, index) = self.next_attempt().ok_or(AttemptError::NoAttemptsLeft(self.id))?;
        self.attempts_mut(kind)[index].declaration = Some(weight);
        Ok(())
    }

    /// Record a weight change for the next attempt. The first change without
    /// a declaration counts as the declaration; at most two changes follow.
    pub fn change_weight(&mut self, weight: u32) -> Result<(), AttemptError> {
        let id = self.id;
        let (kind, index) = self.next_attempt().ok_or(AttemptError::NoAttemptsLeft(id))?;
        let attempt = &mut self.attempts_mut(kind)[index];
        if attempt.declaration.is_none() {
            attempt.declaration = Some(weight);
        } else if attempt.change1.is_none() {
            attempt.change1 = Some(weight);
        } else if attempt.change2.is_none() {
            attempt.change2 = Some(weight);
        } else {
            return Err(AttemptError::NoChangesLeft(id));
        }
        Ok(())
    }

    /// Record a good lift at the requested weight on the next attempt.
    pub fn successful_lift(&mut self, sequence: u64) -> Result<Lift, AttemptError> {
        self.record_lift(true, sequence)
    }

    /// Record a failed lift at the requested weight on the next attempt.
    pub fn failed_lift(&mut self, sequence: u64) -> Result<Lift, AttemptError> {
        self.record_lift(false, sequence)
    }

    fn record_lift(&mut self, good: bool, sequence: u64) -> Result<Lift, AttemptError> {
        let (kind, index) = self.next_attempt().ok_or(AttemptError::NoAttemptsLeft(self.id))?;
        let weight = self.requested_weight(kind, index);
        let lift = if good { Lift::Good(weight) } else { Lift::NoLift(weight) };
        let attempt = &mut self.attempts_mut(kind)[index];
        attempt.result = Some(lift);
        attempt.lift_sequence = Some(sequence);
        Ok(lift)
    }

    /// Sequence number of the most recent lift, if any.
    pub fn last_lift_sequence(&self) -> Option<u64> {
        self.snatch
            .iter()
            .chain(self.clean_jerk.iter())
            .filter_map(|a| a.lift_sequence)
            .max()
    }

    /// Weight attempted on a 1-based attempt number, 0 if not taken.
    pub fn attempted_weight(&self, kind: LiftKind, attempt_number: usize) -> u32 {
        attempt_number
            .checked_sub(1)
            .and_then(|i| self.attempts(kind).get(i))
            .and_then(|a| a.result)
            .map_or(0, Lift::weight)
    }

    fn best(&self, kind: LiftKind) -> (u32, usize) {
        self.attempts(kind)
            .iter()
            .enumerate()
            .filter_map(|(i, a)| a.result.map(|lift| (lift.scored(), i + 1)))
            .filter(|(w, _)| *w > 0)
            .fold((0, 0), |best, cur| if cur.0 > best.0 { cur } else { best })
    }

    pub fn best_snatch(&self) -> u32 {
        self.best(LiftKind::Snatch).0
    }

    pub fn best_clean_jerk(&self) -> u32 {
        self.best(LiftKind::CleanJerk).0
    }

    /// 1-based attempt on which the best snatch was made, 0 if none.
    pub fn best_snatch_attempt_number(&self) -> usize {
        self.best(LiftKind::Snatch).1
    }

    /// 1-based attempt on which the best clean & jerk was made, 0 if none.
    pub fn best_clean_jerk_attempt_number(&self) -> usize {
        self.best(LiftKind::CleanJerk).1
    }

    /// Competition total; zero when either lift has no good attempt.
    pub fn total(&self) -> u32 {
        let snatch = self.best_snatch();
        let clean_jerk = self.best_clean_jerk();
        if snatch == 0 || clean_jerk == 0 {
            0
        } else {
            snatch + clean_jerk
        }
    }

    pub fn rank(&self, ranking: RankingType) -> Option<i32> {
        self.ranks.ranks[ranking.index()]
    }

    pub fn set_rank(&mut self, ranking: RankingType, rank: i32) {
        self.ranks.ranks[ranking.index()] = Some(rank);
    }

    /// Rank within the athlete's team and gender.
    pub fn team_rank(&self, ranking: RankingType) -> Option<i32> {
        self.ranks.team[ranking.index()]
    }

    pub fn set_team_rank(&mut self, ranking: RankingType, rank: i32) {
        self.ranks.team[ranking.index()] = Some(rank);
    }

    /// 1-based position in the last results order computed for `ranking`.
    pub fn result_order_rank(&self, ranking: RankingType) -> u32 {
        self.ranks.order[ranking.index()]
    }

    pub fn set_result_order_rank(&mut self, ranking: RankingType, position: u32) {
        self.ranks.order[ranking.index()] = position;
    }

    pub fn points(&self, ranking: RankingType) -> f64 {
        self.ranks.points[ranking.index()]
    }

    pub fn set_points(&mut self, ranking: RankingType, points: f64) {
        self.ranks.points[ranking.index()] = points;
    }

    /// Copy every rank and points slot from another snapshot of the same athlete.
    pub fn copy_ranks_from(&mut self, other: &Athlete) {
        self.ranks = other.ranks.clone();
    }

    /// Value a ranking compares, larger is better.
    pub fn ranking_value(&self, ranking: RankingType, config: &CompetitionConfig) -> f64 {
        match ranking {
            RankingType::Snatch => f64::from(self.best_snatch()),
            RankingType::CleanJerk => f64::from(self.best_clean_jerk()),
            RankingType::Total => f64::from(self.total()),
            RankingType::Custom => self.custom_score.unwrap_or_else(|| f64::from(self.total())),
            RankingType::Robi => self.robi(),
            RankingType::Sinclair => {
                if config.masters {
                    self.smm(config.competition_year)
                } else if config.use_category_sinclair {
                    self.category_sinclair()
                } else {
                    self.sinclair()
                }
            }
            RankingType::CategorySinclair => self.category_sinclair(),
            RankingType::BodyweightSinclair => self.sinclair(),
            RankingType::Smm => self.smm(config.competition_year),
            RankingType::Combined => {
                self.points(RankingType::Snatch)
                    + self.points(RankingType::CleanJerk)
                    + self.points(RankingType::Total)
            }
        }
    }
}

impl fmt::Display for Athlete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.full_name(), self.id.0)
    }
}
