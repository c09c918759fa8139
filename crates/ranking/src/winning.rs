//! Winning-order comparator cascade.

use barbell_types::{
    compare_categories, compare_missing_last, compare_session_time, Athlete, CompetitionConfig,
    LiftKind, RankingType,
};
use std::cmp::Ordering;
use tracing::trace;

/// Results-order comparator for one ranking type.
///
/// Values being ranked compare so that larger is better; everything else
/// (session time, bodyweight, attempt numbers, previous attempts, lot) so
/// that smaller is better.
#[derive(Debug, Clone, Copy)]
pub struct WinningOrder<'a> {
    ranking: RankingType,
    config: &'a CompetitionConfig,
}

impl<'a> WinningOrder<'a> {
    pub fn new(ranking: RankingType, config: &'a CompetitionConfig) -> Self {
        Self { ranking, config }
    }

    pub fn ranking(&self) -> RankingType {
        self.ranking
    }

    pub fn compare(&self, a: &Athlete, b: &Athlete) -> Ordering {
        let old_bw = self.config.use_old_bodyweight_tie_break;
        let ordering = match self.ranking {
            RankingType::Snatch => self
                .masters_then_category(a, b)
                .then_with(|| larger_first(a.best_snatch(), b.best_snatch()))
                .then_with(|| self.snatch_tie_break(a, b)),
            RankingType::CleanJerk => self
                .masters_then_category(a, b)
                .then_with(|| larger_first(a.best_clean_jerk(), b.best_clean_jerk()))
                .then_with(|| tie_break(a, b, old_bw)),
            RankingType::Total => self
                .masters_then_category(a, b)
                .then_with(|| larger_first(a.total(), b.total()))
                .then_with(|| tie_break(a, b, old_bw)),
            RankingType::Custom => self
                .masters_order(a, b)
                .then_with(|| {
                    compare_categories(
                        a.ranking_category(RankingType::Custom, self.config),
                        b.ranking_category(RankingType::Custom, self.config),
                    )
                })
                .then_with(|| self.larger_value_first(RankingType::Custom, a, b))
                .then_with(|| larger_first(a.total(), b.total()))
                .then_with(|| tie_break(a, b, old_bw)),
            RankingType::Sinclair if self.config.masters => self.score_order(RankingType::Smm, a, b),
            RankingType::Sinclair if self.config.use_category_sinclair => {
                self.score_order(RankingType::CategorySinclair, a, b)
            }
            RankingType::Sinclair | RankingType::BodyweightSinclair => self.sinclair_order(a, b),
            RankingType::Robi | RankingType::CategorySinclair | RankingType::Smm | RankingType::Combined => {
                self.score_order(self.ranking, a, b)
            }
        };
        trace!(ranking = %self.ranking, a = %a.id, b = %b.id, ?ordering, "winning order");
        ordering
    }

    /// Masters rank men and women separately, older age groups first.
    fn masters_order(&self, a: &Athlete, b: &Athlete) -> Ordering {
        if !self.config.masters {
            return Ordering::Equal;
        }
        a.gender
            .cmp(&b.gender)
            .then_with(|| compare_missing_last(a.age_group(), b.age_group()).reverse())
    }

    fn masters_then_category(&self, a: &Athlete, b: &Athlete) -> Ordering {
        self.masters_order(a, b).then_with(|| {
            compare_categories(
                a.ranking_category(self.ranking, self.config),
                b.ranking_category(self.ranking, self.config),
            )
        })
    }

    fn larger_value_first(&self, ranking: RankingType, a: &Athlete, b: &Athlete) -> Ordering {
        let va = a.ranking_value(ranking, self.config);
        let vb = b.ranking_value(ranking, self.config);
        vb.total_cmp(&va)
    }

    /// Cross-category scores: the lighter athlete wins a tie.
    fn score_order(&self, ranking: RankingType, a: &Athlete, b: &Athlete) -> Ordering {
        self.larger_value_first(ranking, a, b)
            .then_with(|| tie_break(a, b, true))
    }

    /// While both athletes are still in the snatch, rank on the tentative
    /// Sinclair of their best lifts so far.
    fn sinclair_order(&self, a: &Athlete, b: &Athlete) -> Ordering {
        let value = if a.attempts_done() <= 3 && b.attempts_done() <= 3 {
            b.sinclair_for_delta().total_cmp(&a.sinclair_for_delta())
        } else {
            b.sinclair().total_cmp(&a.sinclair())
        };
        value.then_with(|| tie_break(a, b, true))
    }

    /// Snatch ties are broken on the snatch itself rather than on the clean & jerk.
    fn snatch_tie_break(&self, a: &Athlete, b: &Athlete) -> Ordering {
        compare_session_time(a.group.as_ref(), b.group.as_ref())
            .then_with(|| {
                if self.config.use_old_bodyweight_tie_break {
                    compare_body_weight(a, b)
                } else {
                    Ordering::Equal
                }
            })
            .then_with(|| {
                a.best_snatch_attempt_number()
                    .cmp(&b.best_snatch_attempt_number())
            })
            .then_with(|| {
                compare_previous_attempts(a.best_snatch_attempt_number(), LiftKind::Snatch, a, b)
            })
            .then_with(|| compare_lot(a, b))
    }
}

fn larger_first(a: u32, b: u32) -> Ordering {
    b.cmp(&a)
}

/// Lighter first; a missing bodyweight counts as 0.
fn compare_body_weight(a: &Athlete, b: &Athlete) -> Ordering {
    a.body_weight
        .unwrap_or(0.0)
        .total_cmp(&b.body_weight.unwrap_or(0.0))
}

fn compare_lot(a: &Athlete, b: &Athlete) -> Ordering {
    compare_missing_last(a.lot_number.as_ref(), b.lot_number.as_ref())
}

/// Compare the weights attempted from `starting_from` back to the first
/// attempt, smaller first: whoever reached the weight with lighter attempts
/// lifted it first.
fn compare_previous_attempts(starting_from: usize, kind: LiftKind, a: &Athlete, b: &Athlete) -> Ordering {
    (1..=starting_from)
        .rev()
        .map(|n| a.attempted_weight(kind, n).cmp(&b.attempted_weight(kind, n)))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Shared tie-break: earlier session, lighter bodyweight (when enabled),
/// smaller clean & jerk (the total was reached earlier), earlier best clean
/// & jerk attempt, lighter previous attempts, lower lot number.
pub(crate) fn tie_break(a: &Athlete, b: &Athlete, body_weight_tie_break: bool) -> Ordering {
    compare_session_time(a.group.as_ref(), b.group.as_ref())
        .then_with(|| {
            if body_weight_tie_break {
                compare_body_weight(a, b)
            } else {
                Ordering::Equal
            }
        })
        .then_with(|| a.best_clean_jerk().cmp(&b.best_clean_jerk()))
        .then_with(|| {
            a.best_clean_jerk_attempt_number()
                .cmp(&b.best_clean_jerk_attempt_number())
        })
        .then_with(|| {
            compare_previous_attempts(a.best_clean_jerk_attempt_number(), LiftKind::CleanJerk, a, b)
        })
        .then_with(|| compare_lot(a, b))
}
