//! Results order, rank assignment and points.

use crate::WinningOrder;
use barbell_types::{Athlete, AthleteId, Category, CompetitionConfig, Gender, RankingType};
use std::collections::HashMap;
use tracing::debug;

/// Rankings recomputed for a session whenever its lifting order changes.
const CATEGORY_RANKINGS: [RankingType; 4] = [
    RankingType::Snatch,
    RankingType::CleanJerk,
    RankingType::Total,
    RankingType::Custom,
];

const GENDER_RANKINGS: [RankingType; 2] = [RankingType::Sinclair, RankingType::Robi];

/// Points awarded for a category rank: 28 for first, 25 for second,
/// `26 - rank` below that. Unranked or ineligible athletes score 0.
///
/// The formula is not clamped: ranks beyond 26 yield negative points.
pub fn points_for_rank(rank: Option<i32>) -> f64 {
    match rank {
        None => 0.0,
        Some(r) if r <= 0 => 0.0,
        Some(1) => 28.0,
        Some(2) => 25.0,
        Some(r) => f64::from(26 - r),
    }
}

/// Sort athletes in results order for `ranking` and record each athlete's
/// 1-based position in that order.
pub fn results_order(athletes: &mut [Athlete], ranking: RankingType, config: &CompetitionConfig) {
    let order = WinningOrder::new(ranking, config);
    athletes.sort_by(|a, b| order.compare(a, b));
    for (position, athlete) in athletes.iter_mut().enumerate() {
        athlete.set_result_order_rank(ranking, position as u32 + 1);
    }
}

pub fn results_order_copy(athletes: &[Athlete], ranking: RankingType, config: &CompetitionConfig) -> Vec<Athlete> {
    let mut sorted = athletes.to_vec();
    results_order(&mut sorted, ranking, config);
    sorted
}

fn eligible(athlete: &Athlete) -> bool {
    !athlete.invited && athlete.team_member
}

fn same_bracket(a: Option<&Category>, b: Option<&Category>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.same_bracket(b),
        (None, None) => true,
        _ => false,
    }
}

/// Assign category ranks and points over athletes already in results order
/// for `ranking`.
///
/// The running rank restarts at 1 whenever the (category, age group) pair
/// changes. Ineligible athletes (invited, or not scoring for a team) get
/// rank -1 and no points without consuming a rank. Athletes with nothing to
/// rank get rank 0 but still advance the counter.
pub fn assign_category_ranks(athletes: &mut [Athlete], ranking: RankingType, config: &CompetitionConfig) {
    let mut previous: Option<Category> = None;
    let mut first = true;
    let mut rank = 1;

    for athlete in athletes.iter_mut() {
        let category = athlete.ranking_category(ranking, config).cloned();
        if first || !same_bracket(previous.as_ref(), category.as_ref()) {
            rank = 1;
        }
        first = false;
        previous = category;

        if !eligible(athlete) {
            athlete.set_rank(ranking, -1);
            athlete.set_points(ranking, 0.0);
            continue;
        }

        let assigned = if athlete.ranking_value(ranking, config) > 0.0 { rank } else { 0 };
        athlete.set_rank(ranking, assigned);
        athlete.set_points(ranking, points_for_rank(Some(assigned)));
        rank += 1;
    }
}

/// Assign cross-category ranks over athletes already in results order for
/// `ranking`, counting men and women separately.
pub fn assign_gender_ranks(athletes: &mut [Athlete], ranking: RankingType, config: &CompetitionConfig) {
    let mut counters: HashMap<Gender, i32> = HashMap::new();

    for athlete in athletes.iter_mut() {
        if !eligible(athlete) {
            athlete.set_rank(ranking, -1);
            athlete.set_points(ranking, 0.0);
            continue;
        }
        let counter = counters.entry(athlete.gender).or_insert(1);
        let assigned = if athlete.ranking_value(ranking, config) > 0.0 { *counter } else { 0 };
        athlete.set_rank(ranking, assigned);
        athlete.set_points(ranking, points_for_rank(Some(assigned)));
        *counter += 1;
    }
}

/// Recompute every rank a session displays and write the results back into
/// `athletes`, whose order is left untouched.
///
/// Category rankings cover snatch, clean & jerk, total and custom score;
/// Sinclair and Robi are ranked per gender; combined points are the sum of
/// snatch, clean & jerk and total points.
pub fn assign_session_ranks(athletes: &mut [Athlete], config: &CompetitionConfig) {
    let mut work = athletes.to_vec();

    for ranking in CATEGORY_RANKINGS {
        results_order(&mut work, ranking, config);
        assign_category_ranks(&mut work, ranking, config);
    }
    for ranking in GENDER_RANKINGS {
        results_order(&mut work, ranking, config);
        assign_gender_ranks(&mut work, ranking, config);
    }
    for athlete in work.iter_mut() {
        let combined = athlete.ranking_value(RankingType::Combined, config);
        athlete.set_points(RankingType::Combined, combined);
    }

    let ranked: HashMap<AthleteId, &Athlete> = work.iter().map(|a| (a.id, a)).collect();
    for athlete in athletes.iter_mut() {
        if let Some(source) = ranked.get(&athlete.id) {
            athlete.copy_ranks_from(source);
        }
    }
    debug!(athletes = athletes.len(), "session ranks assigned");
}
