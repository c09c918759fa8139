//! Team ranking order, ranks within a team and team scores.

use crate::winning::tie_break;
use barbell_types::{compare_missing_last, Athlete, CompetitionConfig, Gender, RankingType};
use std::cmp::Ordering;
use tracing::debug;

/// Points a team scored for one ranking, men and women kept apart.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamScore {
    pub team: String,
    pub gender: Gender,
    pub points: f64,
    /// Athletes whose points counted.
    pub members: usize,
}

/// Team, then gender, then points for `ranking` (larger first), then the
/// shared results tie-break. Athletes without a team sort last.
pub fn compare_team_order(a: &Athlete, b: &Athlete, ranking: RankingType, config: &CompetitionConfig) -> Ordering {
    compare_missing_last(a.team.as_ref(), b.team.as_ref())
        .then_with(|| a.gender.cmp(&b.gender))
        .then_with(|| b.points(ranking).total_cmp(&a.points(ranking)))
        .then_with(|| tie_break(a, b, config.use_old_bodyweight_tie_break))
}

pub fn team_ranking_order(athletes: &mut [Athlete], ranking: RankingType, config: &CompetitionConfig) {
    athletes.sort_by(|a, b| compare_team_order(a, b, ranking, config));
}

pub fn team_ranking_order_copy(athletes: &[Athlete], ranking: RankingType, config: &CompetitionConfig) -> Vec<Athlete> {
    let mut sorted = athletes.to_vec();
    team_ranking_order(&mut sorted, ranking, config);
    sorted
}

/// Assign ranks within each (team, gender) over athletes already in team
/// ranking order.
///
/// Same conventions as category ranks: ineligible athletes get -1 without
/// consuming a rank, athletes with nothing to rank get 0 and still advance
/// the counter. Combined points carry no team rank.
pub fn assign_team_ranks(athletes: &mut [Athlete], ranking: RankingType, config: &CompetitionConfig) {
    if ranking == RankingType::Combined {
        return;
    }
    let mut previous: Option<(Option<String>, Gender)> = None;
    let mut rank = 1;

    for athlete in athletes.iter_mut() {
        let key = (athlete.team.clone(), athlete.gender);
        if previous.as_ref() != Some(&key) {
            rank = 1;
        }
        previous = Some(key);

        if athlete.invited || !athlete.team_member {
            athlete.set_team_rank(ranking, -1);
            continue;
        }
        let assigned = if athlete.ranking_value(ranking, config) > 0.0 { rank } else { 0 };
        athlete.set_team_rank(ranking, assigned);
        rank += 1;
    }
}

/// Sum the points of scoring team members for `ranking`, best team first.
/// Athletes without a team are left out.
pub fn team_scores(athletes: &[Athlete], ranking: RankingType) -> Vec<TeamScore> {
    let mut scores: Vec<TeamScore> = Vec::new();
    for athlete in athletes {
        let Some(team) = athlete.team.as_ref() else {
            continue;
        };
        if athlete.invited || !athlete.team_member {
            continue;
        }
        let points = athlete.points(ranking);
        match scores
            .iter_mut()
            .find(|s| &s.team == team && s.gender == athlete.gender)
        {
            Some(score) => {
                score.points += points;
                score.members += 1;
            }
            None => scores.push(TeamScore {
                team: team.clone(),
                gender: athlete.gender,
                points,
                members: 1,
            }),
        }
    }
    scores.sort_by(|a, b| {
        a.gender
            .cmp(&b.gender)
            .then_with(|| b.points.total_cmp(&a.points))
            .then_with(|| a.team.cmp(&b.team))
    });
    debug!(%ranking, teams = scores.len(), "team scores computed");
    scores
}
