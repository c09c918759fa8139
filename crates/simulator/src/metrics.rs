//! Session metrics and the final report.
//!
//! Attempt durations are kept in an HDR histogram (milliseconds) so the
//! report can quote percentiles for the platform's pace.

use crate::SimulatorError;
use barbell_ranking::TeamScore;
use barbell_types::{Athlete, CompetitionConfig, RankingType};
use hdrhistogram::Histogram;
use serde::Serialize;
use std::time::Duration;

/// Collects metrics while a session is simulated.
pub struct MetricsCollector {
    /// Time from an athlete being called to the board returning to the
    /// lifting order (milliseconds).
    attempt_durations: Histogram<u64>,

    /// Cycles where the athlete was called and the clock started.
    attempts: u64,

    /// Weight changes entered by coaches.
    weight_changes: u64,

    /// Decisions the jury had to enter because referee votes were missing.
    jury_decisions: u64,

    /// Cycles that had to be repeated because an input never arrived.
    restarts: u64,
}

impl MetricsCollector {
    pub fn new() -> Result<Self, SimulatorError> {
        let attempt_durations =
            Histogram::new(3).map_err(|e| SimulatorError::Metrics(format!("{e:?}")))?;
        Ok(Self {
            attempt_durations,
            attempts: 0,
            weight_changes: 0,
            jury_decisions: 0,
            restarts: 0,
        })
    }

    pub fn record_attempt(&mut self, duration: Duration) {
        self.attempts += 1;
        self.attempt_durations
            .saturating_record(duration.as_millis() as u64);
    }

    pub fn record_weight_change(&mut self) {
        self.weight_changes += 1;
    }

    pub fn record_jury_decision(&mut self) {
        self.jury_decisions += 1;
    }

    pub fn record_restart(&mut self) {
        self.restarts += 1;
    }

    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Build the report for a finished session.
    pub fn finalize(self, summary: SessionSummary, results: Vec<AthleteResult>) -> SessionReport {
        let percentile = |q: f64| {
            if self.attempt_durations.len() == 0 {
                Duration::ZERO
            } else {
                Duration::from_millis(self.attempt_durations.value_at_quantile(q))
            }
        };

        SessionReport {
            seed: summary.seed,
            duration: summary.duration,
            attempts: self.attempts,
            good_lifts: summary.good_lifts,
            weight_changes: self.weight_changes,
            jury_decisions: self.jury_decisions,
            restarts: self.restarts,
            inputs_dropped: summary.inputs_dropped,
            delivery_rate: summary.delivery_rate,
            attempt_p50: percentile(0.50),
            attempt_p90: percentile(0.90),
            attempt_max: Duration::from_millis(self.attempt_durations.max()),
            results,
            teams: Vec::new(),
        }
    }
}

/// Figures taken from the simulation runner when the session ends.
#[derive(Debug, Clone, Copy)]
pub struct SessionSummary {
    pub seed: u64,
    pub duration: Duration,
    pub good_lifts: u64,
    pub inputs_dropped: u64,
    pub delivery_rate: f64,
}

/// One line of the results sheet.
#[derive(Debug, Clone, Serialize)]
pub struct AthleteResult {
    pub start_number: Option<u32>,
    pub name: String,
    pub category: Option<String>,
    pub body_weight: Option<f64>,
    pub best_snatch: u32,
    pub best_clean_jerk: u32,
    pub total: u32,
    pub snatch_rank: Option<i32>,
    pub clean_jerk_rank: Option<i32>,
    pub total_rank: Option<i32>,
    pub sinclair: f64,
    pub sinclair_rank: Option<i32>,
}

impl AthleteResult {
    /// Read an athlete whose session ranks have been assigned.
    pub fn from_athlete(athlete: &Athlete, config: &CompetitionConfig) -> Self {
        Self {
            start_number: athlete.start_number,
            name: athlete.full_name(),
            category: athlete.category.as_ref().map(|c| c.code.clone()),
            body_weight: athlete.body_weight,
            best_snatch: athlete.best_snatch(),
            best_clean_jerk: athlete.best_clean_jerk(),
            total: athlete.total(),
            snatch_rank: athlete.rank(RankingType::Snatch),
            clean_jerk_rank: athlete.rank(RankingType::CleanJerk),
            total_rank: athlete.rank(RankingType::Total),
            sinclair: athlete.ranking_value(RankingType::Sinclair, config),
            sinclair_rank: athlete.rank(RankingType::Sinclair),
        }
    }
}

/// Team standing on total points.
#[derive(Debug, Clone, Serialize)]
pub struct TeamResult {
    pub team: String,
    pub gender: String,
    pub points: f64,
    pub members: usize,
}

impl From<&TeamScore> for TeamResult {
    fn from(score: &TeamScore) -> Self {
        Self {
            team: score.team.clone(),
            gender: score.gender.to_string(),
            points: score.points,
            members: score.members,
        }
    }
}

/// Outcome of a simulated session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub seed: u64,
    /// Simulated time from the group being loaded to the group being done.
    pub duration: Duration,
    pub attempts: u64,
    pub good_lifts: u64,
    pub weight_changes: u64,
    pub jury_decisions: u64,
    pub restarts: u64,
    pub inputs_dropped: u64,
    pub delivery_rate: f64,
    pub attempt_p50: Duration,
    pub attempt_p90: Duration,
    pub attempt_max: Duration,
    /// Athletes in results order.
    pub results: Vec<AthleteResult>,
    pub teams: Vec<TeamResult>,
}

impl SessionReport {
    pub fn with_teams(mut self, teams: Vec<TeamResult>) -> Self {
        self.teams = teams;
        self
    }

    /// Print a summary to stdout.
    pub fn print_summary(&self) {
        println!("\n=== Session Complete (seed {}) ===", self.seed);
        println!("Duration:        {:.1} min", self.duration.as_secs_f64() / 60.0);
        println!("Attempts:        {}", self.attempts);
        println!(
            "Good lifts:      {} ({:.1}%)",
            self.good_lifts,
            self.good_lifts as f64 / self.attempts.max(1) as f64 * 100.0
        );
        println!("Weight changes:  {}", self.weight_changes);
        println!("Jury decisions:  {}", self.jury_decisions);
        println!("Restarts:        {}", self.restarts);
        println!(
            "Console inputs:  {} dropped, {:.1}% delivered",
            self.inputs_dropped,
            self.delivery_rate * 100.0
        );
        println!(
            "Attempt pace:    p50 {:.1}s, p90 {:.1}s, max {:.1}s",
            self.attempt_p50.as_secs_f64(),
            self.attempt_p90.as_secs_f64(),
            self.attempt_max.as_secs_f64()
        );

        println!(
            "\n{:<4} {:<22} {:<5} {:>6} {:>4} {:>4} {:>5} {:>4} {:>8}",
            "#", "Name", "Cat", "BW", "Sn", "CJ", "Tot", "Rank", "Sinclair"
        );
        for result in &self.results {
            let rank = result
                .total_rank
                .filter(|r| *r > 0)
                .map_or_else(|| "-".to_string(), |r| r.to_string());
            println!(
                "{:<4} {:<22} {:<5} {:>6.1} {:>4} {:>4} {:>5} {:>4} {:>8.2}",
                result.start_number.unwrap_or(0),
                result.name,
                result.category.as_deref().unwrap_or("-"),
                result.body_weight.unwrap_or(0.0),
                result.best_snatch,
                result.best_clean_jerk,
                result.total,
                rank,
                result.sinclair,
            );
        }

        if !self.teams.is_empty() {
            println!("\n{:<16} {:<3} {:>7} {:>7}", "Team", "G", "Points", "Members");
            for team in &self.teams {
                println!(
                    "{:<16} {:<3} {:>7.0} {:>7}",
                    team.team, team.gender, team.points, team.members
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> SessionSummary {
        SessionSummary {
            seed: 1,
            duration: Duration::from_secs(600),
            good_lifts: 2,
            inputs_dropped: 0,
            delivery_rate: 1.0,
        }
    }

    #[test]
    fn test_percentiles_from_recorded_attempts() {
        let mut metrics = MetricsCollector::new().unwrap();
        for secs in [20, 30, 40, 50, 60] {
            metrics.record_attempt(Duration::from_secs(secs));
        }
        metrics.record_jury_decision();

        let report = metrics.finalize(summary(), Vec::new());
        assert_eq!(report.attempts, 5);
        assert_eq!(report.jury_decisions, 1);
        // three significant digits
        let p50 = report.attempt_p50.as_millis();
        assert!((39_960..=40_040).contains(&p50), "{p50}");
        assert!(report.attempt_max >= Duration::from_millis(59_900));
    }

    #[test]
    fn test_empty_session_reports_zero_pace() {
        let report = MetricsCollector::new().unwrap().finalize(summary(), Vec::new());
        assert_eq!(report.attempts, 0);
        assert_eq!(report.attempt_p50, Duration::ZERO);
        assert_eq!(report.attempt_max, Duration::ZERO);
    }
}
