//! Whole-session simulations.

use barbell_simulation::ConsoleConfig;
use barbell_simulator::{OfficialsConfig, SessionSimulator, SimulatorConfig, SimulatorError};
use barbell_types::test_utils::test_athlete;
use tracing_test::traced_test;

fn perfect_officials() -> OfficialsConfig {
    OfficialsConfig::default()
        .with_good_lift_rate(1.0)
        .with_weight_change_rate(0.0)
}

#[traced_test]
#[test]
fn test_all_good_lifts_follow_automatic_progression() {
    let config = SimulatorConfig::new(3)
        .with_officials(perfect_officials())
        .with_consoles(ConsoleConfig::instant());
    let athletes = vec![test_athlete(1, 100), test_athlete(2, 90), test_athlete(3, 110)];

    let report = SessionSimulator::with_roster(config, athletes)
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(report.attempts, 18);
    assert_eq!(report.good_lifts, 18);
    assert_eq!(report.jury_decisions, 0);
    assert_eq!(report.restarts, 0);

    // declarations, then +1 kg after each good lift
    let totals: Vec<_> = report
        .results
        .iter()
        .map(|r| (r.best_snatch, r.best_clean_jerk, r.total, r.total_rank))
        .collect();
    assert_eq!(
        totals,
        vec![
            (112, 132, 244, Some(1)),
            (102, 122, 224, Some(2)),
            (92, 112, 204, Some(3)),
        ]
    );
}

#[traced_test]
#[test]
fn test_all_failed_lifts_leave_athletes_unranked() {
    let officials = OfficialsConfig::default()
        .with_good_lift_rate(0.0)
        .with_weight_change_rate(0.0);
    let config = SimulatorConfig::new(2)
        .with_officials(officials)
        .with_consoles(ConsoleConfig::instant());
    let athletes = vec![test_athlete(1, 100), test_athlete(2, 95)];

    let report = SessionSimulator::with_roster(config, athletes)
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(report.attempts, 12);
    assert_eq!(report.good_lifts, 0);
    for result in &report.results {
        assert_eq!(result.total, 0);
        assert_eq!(result.total_rank, Some(0));
        assert_eq!(result.sinclair, 0.0);
    }
}

#[traced_test]
#[test]
fn test_generated_group_completes_with_ranks_per_category() {
    let config = SimulatorConfig::new(10)
        .with_seed(7)
        .with_officials(perfect_officials())
        .with_consoles(ConsoleConfig::instant());

    let report = SessionSimulator::new(config).unwrap().run().unwrap();

    assert_eq!(report.attempts, 60);
    assert_eq!(report.results.len(), 10);
    assert!(report.attempt_p50 <= report.attempt_p90);
    assert!(report.attempt_p90 <= report.attempt_max);

    // results order groups categories; ranks restart at 1 in each
    let mut previous: Option<(&str, i32)> = None;
    for result in &report.results {
        let category = result.category.as_deref().unwrap();
        let rank = result.total_rank.unwrap();
        match previous {
            Some((prev_category, prev_rank)) if prev_category == category => {
                assert_eq!(rank, prev_rank + 1)
            }
            _ => assert_eq!(rank, 1),
        }
        previous = Some((category, rank));
    }

    // every generated athlete scores for a team
    let members: usize = report.teams.iter().map(|t| t.members).sum();
    assert_eq!(members, 10);
    for pair in report.teams.windows(2) {
        if pair[0].gender == pair[1].gender {
            assert!(pair[0].points >= pair[1].points);
        }
    }
}

#[traced_test]
#[test]
fn test_same_seed_same_session_on_unreliable_consoles() {
    let run = || {
        let consoles = ConsoleConfig {
            loss_rate: 0.05,
            ..ConsoleConfig::default()
        };
        let config = SimulatorConfig::new(6).with_seed(99).with_consoles(consoles);
        SessionSimulator::new(config).unwrap().run().unwrap()
    };

    let first = run();
    let second = run();

    assert_eq!(first.results.len(), 6);
    assert_eq!(first.duration, second.duration);
    assert_eq!(first.attempts, second.attempts);
    assert_eq!(first.jury_decisions, second.jury_decisions);
    assert_eq!(first.inputs_dropped, second.inputs_dropped);
    let sheet = |report: &barbell_simulator::SessionReport| -> Vec<_> {
        report
            .results
            .iter()
            .map(|r| (r.name.clone(), r.total, r.total_rank))
            .collect()
    };
    assert_eq!(sheet(&first), sheet(&second));
}

#[traced_test]
#[test]
fn test_empty_group_is_rejected() {
    let result = SessionSimulator::new(SimulatorConfig::new(0));
    assert!(matches!(result, Err(SimulatorError::EmptyGroup)));
}
