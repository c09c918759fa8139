//! Tests for deterministic simulation.
//!
//! These tests verify that the simulation produces identical results
//! given the same seed, which is the core property we need for debugging
//! and replay.

use barbell_core::{Event, Origin};
use barbell_fop::FopConfig;
use barbell_simulation::{Console, ConsoleConfig, MemoryStore, SimulationConfig, SimulationRunner};
use barbell_types::test_utils::test_athlete;
use barbell_types::{Group, PlatformIndex};
use std::sync::Arc;
use std::time::Duration;
use tracing_test::traced_test;

/// Consoles with noticeable jitter and some input loss.
fn noisy_config() -> SimulationConfig {
    SimulationConfig {
        platforms: 2,
        fop: FopConfig::default(),
        consoles: ConsoleConfig {
            latency: Duration::from_millis(80),
            jitter_fraction: 0.5,
            loss_rate: 0.1,
        },
    }
}

fn store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.insert_group(Group::new("A"), (1..=6).map(|i| test_athlete(i, 90 + i as u32)));
    store.insert_group(Group::new("B"), (7..=12).map(|i| test_athlete(i, 80 + i as u32)));
    store
}

/// Both platforms lift for a few minutes: clock starts and three votes per
/// attempt, some of which are lost.
fn run_session(seed: u64) -> SimulationRunner {
    let mut runner = SimulationRunner::new(noisy_config(), store(), seed);
    for (platform, group) in [(0, "A"), (1, "B")] {
        let platform = PlatformIndex(platform);
        runner
            .schedule_initial_event(
                platform,
                Duration::ZERO,
                Event::SwitchGroup {
                    group: Some(Group::new(group)),
                    origin: Origin::named("announcer"),
                },
            )
            .unwrap();

        for attempt in 0..6u64 {
            let start = Duration::from_secs(1 + attempt * 20);
            runner
                .submit(
                    platform,
                    Console::Timekeeper,
                    start,
                    Event::TimeStarted {
                        origin: Origin::named("timekeeper"),
                    },
                )
                .unwrap();
            for referee in 0..3 {
                let console = Console::Referee(referee);
                let at = start + Duration::from_secs(5) + Duration::from_millis(300 * referee as u64);
                runner
                    .submit(
                        platform,
                        console,
                        at,
                        Event::DecisionUpdate {
                            referee,
                            decision: (attempt + referee as u64) % 3 != 0,
                            origin: Origin::named(&console.to_string()),
                        },
                    )
                    .unwrap();
            }
        }
    }
    runner.run_until(Duration::from_secs(180)).unwrap();
    runner
}

fn trace(runner: &SimulationRunner) -> Vec<(Duration, PlatformIndex, &'static str)> {
    runner
        .ui_events()
        .iter()
        .map(|r| (r.time, r.platform, r.event.type_name()))
        .collect()
}

#[test]
fn test_runner_creation() {
    let runner = SimulationRunner::new(noisy_config(), store(), 42);

    assert_eq!(runner.platform_count(), 2);
    assert!(runner.platform(PlatformIndex(1)).is_some());
    assert!(runner.platform(PlatformIndex(2)).is_none());
    assert_eq!(runner.pending_events(), 0);
}

#[traced_test]
#[test]
fn test_determinism_same_seed() {
    let seed = 12345u64;

    let runner1 = run_session(seed);
    let runner2 = run_session(seed);

    let stats1 = runner1.stats();
    let stats2 = runner2.stats();
    assert_eq!(stats1.events_processed, stats2.events_processed);
    assert_eq!(stats1.inputs_dropped(), stats2.inputs_dropped());
    assert_eq!(stats1.athletes_persisted, stats2.athletes_persisted);
    assert_eq!(trace(&runner1), trace(&runner2));

    for id in 1..=12 {
        let id = barbell_types::AthleteId(id);
        assert_eq!(runner1.store().athlete(id), runner2.store().athlete(id));
    }
}

#[traced_test]
#[test]
fn test_session_makes_progress() {
    let runner = run_session(42);
    let stats = runner.stats();

    assert!(stats.events_processed > 0);
    assert!(stats.ui_events > 0);
    assert!(stats.delivery_rate() > 0.5);
    assert_eq!(
        stats.inputs_delivered + stats.inputs_dropped(),
        2 * 6 * 4,
        "every scripted input is either delivered or dropped"
    );
}
