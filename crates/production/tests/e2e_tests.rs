//! End-to-end tests for the production runner.
//!
//! Each test runs a [`FopRunner`] on a paused tokio clock against a roster
//! file in a temporary directory and observes it through the UI bus, the
//! way remote displays do.

use barbell_core::{Event, Origin, UiEvent};
use barbell_fop::FopConfig;
use barbell_production::{
    parse_command, ConsoleCommand, FopHandle, FopRunner, JsonFileStore, RunnerError, UiBus, UiMessage,
};
use barbell_types::test_utils::{athlete_with_total, test_athlete};
use barbell_types::{AthleteId, Group, PlatformIndex};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::broadcast;
use tokio::time::timeout;
use tracing_test::traced_test;

/// Longest a test waits for one UI event, in virtual time.
const UI_TIMEOUT: Duration = Duration::from_secs(300);

fn official(name: &str) -> Origin {
    Origin::named(name)
}

fn roster(dir: &TempDir) -> Arc<JsonFileStore> {
    let store = JsonFileStore::create(
        dir.path().join("roster.json"),
        Group::new("A"),
        [test_athlete(1, 100), test_athlete(2, 105), test_athlete(3, 110)],
    )
    .unwrap();
    Arc::new(store)
}

fn build_runner(store: Arc<JsonFileStore>, bus: &UiBus) -> FopRunner {
    FopRunner::builder()
        .platform(PlatformIndex(1))
        .config(FopConfig::default())
        .store(store)
        .group(Group::new("A"))
        .ui_bus(bus.clone())
        .build()
        .unwrap()
}

/// Wait for the next UI event with the given type name, skipping others.
async fn next_named(rx: &mut broadcast::Receiver<UiMessage>, name: &str) -> UiMessage {
    timeout(UI_TIMEOUT, async {
        loop {
            let message = rx.recv().await.unwrap();
            if message.event.type_name() == name {
                return message;
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("no {name} event"))
}

async fn vote(handle: &FopHandle, referee: usize, decision: bool) {
    handle
        .submit(Event::DecisionUpdate {
            referee,
            decision,
            origin: official(&format!("referee-{}", referee + 1)),
        })
        .await
        .unwrap();
}

#[traced_test]
#[tokio::test(start_paused = true)]
async fn test_good_lift_is_announced_reset_and_saved() {
    let dir = TempDir::new().unwrap();
    let store = roster(&dir);
    let bus = UiBus::new(256);
    let mut rx = bus.subscribe();

    let mut runner = build_runner(store.clone(), &bus);
    let handle = runner.handle();
    let shutdown = runner.shutdown_handle().unwrap();
    let task = tokio::spawn(runner.run());

    let loaded = next_named(&mut rx, "LiftingOrderUpdated").await;
    assert_eq!(loaded.platform, PlatformIndex(1));
    match &loaded.event {
        UiEvent::LiftingOrderUpdated { current, .. } => {
            assert_eq!(current.as_ref().map(|a| a.id), Some(AthleteId(1)));
        }
        other => panic!("unexpected {other:?}"),
    }

    handle
        .submit(Event::TimeStarted {
            origin: official("timekeeper"),
        })
        .await
        .unwrap();
    vote(&handle, 0, true).await;
    vote(&handle, 1, true).await;
    vote(&handle, 2, true).await;

    next_named(&mut rx, "DownSignal").await;
    match next_named(&mut rx, "Decision").await.event {
        UiEvent::Decision {
            good_lift,
            decisions,
            ..
        } => {
            assert!(good_lift);
            assert_eq!(decisions, [Some(true); 3]);
        }
        other => panic!("unexpected {other:?}"),
    }
    next_named(&mut rx, "DecisionReset").await;

    // saved before the board returned to the lifting order
    let saved = store.athlete(AthleteId(1)).unwrap();
    assert_eq!(saved.snatch_attempts_done(), 1);
    assert_eq!(saved.best_snatch(), 100);

    // and written through to the roster file
    let reopened = JsonFileStore::open(store.path()).unwrap();
    assert_eq!(
        reopened.athlete(AthleteId(1)).unwrap().snatch_attempts_done(),
        1
    );

    shutdown.shutdown();
    assert!(task.await.unwrap().is_ok());
}

#[traced_test]
#[tokio::test(start_paused = true)]
async fn test_weight_change_reorders_lifting() {
    let dir = TempDir::new().unwrap();
    let bus = UiBus::new(256);
    let mut rx = bus.subscribe();

    let mut runner = build_runner(roster(&dir), &bus);
    let handle = runner.handle();
    let shutdown = runner.shutdown_handle().unwrap();
    let task = tokio::spawn(runner.run());
    next_named(&mut rx, "LiftingOrderUpdated").await;

    handle
        .change_weight(AthleteId(1), 112, official("marshal"))
        .await
        .unwrap();

    match next_named(&mut rx, "LiftingOrderUpdated").await.event {
        UiEvent::LiftingOrderUpdated {
            current,
            lifting_order,
            ..
        } => {
            assert_eq!(current.map(|a| a.id), Some(AthleteId(2)));
            let order: Vec<_> = lifting_order.iter().map(|a| a.id.0).collect();
            assert_eq!(order, vec![2, 3, 1]);
        }
        other => panic!("unexpected {other:?}"),
    }

    shutdown.shutdown();
    assert!(task.await.unwrap().is_ok());
}

#[traced_test]
#[tokio::test(start_paused = true)]
async fn test_console_commands_drive_the_runner() {
    let dir = TempDir::new().unwrap();
    let bus = UiBus::new(256);
    let mut rx = bus.subscribe();

    let mut runner = build_runner(roster(&dir), &bus);
    let handle = runner.handle();
    let shutdown = runner.shutdown_handle().unwrap();
    let task = tokio::spawn(runner.run());
    next_named(&mut rx, "LiftingOrderUpdated").await;

    for line in ["start", "vote 1 bad", "vote 3 bad"] {
        match parse_command(line, official("console")).unwrap() {
            ConsoleCommand::Event(event) => handle.submit(event).await.unwrap(),
            ConsoleCommand::ChangeWeight { .. } => unreachable!(),
        }
    }

    let down = next_named(&mut rx, "DownSignal").await;
    assert_eq!(down.event.origin().name(), Some("console"));

    shutdown.shutdown();
    assert!(task.await.unwrap().is_ok());
}

#[traced_test]
#[tokio::test(start_paused = true)]
async fn test_finished_group_is_reported_done() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(
        JsonFileStore::create(
            dir.path().join("done.json"),
            Group::new("A"),
            [athlete_with_total(1, 100, 120), athlete_with_total(2, 95, 0)],
        )
        .unwrap(),
    );
    let bus = UiBus::new(64);
    let mut rx = bus.subscribe();

    let mut runner = build_runner(store, &bus);
    let shutdown = runner.shutdown_handle().unwrap();
    let task = tokio::spawn(runner.run());

    match next_named(&mut rx, "GroupDone").await.event {
        UiEvent::GroupDone { group, .. } => assert_eq!(group, Some(Group::new("A"))),
        other => panic!("unexpected {other:?}"),
    }

    shutdown.shutdown();
    assert!(task.await.unwrap().is_ok());
}

#[traced_test]
#[tokio::test(start_paused = true)]
async fn test_runner_stops_when_shutdown_handle_dropped() {
    let dir = TempDir::new().unwrap();
    let bus = UiBus::new(16);

    let mut runner = build_runner(roster(&dir), &bus);
    let handle = runner.handle();
    drop(runner.shutdown_handle());
    let task = tokio::spawn(runner.run());

    assert!(task.await.unwrap().is_ok());
    // the runner is gone, its handles report it
    let sent = handle
        .submit(Event::TimeStarted {
            origin: official("timekeeper"),
        })
        .await;
    assert!(matches!(sent, Err(RunnerError::ChannelClosed)));
}

#[traced_test]
#[test]
fn test_builder_requires_store() {
    let result = FopRunner::builder().build();
    assert!(matches!(result, Err(RunnerError::Misconfigured(_))));
}
