//! Production runner implementation.

use crate::timers::TimerManager;
use crate::ui_bus::UiBus;
use barbell_core::{
    Action, AthleteStore, Event, GroupStore, Origin, SoundPort, StateMachine, StoreError,
};
use barbell_fop::{FieldOfPlay, FopConfig};
use barbell_types::{AthleteId, Group, PlatformIndex};
use std::collections::VecDeque;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, info, span, warn, Level};

/// Errors from the production runner.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Event channel closed")]
    ChannelClosed,

    #[error("Athlete store failed: {0}")]
    Store(#[from] StoreError),

    #[error("Runner misconfigured: {0}")]
    Misconfigured(&'static str),
}

/// Inputs accepted by a running field of play.
#[derive(Debug)]
enum Request {
    Event(Event),
    ChangeWeight {
        athlete: AthleteId,
        weight: u32,
        origin: Origin,
    },
}

/// Handle for shutting down a running [`FopRunner`].
///
/// When dropped, signals the runner to exit gracefully.
#[derive(Debug)]
pub struct ShutdownHandle {
    tx: Option<oneshot::Sender<()>>,
}

impl ShutdownHandle {
    /// Trigger shutdown (consumes the handle).
    pub fn shutdown(mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for ShutdownHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Cloneable sender for the officials' consoles of one platform.
#[derive(Debug, Clone)]
pub struct FopHandle {
    platform: PlatformIndex,
    tx: mpsc::Sender<Request>,
}

impl FopHandle {
    pub fn platform(&self) -> PlatformIndex {
        self.platform
    }

    /// Queue an event for the field of play.
    pub async fn submit(&self, event: Event) -> Result<(), RunnerError> {
        self.tx
            .send(Request::Event(event))
            .await
            .map_err(|_| RunnerError::ChannelClosed)
    }

    /// Change the next requested weight of an athlete of the current group.
    ///
    /// The runner applies the change to the athlete as the field of play
    /// currently knows them and delivers the result as a weight change event.
    pub async fn change_weight(
        &self,
        athlete: AthleteId,
        weight: u32,
        origin: Origin,
    ) -> Result<(), RunnerError> {
        self.tx
            .send(Request::ChangeWeight {
                athlete,
                weight,
                origin,
            })
            .await
            .map_err(|_| RunnerError::ChannelClosed)
    }
}

/// Builder for constructing a [`FopRunner`].
///
/// Required fields:
/// - `store` - athlete and group persistence
///
/// Optional fields:
/// - `platform` - platform index (defaults to 0)
/// - `config` - field-of-play timing and rules (defaults to [`FopConfig::default`])
/// - `group` - group loaded when the runner starts
/// - `ui_bus` - shared UI bus (defaults to a private bus)
/// - `sound` - sound output, used when `config.emit_sounds` is set
/// - `channel_capacity` - inbound channel capacity (defaults to 1,024)
///
/// # Example
///
/// ```no_run
/// use barbell_production::{FopRunner, JsonFileStore};
/// use barbell_types::Group;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = Arc::new(JsonFileStore::open("roster.json")?);
/// let mut runner = FopRunner::builder()
///     .store(store)
///     .group(Group::new("M73-A"))
///     .build()?;
/// let handle = runner.handle();
/// let shutdown = runner.shutdown_handle();
/// tokio::spawn(runner.run());
/// # Ok(())
/// # }
/// ```
pub struct FopRunnerBuilder {
    platform: PlatformIndex,
    config: FopConfig,
    group: Option<Group>,
    athletes: Option<Arc<dyn AthleteStore>>,
    groups: Option<Arc<dyn GroupStore>>,
    ui_bus: Option<UiBus>,
    sound: Option<Arc<dyn SoundPort>>,
    channel_capacity: usize,
}

impl Default for FopRunnerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FopRunnerBuilder {
    pub fn new() -> Self {
        Self {
            platform: PlatformIndex(0),
            config: FopConfig::default(),
            group: None,
            athletes: None,
            groups: None,
            ui_bus: None,
            sound: None,
            channel_capacity: 1024,
        }
    }

    pub fn platform(mut self, platform: PlatformIndex) -> Self {
        self.platform = platform;
        self
    }

    pub fn config(mut self, config: FopConfig) -> Self {
        self.config = config;
        self
    }

    pub fn group(mut self, group: Group) -> Self {
        self.group = Some(group);
        self
    }

    /// Athlete and group persistence.
    pub fn store<S>(mut self, store: Arc<S>) -> Self
    where
        S: AthleteStore + GroupStore + 'static,
    {
        self.athletes = Some(store.clone());
        self.groups = Some(store);
        self
    }

    pub fn ui_bus(mut self, bus: UiBus) -> Self {
        self.ui_bus = Some(bus);
        self
    }

    pub fn sound(mut self, sound: Arc<dyn SoundPort>) -> Self {
        self.sound = Some(sound);
        self
    }

    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    pub fn build(self) -> Result<FopRunner, RunnerError> {
        let (Some(athletes), Some(groups)) = (self.athletes, self.groups) else {
            return Err(RunnerError::Misconfigured("store is required"));
        };
        if self.channel_capacity == 0 {
            return Err(RunnerError::Misconfigured("channel capacity must be positive"));
        }

        let (request_tx, request_rx) = mpsc::channel(self.channel_capacity);
        let (timer_tx, timer_rx) = mpsc::channel(64);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let mut internal = VecDeque::new();
        if let Some(group) = self.group {
            internal.push_back(Event::SwitchGroup {
                group: Some(group),
                origin: Origin::internal(),
            });
        }

        Ok(FopRunner {
            fop: FieldOfPlay::new(self.platform, None, Vec::new(), self.config),
            athletes,
            groups,
            sound: self.sound,
            ui_bus: self.ui_bus.unwrap_or_else(|| UiBus::new(256)),
            timers: TimerManager::new(timer_tx),
            timer_rx,
            request_tx,
            request_rx,
            internal,
            shutdown_tx: Some(shutdown_tx),
            shutdown_rx,
            start_time: Instant::now(),
        })
    }
}

/// Production runner for one field of play.
///
/// A single task owns the [`FieldOfPlay`]; officials' inputs, timer expiries
/// and store callbacks all funnel into it and are handled one at a time.
pub struct FopRunner {
    fop: FieldOfPlay,
    athletes: Arc<dyn AthleteStore>,
    groups: Arc<dyn GroupStore>,
    sound: Option<Arc<dyn SoundPort>>,
    ui_bus: UiBus,
    timers: TimerManager,
    /// Timer expiries, on their own channel so a flood of console inputs
    /// never delays them.
    timer_rx: mpsc::Receiver<Event>,
    request_tx: mpsc::Sender<Request>,
    request_rx: mpsc::Receiver<Request>,
    /// Callback events produced while executing actions, handled before any
    /// new input.
    internal: VecDeque<Event>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    shutdown_rx: oneshot::Receiver<()>,
    start_time: Instant,
}

impl FopRunner {
    pub fn builder() -> FopRunnerBuilder {
        FopRunnerBuilder::new()
    }

    pub fn platform(&self) -> PlatformIndex {
        self.fop.platform()
    }

    pub fn handle(&self) -> FopHandle {
        FopHandle {
            platform: self.fop.platform(),
            tx: self.request_tx.clone(),
        }
    }

    pub fn ui_bus(&self) -> &UiBus {
        &self.ui_bus
    }

    /// Get a shutdown handle. Only the first call returns a handle.
    pub fn shutdown_handle(&mut self) -> Option<ShutdownHandle> {
        self.shutdown_tx
            .take()
            .map(|tx| ShutdownHandle { tx: Some(tx) })
    }

    /// Run the event loop until shutdown.
    ///
    /// Failures while executing an action are logged and the loop carries
    /// on; the field of play has already moved to its next state.
    pub async fn run(mut self) -> Result<(), RunnerError> {
        let platform = self.fop.platform();
        info!(platform = platform.0, "Starting field of play runner");

        loop {
            if let Some(event) = self.internal.pop_front() {
                self.dispatch(event, "handle_callback");
                continue;
            }

            // Use biased select for priority ordering:
            // 1. Shutdown (always first)
            // 2. Timers (decision settle/reset and clock cues)
            // 3. Console inputs
            tokio::select! {
                biased;

                _ = &mut self.shutdown_rx => {
                    info!(platform = platform.0, "Shutdown signal received");
                    break;
                }

                Some(event) = self.timer_rx.recv() => {
                    self.dispatch(event, "handle_timer");
                }

                request = self.request_rx.recv() => match request {
                    Some(Request::Event(event)) => self.dispatch(event, "handle_input"),
                    Some(Request::ChangeWeight { athlete, weight, origin }) => {
                        self.change_weight(athlete, weight, origin);
                    }
                    None => {
                        debug!(platform = platform.0, "Request channel closed");
                        break;
                    }
                },
            }
        }

        self.timers.cancel_all();
        info!(platform = platform.0, "Field of play runner stopped");
        Ok(())
    }

    fn dispatch(&mut self, event: Event, span_name: &'static str) {
        let event_span = span!(
            Level::DEBUG,
            "fop_event",
            kind = span_name,
            event.type = event.type_name(),
            platform = self.fop.platform().0,
        );
        let _event_guard = event_span.enter();

        let now = self.start_time.elapsed();
        self.fop.set_time(now);
        let actions = self.fop.handle(event);

        for action in actions {
            if let Err(e) = self.process_action(action) {
                tracing::error!(error = %e, "Error processing action");
            }
        }
    }

    fn change_weight(&mut self, athlete: AthleteId, weight: u32, origin: Origin) {
        let Some(mut changed) = self.fop.athlete(athlete).cloned() else {
            warn!(%athlete, weight, "weight change for an athlete outside the group");
            return;
        };
        if let Err(error) = changed.change_weight(weight) {
            warn!(%error, "weight change refused");
            return;
        }
        self.dispatch(
            Event::WeightChange {
                athlete: changed,
                origin,
            },
            "handle_input",
        );
    }

    fn process_action(&mut self, action: Action) -> Result<(), RunnerError> {
        let platform = self.fop.platform();
        match action {
            Action::PostUi { event } => {
                self.ui_bus.publish(platform, event);
            }

            Action::SetTimer { id, duration, tag } => self.timers.set_timer(id, duration, tag),

            Action::CancelTimer { id } => self.timers.cancel_timer(id),

            Action::EmitSound { cue } => match &self.sound {
                Some(sound) => sound.emit(&cue.tone()),
                None => debug!(?cue, "no sound output attached"),
            },

            Action::PersistAthlete { athlete } => self.athletes.save(&athlete)?,

            Action::LoadAthletes { group, origin } => {
                let athletes = self.athletes.find_all_by_group_and_weigh_in(group.as_ref())?;
                let group_done = match &group {
                    Some(group) => self.groups.is_done(group)?,
                    None => false,
                };
                self.internal.push_back(Event::AthletesLoaded {
                    group,
                    athletes,
                    group_done,
                    origin,
                });
            }
        }
        Ok(())
    }
}
