//! Deterministic simulation runner.
//!
//! Every platform has its own field of play; all of them share one athlete
//! store. Store reads and writes, sound and timers execute inline
//! (synchronously) when a field of play emits the corresponding action.

use crate::consoles::{Console, ConsoleConfig, SimulatedConsoles};
use crate::event_queue::EventKey;
use crate::storage::MemoryStore;
use barbell_core::{
    Action, AthleteStore, Cue, Event, GroupStore, Origin, SoundPort, StateMachine, StoreError,
    TimerId, UiEvent,
};
use barbell_fop::{FieldOfPlay, FopConfig};
use barbell_types::{Group, PlatformIndex};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Configuration of a simulated competition venue.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Number of platforms, each with its own field of play.
    pub platforms: u32,
    pub fop: FopConfig,
    pub consoles: ConsoleConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            platforms: 1,
            fop: FopConfig::default(),
            consoles: ConsoleConfig::default(),
        }
    }
}

/// Errors surfaced by the runner while executing actions.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("{platform}: athlete store failed: {source}")]
    Store {
        platform: PlatformIndex,
        #[source]
        source: StoreError,
    },

    #[error("no such platform: {0}")]
    UnknownPlatform(PlatformIndex),
}

/// A UI event as observed by the displays of a platform.
#[derive(Debug, Clone)]
pub struct UiRecord {
    pub time: Duration,
    pub platform: PlatformIndex,
    pub event: UiEvent,
}

/// A cue played on a platform's sound emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoundRecord {
    pub time: Duration,
    pub platform: PlatformIndex,
    pub cue: Cue,
}

/// Statistics collected during simulation.
#[derive(Debug, Default, Clone)]
pub struct SimulationStats {
    /// Total events processed.
    pub events_processed: u64,
    /// Events processed by priority.
    pub events_by_priority: [u64; 3],
    /// Total actions generated.
    pub actions_generated: u64,
    /// Official inputs scheduled for delivery.
    pub inputs_delivered: u64,
    /// Official inputs dropped by a disconnected console.
    pub inputs_dropped_disconnected: u64,
    /// Official inputs dropped by input loss.
    pub inputs_dropped_loss: u64,
    pub ui_events: u64,
    pub sounds: u64,
    pub athletes_persisted: u64,
    pub timers_set: u64,
    pub timers_cancelled: u64,
}

impl SimulationStats {
    pub fn inputs_dropped(&self) -> u64 {
        self.inputs_dropped_disconnected + self.inputs_dropped_loss
    }

    /// Input delivery rate (delivered / (delivered + dropped)).
    pub fn delivery_rate(&self) -> f64 {
        let total = self.inputs_delivered + self.inputs_dropped();
        if total == 0 {
            1.0
        } else {
            self.inputs_delivered as f64 / total as f64
        }
    }
}

/// Deterministic simulation runner.
///
/// Processes events in deterministic order and executes actions.
/// Given the same seed, produces identical results every run.
pub struct SimulationRunner {
    /// All fields of play, indexed by platform.
    platforms: Vec<FieldOfPlay>,

    /// Global event queue, ordered deterministically.
    event_queue: BTreeMap<EventKey, Event>,

    /// Sequence counter for deterministic ordering.
    sequence: u64,

    /// Current simulation time.
    now: Duration,

    consoles: SimulatedConsoles,

    /// RNG for console conditions (seeded for determinism).
    rng: ChaCha8Rng,

    /// Timer registry for replacement and cancellation.
    /// Maps (platform, timer_id) -> event_key for removal.
    timers: HashMap<(PlatformIndex, TimerId), EventKey>,

    stats: SimulationStats,

    store: Arc<MemoryStore>,

    /// Optional sound output, in addition to the sound log.
    sound: Option<Arc<dyn SoundPort>>,

    ui_log: Vec<UiRecord>,
    sound_log: Vec<SoundRecord>,
}

impl SimulationRunner {
    /// Create a runner whose platforms start inactive with no group.
    pub fn new(config: SimulationConfig, store: Arc<MemoryStore>, seed: u64) -> Self {
        let platforms = (0..config.platforms)
            .map(|index| FieldOfPlay::new(PlatformIndex(index), None, Vec::new(), config.fop.clone()))
            .collect();

        debug!(platforms = config.platforms, seed, "Created simulation runner");

        Self {
            platforms,
            event_queue: BTreeMap::new(),
            sequence: 0,
            now: Duration::ZERO,
            consoles: SimulatedConsoles::new(config.consoles),
            rng: ChaCha8Rng::seed_from_u64(seed),
            timers: HashMap::new(),
            stats: SimulationStats::default(),
            store,
            sound: None,
            ui_log: Vec::new(),
            sound_log: Vec::new(),
        }
    }

    /// Forward emitted cues to a sound output.
    pub fn attach_sound(&mut self, sound: Arc<dyn SoundPort>) {
        self.sound = Some(sound);
    }

    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn platform(&self, index: PlatformIndex) -> Option<&FieldOfPlay> {
        self.platforms.get(index.0 as usize)
    }

    pub fn platform_count(&self) -> usize {
        self.platforms.len()
    }

    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    pub fn consoles(&self) -> &SimulatedConsoles {
        &self.consoles
    }

    pub fn consoles_mut(&mut self) -> &mut SimulatedConsoles {
        &mut self.consoles
    }

    /// Every UI event posted so far, in processing order.
    pub fn ui_events(&self) -> &[UiRecord] {
        &self.ui_log
    }

    /// UI events of one platform, in processing order.
    pub fn ui_events_for(&self, platform: PlatformIndex) -> impl Iterator<Item = &UiRecord> {
        self.ui_log.iter().filter(move |r| r.platform == platform)
    }

    pub fn sounds(&self) -> &[SoundRecord] {
        &self.sound_log
    }

    /// Number of events still queued.
    pub fn pending_events(&self) -> usize {
        self.event_queue.len()
    }

    /// Schedule an event for a platform, bypassing the consoles.
    pub fn schedule_initial_event(
        &mut self,
        platform: PlatformIndex,
        delay: Duration,
        event: Event,
    ) -> Result<(), SimulationError> {
        self.check_platform(platform)?;
        let time = self.now + delay;
        self.schedule_event(platform, time, event);
        Ok(())
    }

    /// Enter an official input on a console `delay` from now.
    ///
    /// The input reaches the field of play after the console latency, or
    /// never if the console is disconnected or the input is lost. Returns
    /// whether the input was scheduled for delivery.
    pub fn submit(
        &mut self,
        platform: PlatformIndex,
        console: Console,
        delay: Duration,
        event: Event,
    ) -> Result<bool, SimulationError> {
        self.check_platform(platform)?;

        // Check disconnection first (deterministic - doesn't consume RNG)
        if self.consoles.is_disconnected(platform, console) {
            self.stats.inputs_dropped_disconnected += 1;
            trace!(platform = platform.0, %console, "Input dropped by disconnected console");
            return Ok(false);
        }

        if self.consoles.should_drop_input(&mut self.rng) {
            self.stats.inputs_dropped_loss += 1;
            trace!(platform = platform.0, %console, "Input lost");
            return Ok(false);
        }

        let latency = self.consoles.sample_latency(&mut self.rng);
        let delivery_time = self.now + delay + latency;
        self.schedule_event(platform, delivery_time, event);
        self.stats.inputs_delivered += 1;
        Ok(true)
    }

    /// Convenience for the announcer switching a platform to a group.
    pub fn switch_group(
        &mut self,
        platform: PlatformIndex,
        group: Option<Group>,
        delay: Duration,
    ) -> Result<bool, SimulationError> {
        let origin = Origin::named(&Console::Announcer.to_string());
        self.submit(
            platform,
            Console::Announcer,
            delay,
            Event::SwitchGroup { group, origin },
        )
    }

    /// Run simulation until no more events or time limit reached.
    ///
    /// Store failures abort the run and are returned to the caller; the
    /// remaining events stay queued.
    pub fn run_until(&mut self, end_time: Duration) -> Result<(), SimulationError> {
        trace!(end_time_secs = end_time.as_secs_f64(), "Running simulation step");

        while let Some((&key, _)) = self.event_queue.first_key_value() {
            if key.time > end_time {
                debug!(remaining_events = self.event_queue.len(), "Time limit reached");
                break;
            }

            let Some((key, event)) = self.event_queue.pop_first() else {
                break;
            };
            self.now = key.time;
            let platform = key.platform;

            if event.is_timer() {
                self.forget_timer(platform, key);
            }

            trace!(
                time = ?self.now,
                platform = platform.0,
                event = event.type_name(),
                "Processing event"
            );

            self.stats.events_processed += 1;
            self.stats.events_by_priority[event.priority() as usize] += 1;

            let fop = &mut self.platforms[platform.0 as usize];
            fop.set_time(self.now);
            let actions = fop.handle(event);

            self.stats.actions_generated += actions.len() as u64;

            for action in actions {
                self.process_action(platform, action)?;
            }
        }

        // clocks keep counting between events
        self.now = self.now.max(end_time);
        for fop in &mut self.platforms {
            fop.set_time(self.now);
        }

        trace!(
            events_processed = self.stats.events_processed,
            actions_generated = self.stats.actions_generated,
            final_time = ?self.now,
            "Simulation step complete"
        );
        Ok(())
    }

    /// Process an action from a field of play.
    fn process_action(
        &mut self,
        from: PlatformIndex,
        action: Action,
    ) -> Result<(), SimulationError> {
        match action {
            Action::PostUi { event } => {
                self.stats.ui_events += 1;
                self.ui_log.push(UiRecord {
                    time: self.now,
                    platform: from,
                    event,
                });
            }

            Action::SetTimer { id, duration, tag } => {
                if let Some(previous) = self.timers.remove(&(from, id)) {
                    self.event_queue.remove(&previous);
                }
                let fire_time = self.now + duration;
                let key = self.schedule_event(from, fire_time, Event::from_timer(id, tag));
                self.timers.insert((from, id), key);
                self.stats.timers_set += 1;
            }

            Action::CancelTimer { id } => {
                if let Some(key) = self.timers.remove(&(from, id)) {
                    self.event_queue.remove(&key);
                    self.stats.timers_cancelled += 1;
                }
            }

            Action::EmitSound { cue } => {
                self.stats.sounds += 1;
                self.sound_log.push(SoundRecord {
                    time: self.now,
                    platform: from,
                    cue,
                });
                if let Some(sound) = &self.sound {
                    sound.emit(&cue.tone());
                }
            }

            Action::PersistAthlete { athlete } => {
                self.store
                    .save(&athlete)
                    .map_err(|source| SimulationError::Store {
                        platform: from,
                        source,
                    })?;
                self.stats.athletes_persisted += 1;
            }

            Action::LoadAthletes { group, origin } => {
                let store_error = |source| SimulationError::Store {
                    platform: from,
                    source,
                };
                let athletes = self
                    .store
                    .find_all_by_group_and_weigh_in(group.as_ref())
                    .map_err(store_error)?;
                let group_done = match &group {
                    Some(group) => self.store.is_done(group).map_err(store_error)?,
                    None => false,
                };
                self.schedule_event(
                    from,
                    self.now,
                    Event::AthletesLoaded {
                        group,
                        athletes,
                        group_done,
                        origin,
                    },
                );
            }
        }
        Ok(())
    }

    fn schedule_event(&mut self, platform: PlatformIndex, time: Duration, event: Event) -> EventKey {
        self.sequence += 1;
        let key = EventKey::new(time, &event, platform, self.sequence);
        self.event_queue.insert(key, event);
        key
    }

    /// Drop the registry entry of a timer that just fired.
    fn forget_timer(&mut self, platform: PlatformIndex, key: EventKey) {
        let fired = self
            .timers
            .iter()
            .find(|(&(p, _), &k)| p == platform && k == key)
            .map(|(&id, _)| id);
        match fired {
            Some(id) => {
                self.timers.remove(&id);
            }
            None => warn!(platform = platform.0, "Fired timer missing from registry"),
        }
    }

    fn check_platform(&self, platform: PlatformIndex) -> Result<(), SimulationError> {
        if (platform.0 as usize) < self.platforms.len() {
            Ok(())
        } else {
            Err(SimulationError::UnknownPlatform(platform))
        }
    }
}
