//! Production runner with async I/O.
//!
//! This crate wraps the deterministic field of play with real async I/O:
//!
//! - Official inputs via a tokio mpsc channel ([`FopHandle`])
//! - Timers via cancellable tokio tasks ([`TimerManager`])
//! - UI updates via a broadcast bus ([`UiBus`])
//! - Athlete persistence via a JSON file store ([`JsonFileStore`])
//!
//! # Architecture
//!
//! Uses the event aggregator pattern: a single task owns the field of play
//! and receives events via channels, so events for one platform are handled
//! strictly one at a time.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        Platform runner                           │
//! │                                                                  │
//! │  consoles ──► FopHandle ──┐                                      │
//! │                           ▼                                      │
//! │  TimerManager ──────► FopRunner                                  │
//! │                         └─ loop { event = recv();                │
//! │                                   actions = fop.handle(event); } │
//! │                           │                                      │
//! │          ┌────────────────┼──────────────────┐                   │
//! │          ▼                ▼                  ▼                   │
//! │        UiBus        JsonFileStore       SoundPort                │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

mod commands;
mod config;
mod runner;
mod sound;
mod storage;
pub mod telemetry;
mod timers;
mod ui_bus;

pub use commands::{parse_command, CommandError, ConsoleCommand};
pub use config::{ConfigError, PlatformSection, RunnerConfig, TimingSection};
pub use runner::{FopHandle, FopRunner, FopRunnerBuilder, RunnerError, ShutdownHandle};
pub use sound::LoggedSound;
pub use storage::{JsonFileStore, StorageError};
pub use telemetry::{init_telemetry, TelemetryConfig, TelemetryError};
pub use timers::TimerManager;
pub use ui_bus::{UiBus, UiMessage};
