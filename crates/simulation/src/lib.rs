//! Deterministic simulation of competition platforms.
//!
//! The [`SimulationRunner`] owns one [`barbell_fop::FieldOfPlay`] per
//! platform and a single global event queue ordered by
//! `(time, priority, sequence)`. Official inputs travel through simulated
//! [`consoles`] with latency, jitter and loss; timers, store reads and sound
//! execute inline. Given the same seed and the same scripted inputs, two runs
//! produce identical UI traces.

mod consoles;
mod event_queue;
mod runner;
mod storage;

pub use consoles::{Console, ConsoleConfig, SimulatedConsoles};
pub use event_queue::EventKey;
pub use runner::{
    SimulationConfig, SimulationError, SimulationRunner, SimulationStats, SoundRecord, UiRecord,
};
pub use storage::MemoryStore;
