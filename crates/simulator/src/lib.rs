//! Seeded end-to-end session simulator.
//!
//! Generates a weighed-in group, then plays officials and coaches against a
//! deterministic [`barbell_simulation::SimulationRunner`] until every
//! athlete has taken six attempts. The report lists results and ranks
//! together with the platform's pace.
//!
//! Given the same seed, a session produces identical results every run.

mod config;
mod generator;
mod metrics;
mod session;

pub use config::{OfficialsConfig, SimulatorConfig};
pub use generator::generate_group;
pub use metrics::{AthleteResult, MetricsCollector, SessionReport, SessionSummary, TeamResult};
pub use session::{SessionSimulator, SimulatorError};
