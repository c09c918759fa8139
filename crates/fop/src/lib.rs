//! Field-of-play session state machine.
//!
//! A [`FieldOfPlay`] runs one competition platform: it tracks who is up,
//! owns the athlete and break clocks, aggregates referee votes and decides
//! when lifting pauses. It implements [`barbell_core::StateMachine`]:
//!
//! ```text
//! Event → FieldOfPlay::handle() → Vec<Action>
//! ```
//!
//! Deferred work (decision settle, decision reset, clock cues) is requested
//! through `Action::SetTimer` and comes back as timer events tagged with the
//! generation or clock run that scheduled them, so a superseded timer is
//! recognised and dropped.

mod clock;
mod config;
mod state;

pub use clock::CountdownClock;
pub use config::{FopConfig, CONSECUTIVE_TIME_ALLOWED, DEFAULT_TIME_ALLOWED};
pub use state::FieldOfPlay;
