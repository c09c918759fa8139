//! Referee decision aggregation.
//!
//! - [`DecisionSlate`]: three referee slots with vote times
//! - [`DecisionAggregator`]: majority evaluation, down-signal readiness and the
//!   collecting → settling → finalized lifecycle of one decision
//! - [`CueFlags`]: at-most-once guards for the clock and down-signal cues

mod aggregator;
mod cues;
mod slate;

pub use aggregator::{DecisionAggregator, DecisionPhase, Evaluation};
pub use cues::CueFlags;
pub use slate::{DecisionError, DecisionSlate, MAJORITY, REFEREES};
