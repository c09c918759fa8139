//! Decision lifecycle for one lift.

use crate::{DecisionError, DecisionSlate, REFEREES};
use std::time::Duration;
use tracing::{debug, trace};

/// Where the current lift's decision stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionPhase {
    /// Votes are still coming in.
    Collecting,
    /// All votes are in; the outcome is shown but not yet applied.
    Settling { provisional: bool },
    /// The outcome was applied to the athlete.
    Finalized,
}

/// What changed after merging votes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Evaluation {
    /// Direction of a majority, once two votes agree.
    pub majority: Option<bool>,
    /// Set when this merge completed the slate: the outcome to show while
    /// the decision settles.
    pub completed: Option<bool>,
}

/// Collects referee votes and tracks one decision from first vote to
/// application.
#[derive(Debug, Clone)]
pub struct DecisionAggregator {
    slate: DecisionSlate,
    phase: DecisionPhase,
}

impl Default for DecisionAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionAggregator {
    pub fn new() -> Self {
        Self {
            slate: DecisionSlate::new(),
            phase: DecisionPhase::Collecting,
        }
    }

    pub fn phase(&self) -> DecisionPhase {
        self.phase
    }

    pub fn decisions(&self) -> [Option<bool>; REFEREES] {
        self.slate.decisions()
    }

    pub fn times(&self) -> [Option<Duration>; REFEREES] {
        self.slate.times()
    }

    pub fn slate(&self) -> &DecisionSlate {
        &self.slate
    }

    /// Merge one referee's vote.
    pub fn record(&mut self, referee: usize, decision: bool, at: Duration) -> Result<Evaluation, DecisionError> {
        self.slate.record(referee, decision, at)?;
        trace!(referee, decision, votes = self.slate.vote_count(), "referee vote");
        Ok(self.evaluate())
    }

    /// Replace the whole slate.
    pub fn record_all(&mut self, decisions: [Option<bool>; REFEREES], times: [Option<Duration>; REFEREES]) -> Evaluation {
        self.slate.replace(decisions, times);
        trace!(?decisions, "referee slate replaced");
        self.evaluate()
    }

    fn evaluate(&mut self) -> Evaluation {
        let majority = self.slate.majority();
        let completed = match self.phase {
            DecisionPhase::Collecting if self.slate.is_complete() => {
                let provisional = self.slate.good_count() >= crate::MAJORITY;
                self.phase = DecisionPhase::Settling { provisional };
                debug!(good_lift = provisional, "all referees voted");
                Some(provisional)
            }
            _ => None,
        };
        Evaluation { majority, completed }
    }

    /// End the settle delay: recount the slate (a referee may have changed
    /// their vote) and mark the decision applied. Returns `None` unless a
    /// decision was settling.
    pub fn settle(&mut self) -> Option<bool> {
        let DecisionPhase::Settling { provisional } = self.phase else {
            return None;
        };
        let good_lift = if self.slate.is_complete() {
            self.slate.good_count() >= crate::MAJORITY
        } else {
            provisional
        };
        self.phase = DecisionPhase::Finalized;
        Some(good_lift)
    }

    /// Single-voice decision, applied immediately.
    pub fn explicit(&mut self, success: bool, at: Duration) -> [Option<bool>; REFEREES] {
        self.slate.set_single(success, at);
        self.phase = DecisionPhase::Finalized;
        self.slate.decisions()
    }

    /// Start over for a new lift.
    pub fn reset(&mut self) {
        self.slate.clear();
        self.phase = DecisionPhase::Collecting;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    const T: Duration = Duration::from_millis(10);

    #[traced_test]
    #[test]
    fn test_majority_then_completion() {
        let mut agg = DecisionAggregator::new();

        let first = agg.record(0, true, T).unwrap();
        assert_eq!(first, Evaluation::default());

        let second = agg.record(1, true, T).unwrap();
        assert_eq!(second.majority, Some(true));
        assert_eq!(second.completed, None);

        let third = agg.record(2, false, T).unwrap();
        assert_eq!(third.completed, Some(true));
        assert_eq!(agg.phase(), DecisionPhase::Settling { provisional: true });
        assert!(logs_contain("all referees voted"));
    }

    #[test]
    fn test_completion_reported_once() {
        let mut agg = DecisionAggregator::new();
        agg.record_all([Some(false), Some(false), Some(true)], [Some(T); 3]);
        let again = agg.record(2, false, T).unwrap();
        assert_eq!(again.majority, Some(false));
        assert_eq!(again.completed, None);
    }

    #[test]
    fn test_settle_recounts_reversed_vote() {
        let mut agg = DecisionAggregator::new();
        agg.record_all([Some(true), Some(true), Some(false)], [Some(T); 3]);
        agg.record(1, false, T).unwrap();

        assert_eq!(agg.settle(), Some(false));
        assert_eq!(agg.phase(), DecisionPhase::Finalized);
        assert_eq!(agg.settle(), None);
    }

    #[test]
    fn test_explicit_and_reset() {
        let mut agg = DecisionAggregator::new();
        agg.record(0, false, T).unwrap();
        assert_eq!(agg.explicit(true, T), [None, Some(true), None]);
        assert_eq!(agg.phase(), DecisionPhase::Finalized);
        assert_eq!(agg.settle(), None);

        agg.reset();
        assert_eq!(agg.decisions(), [None; 3]);
        assert_eq!(agg.phase(), DecisionPhase::Collecting);
    }
}
