//! Referee slots.

use std::time::Duration;
use thiserror::Error;

/// Number of referees on a platform.
pub const REFEREES: usize = 3;

/// Agreeing votes needed for a decision.
pub const MAJORITY: usize = 2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecisionError {
    #[error("referee index {0} out of range (expected 0, 1 or 2)")]
    InvalidReferee(usize),
}

/// Three optional referee decisions (`true` = good lift) and the time each
/// was given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecisionSlate {
    decisions: [Option<bool>; REFEREES],
    times: [Option<Duration>; REFEREES],
}

impl DecisionSlate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one referee's decision, replacing any earlier one.
    pub fn record(&mut self, referee: usize, decision: bool, at: Duration) -> Result<(), DecisionError> {
        if referee >= REFEREES {
            return Err(DecisionError::InvalidReferee(referee));
        }
        self.decisions[referee] = Some(decision);
        self.times[referee] = Some(at);
        Ok(())
    }

    /// Replace all three slots.
    pub fn replace(&mut self, decisions: [Option<bool>; REFEREES], times: [Option<Duration>; REFEREES]) {
        self.decisions = decisions;
        self.times = times;
    }

    /// Single-voice decision: only the middle slot is set.
    pub fn set_single(&mut self, success: bool, at: Duration) {
        self.decisions = [None, Some(success), None];
        self.times = [None, Some(at), None];
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn decisions(&self) -> [Option<bool>; REFEREES] {
        self.decisions
    }

    pub fn times(&self) -> [Option<Duration>; REFEREES] {
        self.times
    }

    pub fn vote_count(&self) -> usize {
        self.decisions.iter().flatten().count()
    }

    pub fn good_count(&self) -> usize {
        self.decisions.iter().flatten().filter(|d| **d).count()
    }

    pub fn bad_count(&self) -> usize {
        self.decisions.iter().flatten().filter(|d| !**d).count()
    }

    pub fn is_complete(&self) -> bool {
        self.vote_count() == REFEREES
    }

    /// Direction of the majority once two votes agree.
    pub fn majority(&self) -> Option<bool> {
        if self.good_count() >= MAJORITY {
            Some(true)
        } else if self.bad_count() >= MAJORITY {
            Some(false)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slate(votes: [bool; 3]) -> DecisionSlate {
        let mut slate = DecisionSlate::new();
        for (referee, vote) in votes.into_iter().enumerate() {
            slate.record(referee, vote, Duration::from_millis(referee as u64)).unwrap();
        }
        slate
    }

    #[test]
    fn test_majority_of_three() {
        for good in [[true, true, false], [true, false, true], [false, true, true], [true, true, true]] {
            assert_eq!(slate(good).majority(), Some(true), "{good:?}");
        }
        for bad in [[false, false, true], [false, true, false], [true, false, false], [false, false, false]] {
            assert_eq!(slate(bad).majority(), Some(false), "{bad:?}");
        }
    }

    #[test]
    fn test_split_pair_has_no_majority() {
        let mut slate = DecisionSlate::new();
        slate.record(0, true, Duration::ZERO).unwrap();
        slate.record(2, false, Duration::ZERO).unwrap();
        assert_eq!(slate.majority(), None);
        assert!(!slate.is_complete());
    }

    #[test]
    fn test_invalid_referee_is_rejected() {
        let mut slate = DecisionSlate::new();
        assert_eq!(slate.record(3, true, Duration::ZERO), Err(DecisionError::InvalidReferee(3)));
        assert_eq!(slate.vote_count(), 0);
    }

    #[test]
    fn test_single_voice_uses_middle_slot() {
        let mut slate = slate([false, false, false]);
        slate.set_single(true, Duration::from_secs(1));
        assert_eq!(slate.decisions(), [None, Some(true), None]);
        assert_eq!(slate.times()[1], Some(Duration::from_secs(1)));
    }
}
