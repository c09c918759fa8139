//! Competition groups (sessions).

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A named cohort of athletes lifting together at a scheduled time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub competition_time: Option<NaiveDateTime>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            competition_time: None,
        }
    }

    pub fn at(mut self, time: NaiveDateTime) -> Self {
        self.competition_time = Some(time);
        self
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Order athletes' sessions by start time. A missing group or a group without
/// a scheduled time counts as the earliest possible session.
pub fn compare_session_time(a: Option<&Group>, b: Option<&Group>) -> Ordering {
    let a = a.and_then(|g| g.competition_time);
    let b = b.and_then(|g| g.competition_time);
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
