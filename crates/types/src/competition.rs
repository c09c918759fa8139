//! Competition-wide settings and ranking kinds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Competition-wide rules that influence ordering and ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompetitionConfig {
    /// Masters rules: rank by gender and age group before category.
    pub masters: bool,
    /// Lighter bodyweight wins ties (pre-2017 rule).
    pub use_old_bodyweight_tie_break: bool,
    /// Rank within the registration category instead of the bodyweight category.
    pub use_registration_category: bool,
    /// Sinclair rankings use the category upper limit instead of bodyweight.
    pub use_category_sinclair: bool,
    /// Year used to compute age for the SMM formula.
    pub competition_year: i32,
}

impl Default for CompetitionConfig {
    fn default() -> Self {
        Self {
            masters: false,
            use_old_bodyweight_tie_break: false,
            use_registration_category: false,
            use_category_sinclair: false,
            competition_year: 2024,
        }
    }
}

impl CompetitionConfig {
    pub fn masters() -> Self {
        Self {
            masters: true,
            ..Self::default()
        }
    }

    pub fn with_old_bodyweight_tie_break(mut self) -> Self {
        self.use_old_bodyweight_tie_break = true;
        self
    }
}

/// Which result an ordering ranks, and which rank/points slot it writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RankingType {
    Snatch,
    CleanJerk,
    Total,
    Custom,
    Robi,
    Sinclair,
    CategorySinclair,
    BodyweightSinclair,
    Smm,
    Combined,
}

impl RankingType {
    pub const COUNT: usize = 10;

    pub const ALL: [RankingType; Self::COUNT] = [
        RankingType::Snatch,
        RankingType::CleanJerk,
        RankingType::Total,
        RankingType::Custom,
        RankingType::Robi,
        RankingType::Sinclair,
        RankingType::CategorySinclair,
        RankingType::BodyweightSinclair,
        RankingType::Smm,
        RankingType::Combined,
    ];

    /// Slot of this ranking in per-athlete rank tables.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Rankings computed across categories, reset only by gender.
    pub fn is_cross_category(self) -> bool {
        matches!(
            self,
            RankingType::Robi
                | RankingType::Sinclair
                | RankingType::CategorySinclair
                | RankingType::BodyweightSinclair
                | RankingType::Smm
        )
    }
}

impl fmt::Display for RankingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RankingType::Snatch => "Snatch",
            RankingType::CleanJerk => "CleanJerk",
            RankingType::Total => "Total",
            RankingType::Custom => "Custom",
            RankingType::Robi => "Robi",
            RankingType::Sinclair => "Sinclair",
            RankingType::CategorySinclair => "CategorySinclair",
            RankingType::BodyweightSinclair => "BodyweightSinclair",
            RankingType::Smm => "SMM",
            RankingType::Combined => "Combined",
        };
        write!(f, "{name}")
    }
}
