//! Domain types for the barbell field-of-play engine.
//!
//! This crate provides the data the session state machine and the ranking
//! engine operate on:
//!
//! - **Identifiers**: AthleteId, PlatformIndex
//! - **Registration data**: Athlete, Category, AgeGroup, Gender, Group
//! - **Results**: Attempt, Lift, LiftKind and the derived best lifts and total
//! - **Scoring**: Sinclair, category Sinclair, Robi and SMM formulas
//! - **Configuration**: CompetitionConfig, RankingType
//!
//! # Design Philosophy
//!
//! This crate does not depend on any other workspace crates, making it the
//! foundation layer. Lifecycle of athletes belongs to the persistence
//! collaborator; the engine only ever works on snapshots.

mod athlete;
mod category;
mod competition;
mod group;
mod identifiers;
mod scoring;

pub use athlete::{Athlete, Attempt, AttemptError, Lift, LiftKind, ATTEMPTS_PER_LIFT, TOTAL_ATTEMPTS};
pub use category::{
    compare_categories, compare_missing_last, AgeGroup, Category, Gender, OPEN_CATEGORY_LIMIT,
};
pub use competition::{CompetitionConfig, RankingType};
pub use group::{compare_session_time, Group};
pub use identifiers::{AthleteId, PlatformIndex};
pub use scoring::{
    meltzer_faber_factor, robi_points, sinclair_coefficient, ROBI_EXPONENT, SINCLAIR_MEN,
    SINCLAIR_WOMEN,
};

/// Test utilities.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils {
    use super::*;

    /// Create a registered male athlete in the 73 kg category, weighing
    /// 68.5 kg, with lot number equal to the seed and a first snatch
    /// declaration.
    pub fn test_athlete(seed: u64, snatch_declaration: u32) -> Athlete {
        let mut athlete = Athlete::new(
            AthleteId(seed),
            format!("Lifter{seed}"),
            format!("Test{seed}"),
            Gender::M,
        );
        athlete.body_weight = Some(68.5);
        athlete.category = Some(test_category());
        athlete.lot_number = Some(seed as u32);
        athlete.snatch[0].declaration = Some(snatch_declaration);
        athlete.clean_jerk[0].declaration = Some(snatch_declaration + 20);
        athlete
    }

    /// The category used by [`test_athlete`].
    pub fn test_category() -> Category {
        Category::new("M73", Gender::M, 67.0, 73.0)
    }

    /// Create an athlete who has finished all six attempts with the given
    /// best lifts. A best of 0 means three failed attempts for that lift.
    pub fn athlete_with_total(seed: u64, best_snatch: u32, best_clean_jerk: u32) -> Athlete {
        let mut athlete = test_athlete(seed, best_snatch.max(1));
        let mut sequence = seed * 10;
        for best in [best_snatch, best_clean_jerk] {
            athlete.declare(best.max(1)).expect("attempt available");
            for attempt in 0..ATTEMPTS_PER_LIFT {
                sequence += 1;
                if attempt == 0 && best > 0 {
                    athlete.successful_lift(sequence).expect("attempt available");
                } else {
                    athlete.failed_lift(sequence).expect("attempt available");
                }
            }
        }
        athlete
    }
}
