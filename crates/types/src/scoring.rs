//! Bodyweight- and age-normalized scoring formulas.
//!
//! - **Sinclair**: total scaled by a bodyweight coefficient (2020 coefficients).
//! - **Category Sinclair**: Sinclair computed at the category upper limit.
//! - **Robi**: total relative to the category world record, on a 1000-point scale.
//! - **SMM**: Sinclair multiplied by the Meltzer-Faber masters age factor.

use crate::{Athlete, Gender};

/// Sinclair coefficients `(A, B)` for men.
pub const SINCLAIR_MEN: (f64, f64) = (0.722762521, 193.609);

/// Sinclair coefficients `(A, B)` for women.
pub const SINCLAIR_WOMEN: (f64, f64) = (0.787004341, 153.757);

/// Robi exponent: `log2(10)`, so that a world-record total scores 1000.
pub const ROBI_EXPONENT: f64 = 3.321928095;

/// Meltzer-Faber age factors from age 30 upwards.
const MELTZER_FABER: [f64; 61] = [
    1.000, 1.016, 1.031, 1.046, 1.059, 1.072, 1.083, 1.096, 1.109, 1.122, // 30-39
    1.135, 1.149, 1.162, 1.176, 1.189, 1.203, 1.218, 1.233, 1.248, 1.263, // 40-49
    1.279, 1.297, 1.316, 1.338, 1.361, 1.385, 1.411, 1.437, 1.462, 1.488, // 50-59
    1.514, 1.541, 1.568, 1.598, 1.629, 1.663, 1.699, 1.738, 1.779, 1.823, // 60-69
    1.867, 1.910, 1.953, 2.004, 2.060, 2.117, 2.181, 2.250, 2.326, 2.410, // 70-79
    2.502, 2.603, 2.715, 2.839, 2.975, 3.126, 3.292, 3.475, 3.677, 3.900, // 80-89
    4.145, // 90
];

/// Sinclair coefficient for a bodyweight. Athletes at or above the reference
/// bodyweight get 1.0.
pub fn sinclair_coefficient(gender: Gender, body_weight: f64) -> f64 {
    let (a, b) = match gender {
        Gender::M => SINCLAIR_MEN,
        Gender::F => SINCLAIR_WOMEN,
    };
    if body_weight <= 0.0 {
        return 0.0;
    }
    if body_weight >= b {
        return 1.0;
    }
    let exponent = a * (body_weight / b).log10().powi(2);
    10f64.powf(exponent)
}

/// Meltzer-Faber age factor; 1.0 below 30, capped at the last tabulated age.
pub fn meltzer_faber_factor(age: u32) -> f64 {
    if age < 30 {
        return 1.0;
    }
    let index = ((age - 30) as usize).min(MELTZER_FABER.len() - 1);
    MELTZER_FABER[index]
}

/// Robi points for a total given the reference world record.
pub fn robi_points(total: u32, world_record: u32) -> f64 {
    if total == 0 || world_record == 0 {
        return 0.0;
    }
    1000.0 * (f64::from(total) / f64::from(world_record)).powf(ROBI_EXPONENT)
}

impl Athlete {
    fn sinclair_of(&self, total: u32, body_weight: Option<f64>) -> f64 {
        match body_weight {
            Some(bw) if total > 0 => f64::from(total) * sinclair_coefficient(self.gender, bw),
            _ => 0.0,
        }
    }

    /// Sinclair score from actual bodyweight.
    pub fn sinclair(&self) -> f64 {
        self.sinclair_of(self.total(), self.body_weight)
    }

    /// Tentative Sinclair while the total is not yet established: best
    /// snatch and best clean & jerk so far, without the zero-total rule.
    pub fn sinclair_for_delta(&self) -> f64 {
        self.sinclair_of(self.best_snatch() + self.best_clean_jerk(), self.body_weight)
    }

    /// Sinclair computed at the category upper limit. Open categories and
    /// athletes above their limit use actual bodyweight.
    pub fn category_sinclair(&self) -> f64 {
        let reference = match (&self.category, self.body_weight) {
            (Some(cat), Some(bw)) if !cat.is_open() && bw <= cat.maximum_weight => Some(cat.maximum_weight),
            (_, bw) => bw,
        };
        self.sinclair_of(self.total(), reference)
    }

    /// Robi score against the category world record.
    pub fn robi(&self) -> f64 {
        self.category
            .as_ref()
            .and_then(|c| c.world_record)
            .map_or(0.0, |wr| robi_points(self.total(), wr))
    }

    /// Sinclair-Meltzer-Malone: Sinclair times the masters age factor.
    pub fn smm(&self, competition_year: i32) -> f64 {
        let factor = self.age(competition_year).map_or(1.0, meltzer_faber_factor);
        self.sinclair() * factor
    }
}
