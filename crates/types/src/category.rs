//! Gender, age groups and bodyweight categories.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Competition gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Gender {
    F,
    M,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::F => write!(f, "F"),
            Gender::M => write!(f, "M"),
        }
    }
}

/// An age bracket (e.g. a masters band such as M45: 45..=49).
///
/// Ordered by gender, then minimum age, then maximum age.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgeGroup {
    pub gender: Option<Gender>,
    pub min_age: u32,
    pub max_age: u32,
    pub code: String,
}

impl AgeGroup {
    pub fn new(code: impl Into<String>, gender: Option<Gender>, min_age: u32, max_age: u32) -> Self {
        Self {
            gender,
            min_age,
            max_age,
            code: code.into(),
        }
    }
}

/// Upper weight limits at or above this value denote an open (+) category.
pub const OPEN_CATEGORY_LIMIT: f64 = 998.0;

/// A bodyweight category within an age group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub code: String,
    pub gender: Gender,
    pub age_group: Option<AgeGroup>,
    pub minimum_weight: f64,
    pub maximum_weight: f64,
    /// Reference total used by the Robi formula.
    pub world_record: Option<u32>,
}

impl Category {
    pub fn new(code: impl Into<String>, gender: Gender, minimum_weight: f64, maximum_weight: f64) -> Self {
        Self {
            code: code.into(),
            gender,
            age_group: None,
            minimum_weight,
            maximum_weight,
            world_record: None,
        }
    }

    pub fn with_age_group(mut self, age_group: AgeGroup) -> Self {
        self.age_group = Some(age_group);
        self
    }

    pub fn with_world_record(mut self, total: u32) -> Self {
        self.world_record = Some(total);
        self
    }

    pub fn is_open(&self) -> bool {
        self.maximum_weight >= OPEN_CATEGORY_LIMIT
    }

    /// Category ordering: gender, then age group (missing last), then upper
    /// weight limit.
    pub fn compare(&self, other: &Category) -> Ordering {
        self.gender
            .cmp(&other.gender)
            .then_with(|| compare_missing_last(self.age_group.as_ref(), other.age_group.as_ref()))
            .then_with(|| self.maximum_weight.total_cmp(&other.maximum_weight))
    }

    /// Whether both categories denote the same bracket.
    pub fn same_bracket(&self, other: &Category) -> bool {
        self.compare(other) == Ordering::Equal && self.code == other.code
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)
    }
}

/// Compare two optional values, with `None` sorting after every `Some`.
pub fn compare_missing_last<T: Ord>(a: Option<&T>, b: Option<&T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Category comparison over optional categories, missing categories last.
pub fn compare_categories(a: Option<&Category>, b: Option<&Category>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.compare(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_order() {
        let w55 = Category::new("F55", Gender::F, 49.0, 55.0);
        let m61 = Category::new("M61", Gender::M, 55.0, 61.0);
        let m67 = Category::new("M67", Gender::M, 61.0, 67.0);

        assert_eq!(w55.compare(&m61), Ordering::Less);
        assert_eq!(m67.compare(&m61), Ordering::Greater);
        assert_eq!(compare_categories(None, Some(&m61)), Ordering::Greater);
    }

    #[test]
    fn test_age_group_breaks_before_weight() {
        let m35 = AgeGroup::new("M35", Some(Gender::M), 35, 39);
        let m40 = AgeGroup::new("M40", Some(Gender::M), 40, 44);
        let heavy_young = Category::new("M35-109", Gender::M, 102.0, 109.0).with_age_group(m35);
        let light_old = Category::new("M40-61", Gender::M, 55.0, 61.0).with_age_group(m40);

        assert_eq!(heavy_young.compare(&light_old), Ordering::Less);
    }
}
