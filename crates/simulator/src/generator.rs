//! Seeded generation of a weighed-in group.

use barbell_ranking::{assign_start_numbers, draw_lots};
use barbell_types::{Athlete, AthleteId, Category, Gender};
use rand::seq::SliceRandom;
use rand::Rng;

const LAST_NAMES: &[&str] = &[
    "Alvarez", "Brandt", "Costa", "Dubois", "Eriksen", "Fischer", "Garcia", "Horvat", "Ivanova",
    "Jensen", "Kowalski", "Laurent", "Moreau", "Novak", "Olsen", "Petrov", "Rossi", "Silva",
    "Tanaka", "Varga",
];

const FIRST_NAMES_M: &[&str] = &["Adam", "Bruno", "Carlos", "David", "Emil", "Felix", "Hugo", "Ivan"];
const FIRST_NAMES_F: &[&str] = &["Ana", "Bea", "Clara", "Dana", "Elena", "Freya", "Greta", "Ines"];

const TEAMS: &[&str] = &["North", "South", "East", "West"];

/// Bodyweight categories drawn from, with the first snatch range for each.
fn categories() -> [(Category, u32, u32); 4] {
    [
        (Category::new("M67", Gender::M, 61.0, 67.0), 95, 125),
        (Category::new("M73", Gender::M, 67.0, 73.0), 105, 140),
        (Category::new("F59", Gender::F, 55.0, 59.0), 65, 90),
        (Category::new("F64", Gender::F, 59.0, 64.0), 70, 95),
    ]
}

/// Generate `count` weighed-in athletes with first declarations, lot
/// numbers and start numbers. Ids run from 1.
pub fn generate_group<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Athlete> {
    let categories = categories();
    let mut athletes: Vec<Athlete> = (1..=count as u64)
        .map(|id| {
            let (category, low, high) = &categories[rng.gen_range(0..categories.len())];
            let gender = category.gender;
            let first_names = match gender {
                Gender::M => FIRST_NAMES_M,
                Gender::F => FIRST_NAMES_F,
            };
            let mut athlete = Athlete::new(
                AthleteId(id),
                LAST_NAMES.choose(rng).copied().unwrap_or("Smith"),
                first_names.choose(rng).copied().unwrap_or("Sam"),
                gender,
            );

            // one decimal, inside the category
            let tenths = rng.gen_range(
                (category.minimum_weight * 10.0) as u32 + 1..=(category.maximum_weight * 10.0) as u32,
            );
            athlete.body_weight = Some(f64::from(tenths) / 10.0);
            athlete.year_of_birth = Some(rng.gen_range(1985..=2006));
            athlete.team = TEAMS.choose(rng).map(|t| t.to_string());
            athlete.category = Some(category.clone());

            let snatch = rng.gen_range(*low..=*high);
            athlete.snatch[0].declaration = Some(snatch);
            athlete.clean_jerk[0].declaration = Some(snatch + rng.gen_range(15..=35));
            athlete
        })
        .collect();

    draw_lots(&mut athletes, rng);
    assign_start_numbers(&mut athletes);
    athletes
}
