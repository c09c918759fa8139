//! Lot numbers, start numbers and lift counts.

use crate::lift_order::compare_display_order;
use barbell_types::{Athlete, ATTEMPTS_PER_LIFT};
use rand::seq::SliceRandom;
use rand::Rng;

/// Draw lot numbers 1..=n in random order.
///
/// Seeded generators give reproducible draws.
pub fn draw_lots<R: Rng + ?Sized>(athletes: &mut [Athlete], rng: &mut R) {
    let mut lots: Vec<u32> = (1..=athletes.len() as u32).collect();
    lots.shuffle(rng);
    for (athlete, lot) in athletes.iter_mut().zip(lots) {
        athlete.lot_number = Some(lot);
    }
}

/// Number athletes 1..=n in display order (category, then lot number).
/// The slice itself keeps its order.
pub fn assign_start_numbers(athletes: &mut [Athlete]) {
    let mut positions: Vec<usize> = (0..athletes.len()).collect();
    positions.sort_by(|&a, &b| compare_display_order(&athletes[a], &athletes[b]));
    for (number, index) in positions.into_iter().enumerate() {
        athletes[index].start_number = Some(number as u32 + 1);
    }
}

/// Attempts taken in the lift currently under way.
///
/// Counts clean & jerk attempts once any athlete has started the clean &
/// jerk or every snatch has been taken, snatch attempts otherwise.
pub fn count_lifts_done(athletes: &[Athlete]) -> usize {
    let snatches: usize = athletes.iter().map(Athlete::snatch_attempts_done).sum();
    let clean_jerks: usize = athletes.iter().map(Athlete::clean_jerk_attempts_done).sum();
    if clean_jerks > 0 || snatches >= athletes.len() * ATTEMPTS_PER_LIFT {
        clean_jerks
    } else {
        snatches
    }
}
