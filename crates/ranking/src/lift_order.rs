//! Lifting order and display order.

use barbell_types::{compare_categories, compare_missing_last, Athlete};
use std::cmp::Ordering;

/// Phase of the competition an athlete is in: snatch, clean & jerk, or done.
fn lift_phase(athlete: &Athlete) -> u8 {
    match athlete.next_attempt() {
        Some((barbell_types::LiftKind::Snatch, _)) => 0,
        Some((barbell_types::LiftKind::CleanJerk, _)) => 1,
        None => 2,
    }
}

/// Lifting-order comparator.
///
/// Ties are broken in this sequence:
/// 1. lift phase: athletes still in the snatch go before clean & jerk, finished athletes last
/// 2. requested weight, lighter first
/// 3. attempt number, lower first
/// 4. for a second or third attempt, whoever took the previous attempt first
/// 5. lot number, lower first
///
/// The athlete id closes the cascade so that the order is total.
pub fn compare_lift_order(a: &Athlete, b: &Athlete) -> Ordering {
    lift_phase(a)
        .cmp(&lift_phase(b))
        .then_with(|| {
            a.next_attempt_requested_weight()
                .cmp(&b.next_attempt_requested_weight())
        })
        .then_with(|| a.attempts_done().cmp(&b.attempts_done()))
        .then_with(|| compare_progression(a, b))
        .then_with(|| compare_missing_last(a.lot_number.as_ref(), b.lot_number.as_ref()))
        .then_with(|| a.id.cmp(&b.id))
}

/// Same weight on a later attempt: the athlete who lifted earlier goes first.
fn compare_progression(a: &Athlete, b: &Athlete) -> Ordering {
    if a.attempt_number() == 1 || a.is_finished() {
        return Ordering::Equal;
    }
    a.last_lift_sequence().cmp(&b.last_lift_sequence())
}

/// Sort athletes in lifting order and number them 1..=n.
pub fn lifting_order(athletes: &mut [Athlete]) {
    athletes.sort_by(compare_lift_order);
    for (position, athlete) in athletes.iter_mut().enumerate() {
        athlete.lift_order_rank = position as u32 + 1;
    }
}

/// Lifting order of a copy of the athletes.
pub fn lifting_order_copy(athletes: &[Athlete]) -> Vec<Athlete> {
    let mut sorted = athletes.to_vec();
    lifting_order(&mut sorted);
    sorted
}

/// Scoreboard order: category, then lot number.
pub fn compare_display_order(a: &Athlete, b: &Athlete) -> Ordering {
    compare_categories(a.category.as_ref(), b.category.as_ref())
        .then_with(|| compare_missing_last(a.lot_number.as_ref(), b.lot_number.as_ref()))
        .then_with(|| a.id.cmp(&b.id))
}

pub fn display_order(athletes: &mut [Athlete]) {
    athletes.sort_by(compare_display_order);
}

pub fn display_order_copy(athletes: &[Athlete]) -> Vec<Athlete> {
    let mut sorted = athletes.to_vec();
    display_order(&mut sorted);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use barbell_types::test_utils::{test_athlete, test_category};
    use barbell_types::{AthleteId, Category, Gender};
    use proptest::prelude::*;

    fn ids(athletes: &[Athlete]) -> Vec<u64> {
        athletes.iter().map(|a| a.id.0).collect()
    }

    #[test]
    fn test_lighter_request_lifts_first() {
        let athletes = vec![test_athlete(1, 105), test_athlete(2, 98), test_athlete(3, 101)];
        let sorted = lifting_order_copy(&athletes);
        assert_eq!(ids(&sorted), vec![2, 3, 1]);
        assert_eq!(sorted[0].lift_order_rank, 1);
        assert_eq!(sorted[2].lift_order_rank, 3);
    }

    #[test]
    fn test_same_weight_first_attempt_uses_lot_number() {
        let mut a = test_athlete(1, 100);
        a.lot_number = Some(14);
        let mut b = test_athlete(2, 100);
        b.lot_number = Some(3);
        assert_eq!(ids(&lifting_order_copy(&[a, b])), vec![2, 1]);
    }

    #[test]
    fn test_lower_attempt_number_first_at_same_weight() {
        let mut second = test_athlete(1, 99);
        second.successful_lift(1).unwrap();
        second.change_weight(100).unwrap();
        let first = test_athlete(2, 100);

        assert_eq!(ids(&lifting_order_copy(&[second, first])), vec![2, 1]);
    }

    #[test]
    fn test_earlier_lifter_goes_first_on_later_attempts() {
        let mut early = test_athlete(5, 100);
        early.failed_lift(1).unwrap();
        let mut late = test_athlete(2, 100);
        late.failed_lift(2).unwrap();

        // lot number would favour `late`; progression wins
        assert_eq!(ids(&lifting_order_copy(&[late, early])), vec![5, 2]);
    }

    #[test]
    fn test_clean_jerk_after_snatch_and_finished_last() {
        let mut finished = test_athlete(1, 60);
        let mut in_cj = test_athlete(2, 60);
        for seq in 0..6 {
            finished.failed_lift(seq).unwrap();
        }
        for seq in 10..13 {
            in_cj.successful_lift(seq).unwrap();
        }
        let snatching = test_athlete(3, 140);

        assert_eq!(ids(&lifting_order_copy(&[finished, in_cj, snatching])), vec![3, 2, 1]);
    }

    #[test]
    fn test_display_order_by_category_then_lot() {
        let mut heavy = test_athlete(1, 100);
        heavy.category = Some(Category::new("M81", Gender::M, 73.0, 81.0));
        heavy.lot_number = Some(1);
        let mut light = test_athlete(2, 100);
        light.category = Some(test_category());
        light.lot_number = Some(9);
        let mut light_low_lot = test_athlete(3, 100);
        light_low_lot.lot_number = Some(4);

        assert_eq!(ids(&display_order_copy(&[heavy, light, light_low_lot])), vec![3, 2, 1]);
    }

    fn arbitrary_athlete() -> impl Strategy<Value = (u32, usize, u32)> {
        (40u32..200, 0usize..7, 1u32..50)
    }

    proptest! {
        #[test]
        fn lifting_order_is_a_stable_total_order(specs in prop::collection::vec(arbitrary_athlete(), 1..20)) {
            let athletes: Vec<Athlete> = specs
                .iter()
                .enumerate()
                .map(|(i, (weight, done, lot))| {
                    let mut athlete = test_athlete(i as u64, *weight);
                    athlete.id = AthleteId(i as u64);
                    athlete.lot_number = Some(*lot);
                    for seq in 0..*done {
                        athlete.successful_lift(seq as u64 + 100 * i as u64).unwrap();
                    }
                    athlete
                })
                .collect();

            let once = lifting_order_copy(&athletes);
            let twice = lifting_order_copy(&once);
            let mut reversed = athletes.clone();
            reversed.reverse();
            let from_reversed = lifting_order_copy(&reversed);

            prop_assert_eq!(ids(&once), ids(&twice));
            prop_assert_eq!(ids(&once), ids(&from_reversed));
            for pair in once.windows(2) {
                prop_assert_ne!(compare_lift_order(&pair[0], &pair[1]), Ordering::Greater);
            }
        }
    }
}
