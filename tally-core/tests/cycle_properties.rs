use proptest::prelude::*;
use tally_core::{CreditCardCycle, CycleStatus, MonthLength, classify_cycle, days_since_cutoff};

fn day() -> impl Strategy<Value = i32> {
    1..=31i32
}

proptest! {
    #[test]
    fn days_since_cutoff_stays_within_a_month(cutoff in 1..=30i32, today in day()) {
        prop_assume!(today != cutoff);
        let since = days_since_cutoff(today, cutoff, MonthLength::default());
        prop_assert!((1..=30).contains(&since), "today {} cutoff {}: {}", today, cutoff, since);
    }

    #[test]
    fn cutoff_day_always_wins(cutoff in day(), payment in day()) {
        prop_assert_eq!(classify_cycle(cutoff, cutoff, payment), CycleStatus::CutoffToday);
    }

    #[test]
    fn classification_is_deterministic(today in day(), cutoff in day(), payment in day()) {
        prop_assert_eq!(
            classify_cycle(today, cutoff, payment),
            classify_cycle(today, cutoff, payment)
        );
    }

    #[test]
    fn payloads_stay_in_their_windows(today in day(), cutoff in day(), payment in day()) {
        match classify_cycle(today, cutoff, payment) {
            CycleStatus::CutoffToday => prop_assert_eq!(today, cutoff),
            CycleStatus::OptimalWindow { days_since_cutoff } => {
                prop_assert!((1..=7).contains(&days_since_cutoff));
            }
            CycleStatus::PaymentImminent { days_remaining } => {
                prop_assert!((0..=5).contains(&days_remaining));
            }
            CycleStatus::AwaitingCutoff { days_remaining } => {
                prop_assert!(today != cutoff);
                prop_assert!((0..=30).contains(&days_remaining));
            }
        }
    }

    #[test]
    fn window_counts_up_after_cutoff(cutoff in 1..=30i32, payment in day()) {
        for offset in 1..=7 {
            let today = (cutoff - 1 + offset) % 30 + 1;
            prop_assert_eq!(
                classify_cycle(today, cutoff, payment),
                CycleStatus::OptimalWindow { days_since_cutoff: offset }
            );
        }
    }

    #[test]
    fn optimal_window_beats_imminent_payment(cutoff in 1..=30i32, offset in 1..=5i32) {
        // Payment sits within 5 days of a day that is also inside the window.
        let today = (cutoff - 1 + offset) % 30 + 1;
        let payment = today % 30 + 1;
        prop_assert_eq!(
            classify_cycle(today, cutoff, payment),
            CycleStatus::OptimalWindow { days_since_cutoff: offset }
        );
    }
}

#[test]
fn documented_scenarios() {
    let card = CreditCardCycle::new(5, 20).unwrap();
    assert_eq!(card.status_on(5), CycleStatus::CutoffToday);
    assert_eq!(card.status_on(8), CycleStatus::OptimalWindow { days_since_cutoff: 3 });
    assert_eq!(card.status_on(17), CycleStatus::PaymentImminent { days_remaining: 3 });
    assert_eq!(card.status_on(28), CycleStatus::AwaitingCutoff { days_remaining: 7 });

    assert_eq!(classify_cycle(1, 28, 3), CycleStatus::OptimalWindow { days_since_cutoff: 3 });
    assert_eq!(classify_cycle(9, 10, 8), CycleStatus::AwaitingCutoff { days_remaining: 1 });
}

#[test]
fn day_31_cutoff_seen_from_day_1_is_not_a_window() {
    // (1 + 30) - 31 = 0: the fixed 30-day month never reaches the window here.
    assert_eq!(classify_cycle(1, 31, 20), CycleStatus::AwaitingCutoff { days_remaining: 30 });
}
