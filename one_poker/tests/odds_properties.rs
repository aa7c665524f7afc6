//! Property tests for the probability and wagering utilities.

use std::collections::HashMap;

use one_poker::bot::{kelly_criterion, success_calc};
use proptest::prelude::*;

fn arb_estimate() -> impl Strategy<Value = HashMap<u8, f64>> {
    prop::collection::vec(0.0f64..12.0, 13)
        .prop_map(|counts| (2u8..=14u8).zip(counts).collect())
}

proptest! {
    #[test]
    fn success_calc_stays_in_unit_interval(
        estimate in arb_estimate(),
        reference in 2u8..=14u8,
    ) {
        let p = success_calc(&estimate, reference);
        prop_assert!((0.0..=1.0).contains(&p), "p = {p}");
    }

    #[test]
    fn success_calc_empty_population_is_zero(reference in 2u8..=14u8) {
        let estimate: HashMap<u8, f64> = (2u8..=14u8).map(|v| (v, 0.0)).collect();
        prop_assert_eq!(success_calc(&estimate, reference), 0.0);
    }

    #[test]
    fn success_calc_monotone_in_reference_within_the_low_side(
        estimate in arb_estimate(),
    ) {
        // More low cards beneath you can only help.
        let mut last = 0.0f64;
        for reference in 3u8..=7u8 {
            let p = success_calc(&estimate, reference);
            prop_assert!(p >= last - 1e-12);
            last = p;
        }
    }

    #[test]
    fn kelly_never_exceeds_the_probability(
        p in 0.0f64..=1.0,
        odds in 0.1f64..10.0,
    ) {
        prop_assert!(kelly_criterion(p, odds) <= p + 1e-12);
    }
}
