//! Win-probability and wagering math for the algorithmic seat.

use std::collections::HashMap;

use crate::game::entities::{HIGH_BOUNDARY, Value};

/// Estimate the probability that a hidden opposing card ranks below
/// `reference`, given the public estimate of copies left per value.
///
/// The opposing card is assumed to come from `reference`'s own side of
/// the high/low boundary: `population` is the estimated copies on that
/// side, `bigger_than` the copies strictly between the boundary and
/// `reference`. Two edges bend the rule for the deuce/ace upset: an ace
/// folds the estimated deuce count into its loss side, and a deuce wins
/// against exactly the estimated aces.
///
/// Returns a value in `[0, 1]`, and exactly 0 when the population term
/// is 0.
#[must_use]
pub fn success_calc(available: &HashMap<Value, f64>, reference: Value) -> f64 {
    let same_side = |value: Value| {
        if reference > HIGH_BOUNDARY {
            value > HIGH_BOUNDARY
        } else {
            value <= HIGH_BOUNDARY
        }
    };
    let population: f64 = available
        .iter()
        .filter(|&(&value, _)| same_side(value))
        .map(|(_, &copies)| copies)
        .sum();
    let bigger_than: f64 = available
        .iter()
        .filter(|&(&value, _)| same_side(value) && value < reference)
        .map(|(_, &copies)| copies)
        .sum();
    let aces = available.get(&14).copied().unwrap_or(0.0);
    let deuces = available.get(&2).copied().unwrap_or(0.0);

    if reference == 14 {
        let population = population + deuces;
        if population > 0.0 { bigger_than / population } else { 0.0 }
    } else if reference == 2 {
        let population = population + aces;
        if population > 0.0 { aces / population } else { 0.0 }
    } else if population > 0.0 {
        bigger_than / population
    } else {
        0.0
    }
}

/// Simplified betting edge: `p - (1 - p) / odds`.
///
/// Used only as an upper cap on what the algorithmic seat is willing to
/// put in the pot, never as an exact stake fraction. Can go negative;
/// a negative cap simply forbids every aggressive line.
#[must_use]
pub fn kelly_criterion(success_probability: f64, odds: f64) -> f64 {
    success_probability - ((1.0 - success_probability) / odds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::{MAX_VALUE, MIN_VALUE};

    fn fresh_estimate() -> HashMap<Value, f64> {
        (MIN_VALUE..=MAX_VALUE).map(|value| (value, 6.0)).collect()
    }

    #[test]
    fn test_lowest_of_a_side_never_wins_the_side() {
        let available = fresh_estimate();
        // Nothing on the high side ranks below an 8.
        assert_eq!(success_calc(&available, 8), 0.0);
    }

    #[test]
    fn test_high_side_ratio() {
        let available = fresh_estimate();
        // A king beats 8..=12: 30 of 42 high cards.
        let p = success_calc(&available, 13);
        assert!((p - 30.0 / 42.0).abs() < 1e-9);
    }

    #[test]
    fn test_low_side_ratio() {
        let available = fresh_estimate();
        // A 7 beats 2..=6: 30 of 36 low cards.
        let p = success_calc(&available, 7);
        assert!((p - 30.0 / 36.0).abs() < 1e-9);
    }

    #[test]
    fn test_ace_pays_for_the_deuce_exposure() {
        let available = fresh_estimate();
        // 36 beaten high cards out of 42 high plus 6 deuces.
        let p = success_calc(&available, 14);
        assert!((p - 36.0 / 48.0).abs() < 1e-9);
    }

    #[test]
    fn test_deuce_wins_exactly_against_aces() {
        let available = fresh_estimate();
        // 6 aces against 36 low cards plus those aces.
        let p = success_calc(&available, 2);
        assert!((p - 6.0 / 42.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_population_is_zero() {
        let available: HashMap<Value, f64> =
            (MIN_VALUE..=MAX_VALUE).map(|value| (value, 0.0)).collect();
        for reference in MIN_VALUE..=MAX_VALUE {
            assert_eq!(success_calc(&available, reference), 0.0);
        }
    }

    #[test]
    fn test_certainty_when_only_losers_remain() {
        let mut available = fresh_estimate();
        available.insert(14, 0.0);
        available.insert(2, 0.0);
        // Every remaining high card loses to the ace.
        assert_eq!(success_calc(&available, 14), 1.0);
    }

    #[test]
    fn test_kelly_even_odds() {
        assert!((kelly_criterion(0.6, 1.0) - 0.2).abs() < 1e-9);
        assert_eq!(kelly_criterion(0.5, 1.0), 0.0);
    }

    #[test]
    fn test_kelly_longer_odds_tolerate_lower_probability() {
        assert!((kelly_criterion(0.5, 2.0) - 0.25).abs() < 1e-9);
        assert!(kelly_criterion(0.2, 1.0) < 0.0);
    }
}
