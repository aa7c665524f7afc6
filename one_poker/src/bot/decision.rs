//! The position-branched betting decision table.
//!
//! Everything here is deterministic given its inputs; the only random
//! ingredient, the aggression threshold, is drawn by the caller and
//! passed in. That keeps the table itself exactly testable while the
//! seat driver layers the intended bluff-avoidance variance on top.

use std::collections::HashMap;

use super::odds::{kelly_criterion, success_calc};
use crate::game::entities::{Action, Chips, PlayerId, Position, Value};

/// Upper bound of the uniform aggression threshold. An aggressive line
/// (raise or all-in) additionally requires the success probability to
/// beat a fresh draw from `[0, AGGRESSION_CEILING]`, so even a strong
/// seat sometimes just calls along.
pub const AGGRESSION_CEILING: f64 = 0.77;

/// Everything the decision table looks at. `pots` is the full per-player
/// pot map for the round, own contribution included; folded players'
/// contributions stay in it and keep counting toward the table maximum.
#[derive(Debug)]
pub struct DecisionInputs<'a> {
    pub seat: PlayerId,
    pub position: Position,
    /// Value of the card this seat committed face down.
    pub committed: Value,
    pub balance: Chips,
    pub pots: &'a HashMap<PlayerId, Chips>,
    /// Public estimate of copies left per value.
    pub expected_left: &'a HashMap<Value, f64>,
}

/// Pick an action for the given table state and aggression threshold.
///
/// The branches mirror the legality split of the betting loop: broke,
/// forced all-in-or-fold, at or ahead of parity, or behind with a call
/// available. Raises are always minimum raises: one chip over the table
/// maximum.
#[must_use]
pub fn decide(inputs: &DecisionInputs, threshold: f64) -> Action {
    let own = inputs.pots.get(&inputs.seat).copied().unwrap_or(0);
    let balance = inputs.balance;
    let opponents: Vec<Chips> = inputs
        .pots
        .iter()
        .filter(|&(&id, _)| id != inputs.seat)
        .map(|(_, &pot)| pot)
        .collect();
    let max_pot = inputs.pots.values().copied().max().unwrap_or(0);

    let p = success_calc(inputs.expected_left, inputs.committed);
    let stake = f64::from(balance + own);
    let odds = if max_pot > balance + own {
        // The stake cannot cover the table; size the edge against the
        // binding opponent contribution.
        let binding = opponents.iter().copied().max().unwrap_or(0);
        f64::from(binding) / stake
    } else {
        1.0
    };
    let max_bet = kelly_criterion(p, odds) * stake;
    let raise = Action::Raise(max_pot - own + 1);

    if balance == 0 {
        return Action::Check;
    }

    if opponents.iter().any(|&theirs| own + balance <= theirs) {
        // Matching the table takes everything; shove or give up.
        return match inputs.position {
            Position::Advantage | Position::Neutral => {
                if f64::from(own + balance) <= max_bet && p > threshold {
                    Action::AllIn
                } else {
                    Action::Fold
                }
            }
            Position::Disadvantage => Action::Fold,
        };
    }

    if opponents.iter().all(|&theirs| own >= theirs) {
        return match inputs.position {
            Position::Advantage | Position::Neutral => {
                if f64::from(own + 1) <= max_bet && p > threshold {
                    raise
                } else {
                    Action::Check
                }
            }
            Position::Disadvantage => Action::Check,
        };
    }

    // Behind, but able to call without going all-in.
    match inputs.position {
        Position::Advantage => {
            if f64::from(max_pot + 1) <= max_bet && p > threshold {
                raise
            } else {
                Action::Call
            }
        }
        Position::Disadvantage => Action::Fold,
        Position::Neutral => {
            if f64::from(max_pot + 1) <= max_bet && p > threshold {
                raise
            } else if p > threshold {
                Action::Call
            } else {
                Action::Fold
            }
        }
    }
}
