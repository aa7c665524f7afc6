//! Round phase definitions for the One Poker FSM.
//!
//! Each state represents a specific phase of the round lifecycle.

use crate::game::state_machine::Outcome;

/// Dealing each seated player back up to two cards
#[derive(Debug)]
pub struct Deal {}

/// Counting high/low cards and assigning table positions
#[derive(Debug)]
pub struct RankHands {}

/// Collecting one face-down card from every seated player
#[derive(Debug)]
pub struct CommitCards {}

/// Collecting the unconditional ante from every seated player
#[derive(Debug)]
pub struct CollectAntes {}

/// Running the betting loop until contributions settle or one player is left
#[derive(Debug)]
pub struct TakeAction {}

/// Revealing committed cards and deciding the round winner
#[derive(Debug)]
pub struct ShowHands {}

/// Paying the pot to the winner, or refunding contributions on a tie
#[derive(Debug)]
pub struct DistributePot {}

/// Removing players whose balance reached zero
#[derive(Debug)]
pub struct BootPlayers {}

/// End-of-round bookkeeping: depletion estimate, board sweep, continue gate
#[derive(Debug)]
pub struct NextRound {}

/// Terminal state, reached when one player remains or the pile runs dry
#[derive(Debug)]
pub struct GameOver {
    pub outcome: Outcome,
}
