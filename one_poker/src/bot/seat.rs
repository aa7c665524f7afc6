//! The algorithmic seat driver.

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::decision::{AGGRESSION_CEILING, DecisionInputs, decide};
use crate::game::entities::{Action, Card, PlayerId, Position, TableView};
use crate::seat::{ActionPrompt, CommitPrompt, SeatDriver, SeatError, Update};

/// Plays a seat from the same information a person at the table would
/// have: the pushed table snapshots, the card it committed itself, and
/// the prompts. It never sees the pile or anyone's hand.
pub struct BotSeat {
    seat: PlayerId,
    rng: StdRng,
    committed: Option<Card>,
    view: Option<TableView>,
}

impl BotSeat {
    #[must_use]
    pub fn new(seat: PlayerId) -> Self {
        let seed = rand::rng().random();
        Self::with_seed(seat, seed)
    }

    /// Deterministic construction for reproducible games.
    #[must_use]
    pub fn with_seed(seat: PlayerId, seed: u64) -> Self {
        Self {
            seat,
            rng: StdRng::seed_from_u64(seed),
            committed: None,
            view: None,
        }
    }

    fn position(&self) -> Position {
        self.view
            .as_ref()
            .and_then(|view| view.players.iter().find(|player| player.id == self.seat))
            .map(|player| player.position)
            .unwrap_or_default()
    }

    /// Safest legal answer when the table state is missing.
    fn fallback(prompt: &ActionPrompt) -> Action {
        if prompt.choices.contains(&Action::Check) {
            Action::Check
        } else {
            Action::Fold
        }
    }
}

impl SeatDriver for BotSeat {
    fn act(&mut self, prompt: &ActionPrompt) -> Result<Action, SeatError> {
        let (Some(view), Some(committed)) = (self.view.as_ref(), self.committed) else {
            warn!("seat {}: no table snapshot yet, playing it safe", self.seat);
            return Ok(Self::fallback(prompt));
        };
        let inputs = DecisionInputs {
            seat: self.seat,
            position: self.position(),
            committed: committed.value(),
            balance: prompt.balances.get(&self.seat).copied().unwrap_or(0),
            pots: &prompt.pots,
            expected_left: &view.expected_left,
        };
        let threshold = f64::from(self.rng.random_range(0..=77u32)) / 100.0;
        debug_assert!(threshold <= AGGRESSION_CEILING);
        let action = decide(&inputs, threshold);
        debug!(
            "seat {}: {:?} with a {} committed picks {action:?}",
            self.seat, inputs.position, committed
        );
        Ok(action)
    }

    fn commit(&mut self, prompt: &CommitPrompt) -> Result<usize, SeatError> {
        let [first, second] = prompt.cards;
        let lower = if first.value() <= second.value() { 0 } else { 1 };
        // Strong or hopeless hands bank the better card for later;
        // mixed hands play it now.
        let index = match self.position() {
            Position::Advantage | Position::Disadvantage => lower,
            Position::Neutral => 1 - lower,
        };
        self.committed = Some(prompt.cards[index]);
        Ok(index)
    }

    fn observe(&mut self, update: &Update) {
        if let Update::View(view) = update {
            self.view = Some(view.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::{PlayerView, SlotView, Suit};
    use std::collections::HashMap;

    fn view_with_position(seat: PlayerId, position: Position) -> TableView {
        TableView {
            round: 1,
            cards_left: 70,
            expected_left: (2..=14).map(|value| (value, 6.0)).collect(),
            players: vec![PlayerView {
                id: seat,
                name: "P0".to_string(),
                balance: 10,
                pot: 0,
                high: 0,
                low: 0,
                position,
                slot: SlotView::Empty,
                seated: true,
                in_round: true,
            }],
            discards: Vec::new(),
        }
    }

    #[test]
    fn test_advantage_commits_the_lower_card() {
        let mut bot = BotSeat::with_seed(0, 3);
        bot.observe(&Update::View(view_with_position(0, Position::Advantage)));
        let prompt = CommitPrompt {
            seat: 0,
            cards: [Card(12, Suit::Club), Card(9, Suit::Heart)],
        };
        assert_eq!(bot.commit(&prompt).unwrap(), 1);
        assert_eq!(bot.committed, Some(Card(9, Suit::Heart)));
    }

    #[test]
    fn test_neutral_commits_the_higher_card() {
        let mut bot = BotSeat::with_seed(0, 3);
        bot.observe(&Update::View(view_with_position(0, Position::Neutral)));
        let prompt = CommitPrompt {
            seat: 0,
            cards: [Card(4, Suit::Club), Card(11, Suit::Heart)],
        };
        assert_eq!(bot.commit(&prompt).unwrap(), 1);
        assert_eq!(bot.committed, Some(Card(11, Suit::Heart)));
    }

    #[test]
    fn test_disadvantage_banks_the_better_low_card() {
        let mut bot = BotSeat::with_seed(0, 3);
        bot.observe(&Update::View(view_with_position(0, Position::Disadvantage)));
        let prompt = CommitPrompt {
            seat: 0,
            cards: [Card(3, Suit::Club), Card(6, Suit::Heart)],
        };
        assert_eq!(bot.commit(&prompt).unwrap(), 0);
    }

    #[test]
    fn test_acting_blind_falls_back_to_a_safe_action() {
        let mut bot = BotSeat::with_seed(0, 3);
        let prompt = ActionPrompt {
            seat: 0,
            choices: [crate::game::entities::ActionChoice::Check].into(),
            pots: HashMap::from([(0, 1), (1, 1)]),
            balances: HashMap::from([(0, 9), (1, 9)]),
        };
        assert_eq!(bot.act(&prompt).unwrap(), Action::Check);
    }
}
