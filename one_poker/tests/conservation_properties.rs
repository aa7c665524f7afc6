//! Chip conservation under arbitrary legal play.
//!
//! Seats here pick blindly from whatever the engine offers them, so the
//! games wander through folds, raise wars, all-ins, ties, and
//! eliminations. However a game goes, chips must neither appear nor
//! disappear at any published snapshot.

use std::sync::{Arc, Mutex};

use one_poker::entities::ActionChoice;
use one_poker::seat::{ActionPrompt, CommitPrompt, SeatDriver, SeatError, Update};
use one_poker::{Action, Chips, GameConfig, OnePokerState};
use proptest::prelude::*;

/// Answers every prompt by indexing its script into the offered
/// choices. Always legal, never thoughtful.
struct IndexSeat {
    picks: Vec<u8>,
    cursor: usize,
    updates: Arc<Mutex<Vec<Update>>>,
}

impl IndexSeat {
    fn next_pick(&mut self) -> usize {
        let pick = self.picks[self.cursor % self.picks.len()];
        self.cursor += 1;
        pick as usize
    }
}

impl SeatDriver for IndexSeat {
    fn act(&mut self, prompt: &ActionPrompt) -> Result<Action, SeatError> {
        let choices = &prompt.choices.0;
        let choice = choices[self.next_pick() % choices.len()];
        Ok(match choice {
            ActionChoice::AllIn => Action::AllIn,
            ActionChoice::Call(_) => Action::Call,
            ActionChoice::Check => Action::Check,
            ActionChoice::Fold => Action::Fold,
            // The advertised minimum is always a legal raise.
            ActionChoice::Raise(min) => Action::Raise(min),
        })
    }

    fn commit(&mut self, _prompt: &CommitPrompt) -> Result<usize, SeatError> {
        Ok(self.next_pick() % 2)
    }

    fn observe(&mut self, update: &Update) {
        if matches!(update, Update::View(_)) {
            self.updates.lock().unwrap().push(update.clone());
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn chips_are_conserved_under_arbitrary_play(
        seed in any::<u64>(),
        scripts in prop::collection::vec(
            prop::collection::vec(0u8..5, 1..32),
            2..5,
        ),
    ) {
        let updates = Arc::new(Mutex::new(Vec::new()));
        let players = scripts.len();
        let seats: Vec<(String, Box<dyn SeatDriver>)> = scripts
            .into_iter()
            .enumerate()
            .map(|(id, picks)| {
                let driver: Box<dyn SeatDriver> = Box::new(IndexSeat {
                    picks,
                    cursor: 0,
                    updates: Arc::clone(&updates),
                });
                (format!("P{id}"), driver)
            })
            .collect();

        let state = OnePokerState::with_seed(GameConfig::default(), seats, seed);
        state.run().unwrap();

        let total = players as Chips * GameConfig::default().starting_balance;
        let updates = updates.lock().unwrap();
        for update in updates.iter() {
            if let Update::View(view) = update {
                let balances: Chips = view.players.iter().map(|p| p.balance).sum();
                let pots: Chips = view.players.iter().map(|p| p.pot).sum();
                prop_assert_eq!(balances + pots, total);
            }
        }
    }
}
