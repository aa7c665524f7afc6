//! One Poker round engine.
//!
//! The engine is a typestate FSM: a [`Game`] parameterized over the phase
//! structs in [`super::states`], wrapped in the [`OnePokerState`] enum.
//! Each [`OnePokerState::step`] runs one phase to completion and hands
//! back the next state. Seats are driven through the [`SeatDriver`]
//! contract, so the engine suspends exactly where a decision is needed
//! and nowhere else.

use enum_dispatch::enum_dispatch;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use thiserror::Error;

use super::entities::{
    Action, ActionChoice, ActionChoices, Card, Chips, Deck, Gameboard, Player, PlayerId, PlayerView,
    Position, SlotView, TableView, Value,
};
use super::states::{
    BootPlayers, CollectAntes, CommitCards, Deal, DistributePot, GameOver, NextRound, RankHands,
    ShowHands, TakeAction,
};
use crate::seat::{ActionPrompt, CommitPrompt, SeatDriver, SeatError, Update};

/// Errors that end a game early. Rule violations never show up here:
/// an illegal raise is re-requested, not propagated.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("seat {seat} ({name}) dropped out of the game: {source}")]
    Seat {
        seat: PlayerId,
        name: String,
        source: SeatError,
    },
}

/// Events that occur during gameplay, pushed to every seat as part of
/// the display-state stream.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum GameEvent {
    RoundStarted { round: u32, cards_left: usize },
    CardCommitted { name: String },
    Acted { name: String, action: Action },
    Revealed { name: String, card: Card },
    RoundWon { name: String },
    RoundTied,
    Eliminated { name: String },
    DeckExhausted,
    GameWon { name: String },
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::RoundStarted { round, cards_left } => {
                format!("round {round} ({cards_left} cards left)")
            }
            Self::CardCommitted { name } => format!("{name} sets a card face down"),
            Self::Acted { name, action } => format!("{name} {action}"),
            Self::Revealed { name, card } => format!("{name} shows {card}"),
            Self::RoundWon { name } => format!("{name} wins the round"),
            Self::RoundTied => "all players tie".to_string(),
            Self::Eliminated { name } => format!("{name} is out of chips"),
            Self::DeckExhausted => "no cards left to draw, the game ends in a tie".to_string(),
            Self::GameWon { name } => format!("{name} wins the game"),
        };
        write!(f, "{repr}")
    }
}

/// How a finished game ended.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Outcome {
    /// Last player left with chips.
    Champion(PlayerId),
    /// The pile could not cover another draw phase; nobody wins.
    DeckExhausted,
}

/// Game configuration settings.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GameConfig {
    /// Copies of the 52-card deck shuffled together before the cut.
    pub subdecks: usize,
    /// Divisor for the cut: only `1/split` of the shuffled cards are kept.
    pub split: usize,
    /// Unconditional contribution collected from every seated player at
    /// round start.
    pub ante: Chips,
    pub starting_balance: Chips,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new(3, 2, 1, 10)
    }
}

impl GameConfig {
    #[must_use]
    pub const fn new(subdecks: usize, split: usize, ante: Chips, starting_balance: Chips) -> Self {
        Self {
            subdecks,
            split,
            ante,
            starting_balance,
        }
    }
}

/// Classify a hand against the opposition. Pure function of the current
/// round's high-card counts, recomputed from scratch every round.
#[must_use]
pub fn classify(own_high: u8, opponent_highs: &[u8]) -> Position {
    if own_high == 2 && opponent_highs.iter().all(|&high| high == 0) {
        Position::Advantage
    } else if own_high == 0 && opponent_highs.iter().all(|&high| high >= 1) {
        Position::Disadvantage
    } else {
        Position::Neutral
    }
}

/// Pick the showdown winner from the revealed values of the players
/// still in the round, or `None` for a tie.
///
/// The winner must hold a value strictly above every other contender.
/// One upset overrides that: when the strict maximum is an ace and
/// exactly one deuce is among the contenders, the deuce takes the round.
/// With two or more deuces the upset is spoiled and the ace stands.
fn showdown_winner(contenders: &[(PlayerId, Value)]) -> Option<PlayerId> {
    let (best_id, best_value) = *contenders.iter().max_by_key(|&&(_, value)| value)?;
    let strict = contenders
        .iter()
        .filter(|(_, value)| *value == best_value)
        .count()
        == 1;
    if !strict {
        return None;
    }
    if best_value == 14 {
        let deuces: Vec<PlayerId> = contenders
            .iter()
            .filter(|(_, value)| *value == 2)
            .map(|(id, _)| *id)
            .collect();
        if let [holder] = deuces[..] {
            return Some(holder);
        }
    }
    Some(best_id)
}

/// Mutable game data shared across all states.
pub struct GameData {
    /// Draw pile. Instantiated once; cards leave it for good.
    pub(super) deck: Deck,
    pub(super) board: Gameboard,
    pub(super) players: Vec<Player>,
    /// Seated players in acting order. The previous round's winner is
    /// moved to the front.
    pub(super) turn_order: Vec<PlayerId>,
    /// Players still contesting the current round.
    pub(super) round_players: Vec<PlayerId>,
    pub(super) seats: HashMap<PlayerId, Box<dyn SeatDriver>>,
    pub(super) winner: Option<PlayerId>,
    pub(super) round: u32,
    /// Stack of game events drained into the display stream whenever
    /// the table state is published.
    pub(super) events: VecDeque<GameEvent>,
    pub(super) config: GameConfig,
    pub(super) rng: StdRng,
}

impl GameData {
    fn new(config: GameConfig, seats: Vec<(String, Box<dyn SeatDriver>)>, mut rng: StdRng) -> Self {
        let deck = Deck::new(config.subdecks, config.split, &mut rng);
        let mut players = Vec::with_capacity(seats.len());
        let mut seat_map = HashMap::with_capacity(seats.len());
        for (id, (name, seat)) in seats.into_iter().enumerate() {
            players.push(Player::new(id, name, config.starting_balance));
            seat_map.insert(id, seat);
        }
        let mut turn_order: Vec<PlayerId> = (0..players.len()).collect();
        turn_order.shuffle(&mut rng);
        let board = Gameboard::new(turn_order.iter().copied());
        Self {
            deck,
            board,
            players,
            turn_order,
            round_players: Vec::new(),
            seats: seat_map,
            winner: None,
            round: 0,
            events: VecDeque::new(),
            config,
            rng,
        }
    }

    fn build_view(&self) -> TableView {
        let players = self
            .players
            .iter()
            .map(|player| {
                let slot = match self.board.committed(player.id) {
                    None => SlotView::Empty,
                    Some(card) if self.board.is_revealed() => SlotView::FaceUp(card),
                    Some(_) => SlotView::FaceDown,
                };
                PlayerView {
                    id: player.id,
                    name: player.name.clone(),
                    balance: player.balance,
                    pot: self.board.contribution(player.id),
                    high: player.high,
                    low: player.low,
                    position: player.position,
                    slot,
                    seated: self.turn_order.contains(&player.id),
                    in_round: self.round_players.contains(&player.id),
                }
            })
            .collect();
        TableView {
            round: self.round,
            cards_left: self.deck.len(),
            expected_left: self.deck.expected_left().clone(),
            players,
            discards: self.board.discards().to_vec(),
        }
    }

    /// Drain pending events into the display stream, then push a fresh
    /// table snapshot to every seat.
    fn publish(&mut self) {
        while let Some(event) = self.events.pop_front() {
            info!("{event}");
            let update = Update::Event(event);
            for seat in self.seats.values_mut() {
                seat.observe(&update);
            }
        }
        let update = Update::View(self.build_view());
        for seat in self.seats.values_mut() {
            seat.observe(&update);
        }
    }

    /// The legal subset of actions for a seat, from the same comparisons
    /// the algorithmic seat branches on. Contributions of folded players
    /// stay in the pot map and keep counting toward the table maximum.
    pub(super) fn legal_choices(&self, id: PlayerId) -> ActionChoices {
        let own = self.board.contribution(id);
        let balance = self.players[id].balance;
        let deficit = self.board.max_bet().saturating_sub(own);
        let opponents: Vec<Chips> = self
            .turn_order
            .iter()
            .filter(|&&other| other != id)
            .map(|&other| self.board.contribution(other))
            .collect();

        if balance == 0 {
            [ActionChoice::Check].into()
        } else if opponents.iter().any(|&theirs| own + balance <= theirs) {
            // Matching the table would take the whole balance or more.
            [ActionChoice::AllIn, ActionChoice::Fold].into()
        } else if opponents.iter().all(|&theirs| own >= theirs) {
            [
                ActionChoice::Raise(deficit + 1),
                ActionChoice::Check,
                ActionChoice::Fold,
            ]
            .into()
        } else {
            [
                ActionChoice::Call(deficit),
                ActionChoice::Raise(deficit + 1),
                ActionChoice::Fold,
            ]
            .into()
        }
    }

    /// Check a seat's answer against the rules. Raises below the call
    /// amount or above the balance are rejected for a new attempt, never
    /// clamped. A raise of the entire balance is an all-in.
    fn validate(&self, id: PlayerId, choices: &ActionChoices, action: Action) -> Result<Action, String> {
        if !choices.contains(&action) {
            return Err(format!("{action:?} is not among the legal actions"));
        }
        if let Action::Raise(amount) = action {
            let deficit = self.board.max_bet() - self.board.contribution(id);
            let balance = self.players[id].balance;
            if amount <= deficit {
                return Err(format!(
                    "a raise must exceed the {deficit} needed to match the table"
                ));
            }
            if amount > balance {
                return Err(format!("a raise of {amount} exceeds the balance of {balance}"));
            }
            if amount == balance {
                return Ok(Action::AllIn);
            }
        }
        Ok(action)
    }

    fn apply_action(&mut self, id: PlayerId, action: Action) {
        match action {
            Action::Check => {}
            Action::Fold => {
                self.round_players.retain(|&other| other != id);
            }
            Action::Call => {
                let deficit = self.board.max_bet() - self.board.contribution(id);
                let paid = self.players[id].bet(deficit);
                self.board.add_bet(id, paid);
            }
            Action::Raise(amount) => {
                let paid = self.players[id].bet(amount);
                self.board.add_bet(id, paid);
            }
            Action::AllIn => {
                let balance = self.players[id].balance;
                let paid = self.players[id].bet(balance);
                self.board.add_bet(id, paid);
            }
        }
        let name = self.players[id].name.clone();
        debug!("{name} {action}, pot at {}", self.board.total());
        self.events.push_back(GameEvent::Acted { name, action });
        self.publish();
    }

    fn seat_act(&mut self, id: PlayerId, prompt: &ActionPrompt) -> Result<Action, EngineError> {
        let name = self.players[id].name.clone();
        let Some(seat) = self.seats.get_mut(&id) else {
            unreachable!("every player id has a seat driver");
        };
        seat.act(prompt).map_err(|source| EngineError::Seat {
            seat: id,
            name,
            source,
        })
    }

    fn seat_commit(&mut self, id: PlayerId, prompt: &CommitPrompt) -> Result<usize, EngineError> {
        let name = self.players[id].name.clone();
        let Some(seat) = self.seats.get_mut(&id) else {
            unreachable!("every player id has a seat driver");
        };
        seat.commit(prompt).map_err(|source| EngineError::Seat {
            seat: id,
            name,
            source,
        })
    }

    fn seat_continue(&mut self, id: PlayerId) -> Result<(), EngineError> {
        let name = self.players[id].name.clone();
        let Some(seat) = self.seats.get_mut(&id) else {
            unreachable!("every player id has a seat driver");
        };
        seat.await_continue().map_err(|source| EngineError::Seat {
            seat: id,
            name,
            source,
        })
    }
}

/// A One Poker game: shared data plus the current phase.
pub struct Game<T> {
    pub(super) data: GameData,
    pub(super) state: T,
}

impl<T> Game<T> {
    fn advance<U>(self, state: U) -> Game<U> {
        Game {
            data: self.data,
            state,
        }
    }

    fn finish(mut self, outcome: Outcome) -> OnePokerState {
        match outcome {
            Outcome::Champion(id) => {
                let name = self.data.players[id].name.clone();
                info!("{name} wins the game after {} rounds", self.data.round);
                self.data.events.push_back(GameEvent::GameWon { name });
            }
            Outcome::DeckExhausted => {
                info!("pile exhausted after {} rounds, game tied", self.data.round);
                self.data.events.push_back(GameEvent::DeckExhausted);
            }
        }
        self.data.publish();
        OnePokerState::GameOver(self.advance(GameOver { outcome }))
    }
}

/// Read access shared by every phase.
#[enum_dispatch]
pub trait TableState {
    /// Snapshot of the public table state.
    fn view(&self) -> TableView;
    fn config(&self) -> &GameConfig;
}

impl<T> TableState for Game<T> {
    fn view(&self) -> TableView {
        self.data.build_view()
    }

    fn config(&self) -> &GameConfig {
        &self.data.config
    }
}

/// The round engine FSM. `step` runs one phase; `run` loops to a
/// terminal outcome.
#[enum_dispatch(TableState)]
pub enum OnePokerState {
    Deal(Game<Deal>),
    RankHands(Game<RankHands>),
    CommitCards(Game<CommitCards>),
    CollectAntes(Game<CollectAntes>),
    TakeAction(Game<TakeAction>),
    ShowHands(Game<ShowHands>),
    DistributePot(Game<DistributePot>),
    BootPlayers(Game<BootPlayers>),
    NextRound(Game<NextRound>),
    GameOver(Game<GameOver>),
}

impl OnePokerState {
    #[must_use]
    pub fn new(config: GameConfig, seats: Vec<(String, Box<dyn SeatDriver>)>) -> Self {
        let seed = rand::rng().random();
        Self::with_seed(config, seats, seed)
    }

    /// Deterministic construction for reproducible games.
    #[must_use]
    pub fn with_seed(
        config: GameConfig,
        seats: Vec<(String, Box<dyn SeatDriver>)>,
        seed: u64,
    ) -> Self {
        let data = GameData::new(config, seats, StdRng::seed_from_u64(seed));
        Self::Deal(Game {
            data,
            state: Deal {},
        })
    }

    /// Run the current phase and return the next state. `GameOver` is a
    /// fixed point.
    pub fn step(self) -> Result<Self, EngineError> {
        match self {
            Self::Deal(game) => game.deal(),
            Self::RankHands(game) => game.rank_hands(),
            Self::CommitCards(game) => game.commit_cards(),
            Self::CollectAntes(game) => game.collect_antes(),
            Self::TakeAction(game) => game.take_action(),
            Self::ShowHands(game) => game.show_hands(),
            Self::DistributePot(game) => game.distribute_pot(),
            Self::BootPlayers(game) => game.boot_players(),
            Self::NextRound(game) => game.next_round(),
            Self::GameOver(game) => Ok(Self::GameOver(game)),
        }
    }

    /// Drive the FSM until the game ends.
    pub fn run(mut self) -> Result<Outcome, EngineError> {
        loop {
            match self {
                Self::GameOver(game) => return Ok(game.state.outcome),
                other => self = other.step()?,
            }
        }
    }

    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            Self::GameOver(game) => Some(game.state.outcome),
            _ => None,
        }
    }
}

impl Game<Deal> {
    fn deal(mut self) -> Result<OnePokerState, EngineError> {
        // Rounds after the first are gated in NextRound; this covers a
        // config whose cut leaves less than one full draw in the pile.
        let needed = 2 * self.data.turn_order.len();
        if self.data.deck.len() < needed {
            return Ok(self.finish(Outcome::DeckExhausted));
        }

        self.data.round += 1;
        self.data.winner = None;
        self.data.round_players = self.data.turn_order.clone();
        self.data.events.push_back(GameEvent::RoundStarted {
            round: self.data.round,
            cards_left: self.data.deck.len(),
        });
        for id in self.data.turn_order.clone() {
            while self.data.players[id].hand.len() < 2 {
                let Some(card) = self.data.deck.draw() else {
                    unreachable!("pile size was checked before the draw phase");
                };
                self.data.players[id].hand.push(card);
            }
        }
        self.data.publish();
        Ok(OnePokerState::RankHands(self.advance(RankHands {})))
    }
}

impl Game<RankHands> {
    fn rank_hands(mut self) -> Result<OnePokerState, EngineError> {
        for id in self.data.turn_order.clone() {
            self.data.players[id].rank_hand();
        }
        for id in self.data.turn_order.clone() {
            let opponent_highs: Vec<u8> = self
                .data
                .turn_order
                .iter()
                .filter(|&&other| other != id)
                .map(|&other| self.data.players[other].high)
                .collect();
            let position = classify(self.data.players[id].high, &opponent_highs);
            self.data.players[id].position = position;
            debug!(
                "{}: {} high / {} low, {position}",
                self.data.players[id].name, self.data.players[id].high, self.data.players[id].low
            );
        }
        self.data.publish();
        Ok(OnePokerState::CommitCards(self.advance(CommitCards {})))
    }
}

impl Game<CommitCards> {
    fn commit_cards(mut self) -> Result<OnePokerState, EngineError> {
        for id in self.data.turn_order.clone() {
            let prompt = CommitPrompt {
                seat: id,
                cards: [self.data.players[id].hand[0], self.data.players[id].hand[1]],
            };
            let index = loop {
                let index = self.data.seat_commit(id, &prompt)?;
                if index < 2 {
                    break index;
                }
                warn!(
                    "{}: card index {index} out of range, asking again",
                    self.data.players[id].name
                );
            };
            let card = self.data.players[id].hand.remove(index);
            self.data.board.commit(id, card);
            self.data.events.push_back(GameEvent::CardCommitted {
                name: self.data.players[id].name.clone(),
            });
            self.data.publish();
        }
        Ok(OnePokerState::CollectAntes(self.advance(CollectAntes {})))
    }
}

impl Game<CollectAntes> {
    fn collect_antes(mut self) -> Result<OnePokerState, EngineError> {
        let ante = self.data.config.ante;
        for id in self.data.turn_order.clone() {
            let paid = self.data.players[id].bet(ante);
            self.data.board.add_bet(id, paid);
        }
        self.data.round_players = self.data.turn_order.clone();
        debug!("antes collected, pot at {}", self.data.board.total());
        self.data.publish();
        Ok(OnePokerState::TakeAction(self.advance(TakeAction {})))
    }
}

impl Game<TakeAction> {
    fn take_action(mut self) -> Result<OnePokerState, EngineError> {
        let mut acted = false;
        loop {
            let max = self.data.board.max_bet();
            let unsettled = self.data.round_players.iter().any(|&id| {
                self.data.board.contribution(id) != max && self.data.players[id].balance > 0
            });
            if acted && !unsettled {
                break;
            }
            for id in self.data.round_players.clone() {
                if self.data.round_players.len() == 1 {
                    break;
                }
                self.act_once(id)?;
                acted = true;
            }
            if let [sole] = self.data.round_players[..] {
                self.data.winner = Some(sole);
                break;
            }
        }
        Ok(OnePokerState::ShowHands(self.advance(ShowHands {})))
    }

    fn act_once(&mut self, id: PlayerId) -> Result<(), EngineError> {
        assert!(
            self.data.turn_order.contains(&id) && self.data.round_players.contains(&id),
            "action requested for a player who is not in the round"
        );
        let choices = self.data.legal_choices(id);
        let prompt = ActionPrompt {
            seat: id,
            choices: choices.clone(),
            pots: self.data.board.bets().clone(),
            balances: self
                .data
                .turn_order
                .iter()
                .map(|&other| (other, self.data.players[other].balance))
                .collect(),
        };
        let action = loop {
            let answer = self.data.seat_act(id, &prompt)?;
            match self.data.validate(id, &choices, answer) {
                Ok(action) => break action,
                Err(reason) => warn!(
                    "{}: rejected {answer:?} ({reason}), asking again",
                    self.data.players[id].name
                ),
            }
        };
        self.data.apply_action(id, action);
        Ok(())
    }
}

impl Game<ShowHands> {
    fn show_hands(mut self) -> Result<OnePokerState, EngineError> {
        self.data.board.reveal();
        for id in self.data.turn_order.clone() {
            let Some(card) = self.data.board.committed(id) else {
                unreachable!("every seated player committed a card this round");
            };
            self.data.events.push_back(GameEvent::Revealed {
                name: self.data.players[id].name.clone(),
                card,
            });
        }

        // A betting loop that ended with a sole survivor already decided
        // the round; the comparison is skipped entirely.
        if self.data.winner.is_none() {
            let contenders: Vec<(PlayerId, Value)> = self
                .data
                .round_players
                .iter()
                .map(|&id| {
                    let Some(card) = self.data.board.committed(id) else {
                        unreachable!("every seated player committed a card this round");
                    };
                    (id, card.value())
                })
                .collect();
            self.data.winner = showdown_winner(&contenders);
        }

        match self.data.winner {
            Some(id) => {
                let name = self.data.players[id].name.clone();
                self.data.events.push_back(GameEvent::RoundWon { name });
                self.data.turn_order.retain(|&other| other != id);
                self.data.turn_order.insert(0, id);
            }
            None => self.data.events.push_back(GameEvent::RoundTied),
        }
        self.data.publish();
        Ok(OnePokerState::DistributePot(self.advance(DistributePot {})))
    }
}

impl Game<DistributePot> {
    fn distribute_pot(mut self) -> Result<OnePokerState, EngineError> {
        match self.data.winner {
            Some(id) => {
                let pot = self.data.board.total();
                self.data.players[id].balance += pot;
                debug!("{} collects the pot of {pot}", self.data.players[id].name);
            }
            None => {
                // Full refund of each contributor's own bets, folded
                // players included.
                let refunds: Vec<(PlayerId, Chips)> = self
                    .data
                    .board
                    .bets()
                    .iter()
                    .map(|(&id, &amount)| (id, amount))
                    .collect();
                for (id, amount) in refunds {
                    self.data.players[id].balance += amount;
                }
            }
        }
        self.data.board.settle();
        self.data.publish();
        Ok(OnePokerState::BootPlayers(self.advance(BootPlayers {})))
    }
}

impl Game<BootPlayers> {
    fn boot_players(mut self) -> Result<OnePokerState, EngineError> {
        let booted: Vec<PlayerId> = self
            .data
            .turn_order
            .iter()
            .copied()
            .filter(|&id| self.data.players[id].balance == 0)
            .collect();
        for id in booted {
            self.data.turn_order.retain(|&other| other != id);
            self.data.round_players.retain(|&other| other != id);
            self.data.board.remove_player(id);
            self.data.events.push_back(GameEvent::Eliminated {
                name: self.data.players[id].name.clone(),
            });
        }
        self.data.publish();
        Ok(OnePokerState::NextRound(self.advance(NextRound {})))
    }
}

impl Game<NextRound> {
    fn next_round(mut self) -> Result<OnePokerState, EngineError> {
        // The depletion estimate moves once per round, by the values that
        // hit the table, whether or not their owners are still seated.
        let revealed: Vec<Value> = self
            .data
            .board
            .committed_cards()
            .values()
            .map(Card::value)
            .collect();
        for value in revealed {
            self.data.deck.spend(value);
        }
        self.data.board.clear();

        if self.data.turn_order.len() < 2 {
            let Some(&champion) = self.data.turn_order.first() else {
                unreachable!("a round always leaves at least one player with chips");
            };
            return Ok(self.finish(Outcome::Champion(champion)));
        }
        if self.data.deck.len() < 2 * self.data.turn_order.len() {
            return Ok(self.finish(Outcome::DeckExhausted));
        }

        for id in self.data.turn_order.clone() {
            self.data.seat_continue(id)?;
        }
        Ok(OnePokerState::Deal(self.advance(Deal {})))
    }
}
