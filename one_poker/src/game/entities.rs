use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fmt,
    hash::{Hash, Hasher},
    mem::discriminant,
};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Club,
    Spade,
    Diamond,
    Heart,
}

impl Suit {
    pub const ALL: [Self; 4] = [Self::Club, Self::Spade, Self::Diamond, Self::Heart];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "♣",
            Self::Spade => "♠",
            Self::Diamond => "♦",
            Self::Heart => "♥",
        };
        write!(f, "{repr}")
    }
}

/// Placeholder for card values.
pub type Value = u8;

pub const MIN_VALUE: Value = 2;
pub const MAX_VALUE: Value = 14;

/// Boundary between low and high cards. Values above it are high.
pub const HIGH_BOUNDARY: Value = 7;

/// Whether a card sits in the high half (8-A) or the low half (2-7)
/// of the value range. Hand composition in terms of this split drives
/// table position each round.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Ranking {
    High,
    Low,
}

impl Ranking {
    #[must_use]
    pub const fn of(value: Value) -> Self {
        if value > HIGH_BOUNDARY {
            Self::High
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for Ranking {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::High => "High",
            Self::Low => "Low",
        };
        write!(f, "{repr}")
    }
}

/// A card is a tuple of a uInt8 value (2u8 ... ace=14u8) and a suit.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub Value, pub Suit);

impl Card {
    #[must_use]
    pub const fn value(&self) -> Value {
        self.0
    }

    #[must_use]
    pub const fn ranking(&self) -> Ranking {
        Ranking::of(self.0)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let value = match self.0 {
            11 => "J",
            12 => "Q",
            13 => "K",
            14 => "A",
            v => &v.to_string(),
        };
        write!(f, "{}{value}", self.1)
    }
}

/// Type alias for whole chips. All bets and player balances are represented
/// as whole chips (there's no point arguing over fractions of an ante).
pub type Chips = u32;

/// Stable small-integer player identifier. Every per-player mapping is
/// keyed by this rather than by the player object itself.
pub type PlayerId = usize;

/// The draw pile plus the public estimate of what is left in it.
///
/// Construction shuffles `subdecks` copies of all 52 cards once, then keeps
/// only the first `total / split` of them. The cut is a deliberate scarcity
/// rule: the remainder never enters play, so counting cards can never be
/// exact. `expected_left` starts at `subdecks * 4 / split` copies per value
/// and is decremented once per round by the values revealed at showdown.
/// It is an estimate of the pile, not a mirror of it, and the two are
/// allowed to diverge.
#[derive(Clone, Debug)]
pub struct Deck {
    cards: Vec<Card>,
    expected_left: HashMap<Value, f64>,
}

impl Deck {
    #[must_use]
    pub fn new<R: Rng>(subdecks: usize, split: usize, rng: &mut R) -> Self {
        let mut cards = Vec::with_capacity(52 * subdecks);
        for suit in Suit::ALL {
            for value in MIN_VALUE..=MAX_VALUE {
                for _ in 0..subdecks {
                    cards.push(Card(value, suit));
                }
            }
        }
        cards.shuffle(rng);
        cards.truncate(cards.len() / split);
        let per_value = (4 * subdecks) as f64 / split as f64;
        let expected_left = (MIN_VALUE..=MAX_VALUE)
            .map(|value| (value, per_value))
            .collect();
        Self {
            cards,
            expected_left,
        }
    }

    /// Remove and return the top card. Cards leave the pile permanently;
    /// there is no reshuffle.
    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// The public per-value estimate of cards still in the pile.
    #[must_use]
    pub fn expected_left(&self) -> &HashMap<Value, f64> {
        &self.expected_left
    }

    /// Mark one copy of `value` as seen at showdown. The counter floors
    /// at zero; it never goes negative even when the estimate has already
    /// drifted below the truth.
    pub fn spend(&mut self, value: Value) {
        if let Some(copies) = self.expected_left.get_mut(&value) {
            *copies = (*copies - 1.0).max(0.0);
        }
    }
}

/// Table position from hand composition, recomputed every round.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum Position {
    Advantage,
    Disadvantage,
    #[default]
    Neutral,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Advantage => "advantage",
            Self::Disadvantage => "disadvantage",
            Self::Neutral => "neutral",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub hand: Vec<Card>,
    pub balance: Chips,
    pub high: u8,
    pub low: u8,
    pub position: Position,
}

impl Player {
    #[must_use]
    pub fn new(id: PlayerId, name: String, balance: Chips) -> Self {
        Self {
            id,
            name,
            hand: Vec::with_capacity(2),
            balance,
            high: 0,
            low: 0,
            position: Position::Neutral,
        }
    }

    /// Count the high and low cards currently in hand.
    pub fn rank_hand(&mut self) {
        self.high = self
            .hand
            .iter()
            .filter(|card| card.ranking() == Ranking::High)
            .count() as u8;
        self.low = self.hand.len() as u8 - self.high;
    }

    /// Move `amount` of the balance toward the pot, clamped to what the
    /// player actually has. Returns the amount moved.
    pub fn bet(&mut self, amount: Chips) -> Chips {
        let amount = amount.min(self.balance);
        self.balance -= amount;
        amount
    }
}

/// One betting decision. A raise carries the total amount the player adds
/// this action (the call portion plus the increase).
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Action {
    AllIn,
    Call,
    Check,
    Fold,
    Raise(Chips),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::AllIn => "all-ins".to_string(),
            Self::Call => "calls".to_string(),
            Self::Check => "checks".to_string(),
            Self::Fold => "folds".to_string(),
            Self::Raise(amount) => format!("raises {amount}"),
        };
        write!(f, "{repr}")
    }
}

/// An action offered to a seat, annotated with the amount it implies:
/// a call carries its exact cost, a raise the minimum total that counts
/// as a raise.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub enum ActionChoice {
    AllIn,
    Call(Chips),
    Check,
    Fold,
    Raise(Chips),
}

impl fmt::Display for ActionChoice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::AllIn => "all-in".to_string(),
            Self::Call(amount) => format!("call (== {amount})"),
            Self::Check => "check".to_string(),
            Self::Fold => "fold".to_string(),
            Self::Raise(amount) => format!("raise (>= {amount})"),
        };
        write!(f, "{repr}")
    }
}

// Legality checks compare variants only; the amounts inside `Call` and
// `Raise` are advisory for the seat. Raise amounts are validated
// separately when the response comes back.
impl Eq for ActionChoice {}

impl Hash for ActionChoice {
    fn hash<H: Hasher>(&self, state: &mut H) {
        discriminant(self).hash(state);
    }
}

impl PartialEq for ActionChoice {
    fn eq(&self, other: &Self) -> bool {
        discriminant(self) == discriminant(other)
    }
}

/// The legal subset of actions for one decision.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ActionChoices(pub Vec<ActionChoice>);

impl ActionChoices {
    #[must_use]
    pub fn contains(&self, action: &Action) -> bool {
        let choice: ActionChoice = match action {
            Action::AllIn => ActionChoice::AllIn,
            Action::Call => ActionChoice::Call(0),
            Action::Check => ActionChoice::Check,
            Action::Fold => ActionChoice::Fold,
            Action::Raise(_) => ActionChoice::Raise(0),
        };
        self.0.contains(&choice)
    }
}

impl fmt::Display for ActionChoices {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let num_options = self.0.len();
        let repr = self
            .0
            .iter()
            .enumerate()
            .map(|(i, choice)| {
                let repr = choice.to_string();
                match i {
                    0 if num_options == 1 => repr,
                    0 if num_options == 2 => format!("{repr} "),
                    i if i == num_options - 1 => format!("or {repr}"),
                    _ => format!("{repr}, "),
                }
            })
            .collect::<String>();
        write!(f, "{repr}")
    }
}

impl<I> From<I> for ActionChoices
where
    I: IntoIterator<Item = ActionChoice>,
{
    fn from(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Shared round state: per-player pot contributions, the face-down
/// committed cards, and the discard pile accumulated across rounds.
#[derive(Clone, Debug, Default)]
pub struct Gameboard {
    bets: HashMap<PlayerId, Chips>,
    cards: HashMap<PlayerId, Card>,
    revealed: bool,
    discards: Vec<Card>,
}

impl Gameboard {
    #[must_use]
    pub fn new(players: impl IntoIterator<Item = PlayerId>) -> Self {
        Self {
            bets: players.into_iter().map(|id| (id, 0)).collect(),
            cards: HashMap::new(),
            revealed: false,
            discards: Vec::new(),
        }
    }

    /// Add to a player's contribution. Contributions only ever grow
    /// within a round.
    pub fn add_bet(&mut self, id: PlayerId, amount: Chips) {
        *self.bets.entry(id).or_default() += amount;
    }

    #[must_use]
    pub fn contribution(&self, id: PlayerId) -> Chips {
        *self.bets.get(&id).unwrap_or(&0)
    }

    /// The table maximum: the largest single contribution this round.
    #[must_use]
    pub fn max_bet(&self) -> Chips {
        *self.bets.values().max().unwrap_or(&0)
    }

    #[must_use]
    pub fn total(&self) -> Chips {
        self.bets.values().sum()
    }

    #[must_use]
    pub fn bets(&self) -> &HashMap<PlayerId, Chips> {
        &self.bets
    }

    pub fn commit(&mut self, id: PlayerId, card: Card) {
        self.cards.insert(id, card);
    }

    #[must_use]
    pub fn committed(&self, id: PlayerId) -> Option<Card> {
        self.cards.get(&id).copied()
    }

    #[must_use]
    pub fn committed_cards(&self) -> &HashMap<PlayerId, Card> {
        &self.cards
    }

    /// Turn all committed cards face up.
    pub fn reveal(&mut self) {
        self.revealed = true;
    }

    #[must_use]
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    #[must_use]
    pub fn discards(&self) -> &[Card] {
        &self.discards
    }

    /// Drop an eliminated player from the pot map. Their committed card
    /// stays on the board until the end-of-round sweep so it still counts
    /// toward the depletion estimate and the discard pile.
    pub fn remove_player(&mut self, id: PlayerId) {
        self.bets.remove(&id);
    }

    /// Zero the contributions once the pot has been paid out or
    /// refunded. The committed cards stay put until [`Self::clear`].
    pub fn settle(&mut self) {
        for amount in self.bets.values_mut() {
            *amount = 0;
        }
    }

    /// End-of-round sweep: committed cards go to the discard pile,
    /// contributions reset to zero.
    pub fn clear(&mut self) {
        self.discards
            .extend(self.cards.drain().map(|(_, card)| card));
        self.revealed = false;
        self.settle();
    }
}

/// How one committed-card slot looks from outside the engine.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SlotView {
    Empty,
    FaceDown,
    FaceUp(Card),
}

impl fmt::Display for SlotView {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Empty => "--".to_string(),
            Self::FaceDown => "[?]".to_string(),
            Self::FaceUp(card) => card.to_string(),
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub balance: Chips,
    pub pot: Chips,
    pub high: u8,
    pub low: u8,
    pub position: Position,
    pub slot: SlotView,
    /// Still holds a seat in the turn order (not eliminated).
    pub seated: bool,
    /// Still contesting the current round (seated and not folded).
    pub in_round: bool,
}

/// Snapshot of everything a presentation layer may show. High/low counts
/// and positions are public in this game, so every seat receives the
/// same view; only hands and face-down slot contents stay hidden.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TableView {
    pub round: u32,
    pub cards_left: usize,
    pub expected_left: HashMap<Value, f64>,
    pub players: Vec<PlayerView>,
    pub discards: Vec<Card>,
}
