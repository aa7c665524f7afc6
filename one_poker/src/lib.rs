//! # One Poker
//!
//! A round engine for One Poker: a turn-based card game where each
//! player draws two cards, commits one face down, and the table bets
//! before the reveal. The higher committed card takes the pot, except
//! that a lone deuce upsets an ace.
//!
//! The engine is implemented as a type-safe finite state machine using
//! `enum_dispatch` for zero-cost dispatch over the phase enum. A round
//! moves through ten phases:
//!
//! - **Deal**: topping every seated player back up to two cards
//! - **RankHands**: counting highs/lows and assigning positions
//! - **CommitCards**: collecting one face-down card per player
//! - **CollectAntes**: the unconditional round contribution
//! - **TakeAction**: the betting loop (check/call/raise/fold/all-in)
//! - **ShowHands**: reveal and winner selection
//! - **DistributePot**: payout, or a full refund on a tie
//! - **BootPlayers**: removing broke players
//! - **NextRound**: depletion-estimate update, board sweep, continue gate
//! - **GameOver**: one player left, or the pile ran dry
//!
//! Seats are driven through the [`seat::SeatDriver`] contract. The
//! engine neither knows nor cares whether a seat is the built-in
//! algorithm ([`bot::BotSeat`]) or a person behind a front end
//! ([`seat::RemoteSeat`]); it asks for decisions and pushes display
//! updates through the same interface either way.
//!
//! ## Example
//!
//! ```
//! use one_poker::bot::BotSeat;
//! use one_poker::seat::SeatDriver;
//! use one_poker::{GameConfig, OnePokerState};
//!
//! let seats: Vec<(String, Box<dyn SeatDriver>)> = vec![
//!     ("P1".to_string(), Box::new(BotSeat::with_seed(0, 1))),
//!     ("P2".to_string(), Box::new(BotSeat::with_seed(1, 2))),
//! ];
//! let game = OnePokerState::with_seed(GameConfig::default(), seats, 7);
//! let outcome = game.run().unwrap();
//! println!("{outcome:?}");
//! ```

/// The algorithmic seat: odds, the decision table, and the bot driver.
pub mod bot;

/// Core game logic, entities, and state machine.
pub mod game;

/// The engine/presentation boundary: the seat-driver contract and the
/// channel-backed interactive driver.
pub mod seat;

pub use game::{
    EngineError, GameConfig, GameEvent, OnePokerState, Outcome, TableState,
    entities::{self, Action, Card, Chips, PlayerId, Position, TableView},
};
pub use seat::{SeatDriver, SeatHandle, remote_seat};
