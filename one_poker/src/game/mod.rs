//! One Poker game engine - core FSM and game logic.
//!
//! This module provides the round engine implementation including:
//! - Card, deck, player, and board entities
//! - The depletion-estimate tracker behind the wagering math
//! - Round phases and the betting state machine
//! - Event generation and table views

pub mod entities;
pub mod state_machine;
pub mod states;

pub use state_machine::{
    EngineError, Game, GameConfig, GameEvent, OnePokerState, Outcome, TableState, classify,
};
