//! The algorithmic seat: probability estimates and the betting table.
//!
//! This module implements:
//! - [`odds`]: the depletion-conditioned win-probability estimate and
//!   the simplified Kelly cap on wager size
//! - [`decision`]: the position-branched decision table, deterministic
//!   given its inputs and the aggression threshold
//! - [`BotSeat`]: a [`crate::seat::SeatDriver`] that plays a seat from
//!   public information only, drawing one fresh threshold per decision
//!
//! The seat is intentionally cautious about going all-in: the Kelly cap
//! only clears a full stake when the estimate says the committed card
//! cannot lose, which happens late in a game when the dangerous values
//! have visibly run out.

pub mod decision;
pub mod odds;
pub mod seat;

pub use decision::{AGGRESSION_CEILING, DecisionInputs, decide};
pub use odds::{kelly_criterion, success_calc};
pub use seat::BotSeat;
