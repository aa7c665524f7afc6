//! The boundary between the round engine and whatever drives a seat.
//!
//! The engine never knows whether a seat is played by the built-in
//! algorithm or by a person behind some front end. Both sides of that
//! question implement [`SeatDriver`], the single request/response
//! contract: the engine asks for a committed card or a betting action
//! and blocks until the driver answers, and pushes display updates the
//! driver may render or ignore.
//!
//! [`RemoteSeat`] is the interactive implementation. It forwards each
//! request over a channel pair to a [`SeatHandle`] owned by the
//! presentation side and waits on a rendezvous channel for the single
//! outstanding response. Dropping the handle is the shutdown path: the
//! next request fails with [`SeatError::Disconnected`] and the engine
//! winds down instead of blocking forever.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::mpsc::{Receiver, RecvError, Sender, SyncSender, channel, sync_channel};
use thiserror::Error;

use crate::game::entities::{Action, ActionChoices, Card, Chips, PlayerId, TableView};
use crate::game::state_machine::GameEvent;

/// Errors that can come back from a seat driver.
#[derive(Debug, Error)]
pub enum SeatError {
    #[error("presentation side disconnected")]
    Disconnected,
    #[error("presentation answered out of protocol: {0}")]
    Protocol(String),
}

/// Everything a seat needs to pick a betting action: the legal subset
/// and the public money state of the table.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ActionPrompt {
    pub seat: PlayerId,
    pub choices: ActionChoices,
    pub pots: HashMap<PlayerId, Chips>,
    pub balances: HashMap<PlayerId, Chips>,
}

/// The two hand cards to pick a face-down commit from.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct CommitPrompt {
    pub seat: PlayerId,
    pub cards: [Card; 2],
}

/// One-way display push. Fire-and-forget: the engine never waits on it.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub enum Update {
    View(TableView),
    Event(GameEvent),
}

/// The decision-provider capability for a single seat.
pub trait SeatDriver: Send {
    /// Pick one action from the prompt's legal subset. A raise carries
    /// its total amount.
    fn act(&mut self, prompt: &ActionPrompt) -> Result<Action, SeatError>;

    /// Pick which of the two hand cards to commit face down (0 or 1).
    fn commit(&mut self, prompt: &CommitPrompt) -> Result<usize, SeatError>;

    /// Receive a display update. Must not block.
    fn observe(&mut self, update: &Update);

    /// Block until the seat is ready for the next round.
    fn await_continue(&mut self) -> Result<(), SeatError> {
        Ok(())
    }
}

/// A request the engine sends to the presentation side.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub enum SeatRequest {
    Act(ActionPrompt),
    Commit(CommitPrompt),
    Continue,
}

/// What the presentation side receives on its inbox.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub enum SeatMessage {
    Update(Update),
    Request(SeatRequest),
}

/// The single answer to an outstanding [`SeatRequest`].
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub enum SeatResponse {
    Act(Action),
    Commit(usize),
    Continue,
}

/// Engine-side driver for a seat played through an external front end.
pub struct RemoteSeat {
    outbox: Sender<SeatMessage>,
    responses: Receiver<SeatResponse>,
}

/// Presentation-side handle paired with a [`RemoteSeat`].
pub struct SeatHandle {
    inbox: Receiver<SeatMessage>,
    responses: SyncSender<SeatResponse>,
}

/// Create a connected driver/handle pair. The response channel is a
/// zero-capacity rendezvous, so at most one request is ever in flight
/// and the answer hands off directly to the waiting engine.
#[must_use]
pub fn remote_seat() -> (RemoteSeat, SeatHandle) {
    let (outbox, inbox) = channel();
    let (response_tx, response_rx) = sync_channel(0);
    (
        RemoteSeat {
            outbox,
            responses: response_rx,
        },
        SeatHandle {
            inbox,
            responses: response_tx,
        },
    )
}

impl RemoteSeat {
    fn request(&mut self, request: SeatRequest) -> Result<SeatResponse, SeatError> {
        self.outbox
            .send(SeatMessage::Request(request))
            .map_err(|_| SeatError::Disconnected)?;
        self.responses.recv().map_err(|_| SeatError::Disconnected)
    }
}

impl SeatDriver for RemoteSeat {
    fn act(&mut self, prompt: &ActionPrompt) -> Result<Action, SeatError> {
        match self.request(SeatRequest::Act(prompt.clone()))? {
            SeatResponse::Act(action) => Ok(action),
            other => Err(SeatError::Protocol(format!(
                "expected an action, got {other:?}"
            ))),
        }
    }

    fn commit(&mut self, prompt: &CommitPrompt) -> Result<usize, SeatError> {
        match self.request(SeatRequest::Commit(*prompt))? {
            SeatResponse::Commit(index) => Ok(index),
            other => Err(SeatError::Protocol(format!(
                "expected a card index, got {other:?}"
            ))),
        }
    }

    fn observe(&mut self, update: &Update) {
        // Dropped silently when the presentation side is gone; the next
        // request surfaces the disconnect.
        let _ = self.outbox.send(SeatMessage::Update(update.clone()));
    }

    fn await_continue(&mut self) -> Result<(), SeatError> {
        match self.request(SeatRequest::Continue)? {
            SeatResponse::Continue => Ok(()),
            other => Err(SeatError::Protocol(format!(
                "expected a continue signal, got {other:?}"
            ))),
        }
    }
}

impl SeatHandle {
    /// Block for the next message from the engine. An error means the
    /// engine finished and dropped its side.
    pub fn recv(&self) -> Result<SeatMessage, RecvError> {
        self.inbox.recv()
    }

    /// Answer the outstanding request. Blocks until the engine takes
    /// the response.
    pub fn respond(&self, response: SeatResponse) -> Result<(), SeatError> {
        self.responses
            .send(response)
            .map_err(|_| SeatError::Disconnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::Suit;
    use std::thread;

    #[test]
    fn test_remote_seat_round_trip() {
        let (mut seat, handle) = remote_seat();
        let presenter = thread::spawn(move || {
            match handle.recv().unwrap() {
                SeatMessage::Request(SeatRequest::Commit(prompt)) => {
                    assert_eq!(prompt.cards[0], Card(9, Suit::Club));
                    handle.respond(SeatResponse::Commit(1)).unwrap();
                }
                other => panic!("unexpected message: {other:?}"),
            }
            match handle.recv().unwrap() {
                SeatMessage::Request(SeatRequest::Continue) => {
                    handle.respond(SeatResponse::Continue).unwrap();
                }
                other => panic!("unexpected message: {other:?}"),
            }
        });

        let prompt = CommitPrompt {
            seat: 0,
            cards: [Card(9, Suit::Club), Card(2, Suit::Heart)],
        };
        assert_eq!(seat.commit(&prompt).unwrap(), 1);
        assert!(seat.await_continue().is_ok());
        presenter.join().unwrap();
    }

    #[test]
    fn test_dropped_handle_surfaces_disconnect() {
        let (mut seat, handle) = remote_seat();
        drop(handle);
        let prompt = CommitPrompt {
            seat: 0,
            cards: [Card(9, Suit::Club), Card(2, Suit::Heart)],
        };
        assert!(matches!(
            seat.commit(&prompt),
            Err(SeatError::Disconnected)
        ));
    }

    #[test]
    fn test_updates_never_block_or_fail() {
        let (mut seat, handle) = remote_seat();
        drop(handle);
        // No receiver left; the push is simply dropped.
        seat.observe(&Update::Event(GameEvent::RoundTied));
    }

    #[test]
    fn test_messages_serialize_for_out_of_process_front_ends() {
        let message = SeatMessage::Request(SeatRequest::Act(ActionPrompt {
            seat: 1,
            choices: [crate::game::entities::ActionChoice::Check].into(),
            pots: HashMap::from([(0, 2), (1, 2)]),
            balances: HashMap::from([(0, 8), (1, 8)]),
        }));
        let encoded = serde_json::to_string(&message).unwrap();
        let decoded: SeatMessage = serde_json::from_str(&encoded).unwrap();
        match decoded {
            SeatMessage::Request(SeatRequest::Act(prompt)) => {
                assert_eq!(prompt.seat, 1);
                assert_eq!(prompt.pots[&0], 2);
            }
            other => panic!("round trip changed the message: {other:?}"),
        }
    }
}
