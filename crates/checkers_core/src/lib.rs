pub mod board;
pub mod error;
pub mod factory;
pub mod movement;
pub mod protocol;
pub mod types;

// Re-export the game model (not transport-specific)
pub use board::*;
pub use error::GameError;
pub use factory::{arm_apex, arm_cells, create_board, validate_seat_count};
pub use movement::*;
pub use protocol::{frame, ClientRequest, Message, ServerNotice};
pub use types::*;

// =============================================================================
// Seat trait: implemented by socket-backed players and by bots
// =============================================================================

/// One participant slot in a match.
///
/// The coordinator talks to every seat through this interface and never
/// branches on whether a person or a bot is answering. Lines are protocol
/// lines without the trailing newline.
pub trait Seat: Send {
    /// Colour this seat plays.
    fn color(&self) -> Color;

    /// Deliver one server line to the seat.
    fn send(&mut self, line: &str) -> Result<(), GameError>;

    /// Block until the seat answers with one request line.
    ///
    /// Returns `GameError::PlayerLeft` once the seat's stream has closed.
    fn receive(&mut self) -> Result<String, GameError>;

    /// Human-readable label for logs.
    fn name(&self) -> &str {
        "player"
    }
}

impl<S: Seat + ?Sized> Seat for Box<S> {
    fn color(&self) -> Color {
        (**self).color()
    }

    fn send(&mut self, line: &str) -> Result<(), GameError> {
        (**self).send(line)
    }

    fn receive(&mut self) -> Result<String, GameError> {
        (**self).receive()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
