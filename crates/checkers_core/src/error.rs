use crate::types::{Color, Coord};

/// Everything that can go wrong while setting up or playing a match.
///
/// `IllegalCell`, `InvalidMove` and `MalformedRequest` are local: the
/// coordinator answers them with `NOK` and keeps going. The rest end the
/// match.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("cell {coord} is off the board or not playable")]
    IllegalCell { coord: Coord },

    #[error("move from {from} to {to} is not allowed")]
    InvalidMove { from: Coord, to: Coord },

    #[error("malformed request: {line:?}")]
    MalformedRequest { line: String },

    #[error("player {color} left the game")]
    PlayerLeft { color: Color },

    #[error("invalid configuration: {reason}")]
    Configuration { reason: String },

    #[error("move store error: {reason}")]
    Persistence { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl GameError {
    pub fn configuration(reason: impl Into<String>) -> Self {
        GameError::Configuration {
            reason: reason.into(),
        }
    }

    pub fn malformed(line: impl Into<String>) -> Self {
        GameError::MalformedRequest { line: line.into() }
    }

    pub fn persistence(reason: impl Into<String>) -> Self {
        GameError::Persistence {
            reason: reason.into(),
        }
    }

    /// Whether this error terminates the match.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            GameError::PlayerLeft { .. } | GameError::Configuration { .. } | GameError::Io(_)
        )
    }
}
