//! Errors raised by the game rules.

use super::types::Coord;

/// Why a move was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum InvalidMove {
    /// The game already has a winner (or ended in a tie).
    #[display("Cannot make a move, game is already over.")]
    GameOver,

    /// The target square already holds a token.
    #[display("Space {} is already occupied", _0)]
    Occupied(Coord),

    /// The computer was asked to move on a full board.
    #[display("Cannot move, all spaces are already occupied")]
    BoardFull,
}

/// Error produced by the game engine.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum GameError {
    /// A mover kind other than player or computer was supplied.
    ///
    /// This is a caller bug, never a user-facing condition.
    #[display("Unknown player type: {}", _0)]
    InvalidPlayer(String),

    /// The requested move is not allowed in the current game state.
    #[display("{}", _0)]
    InvalidMove(InvalidMove),

    /// A stored board contained a symbol other than `X`, `O` or `.`.
    #[display("Unknown board symbol: {:?}", _0)]
    InvalidSymbol(String),
}

impl std::error::Error for GameError {}

impl From<InvalidMove> for GameError {
    fn from(reason: InvalidMove) -> Self {
        GameError::InvalidMove(reason)
    }
}
