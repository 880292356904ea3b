//! Tic-tac-toe rules engine: a human player (`X`) against a computer (`O`)
//! that picks uniformly at random among the empty squares.

mod error;
mod game;
mod random;
mod types;

pub mod rules;

pub use error::{GameError, InvalidMove};
pub use game::{Game, Move, initial_board};
pub use random::{IndexSource, RngIndex, ScriptedIndex};
pub use types::{Board, Coord, Mover, Square, Winner, player_token};
