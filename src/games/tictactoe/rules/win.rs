//! Win detection logic for tic-tac-toe.

use super::super::{Board, Coord, Mover, Square};
use tracing::instrument;

const fn at(x: usize, y: usize) -> Coord {
    Coord::ALL[x * Board::SIZE + y]
}

/// The eight winning lines: three rows, three columns, two diagonals.
pub const LINES: [[Coord; 3]; 8] = [
    // Rows
    [at(0, 0), at(0, 1), at(0, 2)],
    [at(1, 0), at(1, 1), at(1, 2)],
    [at(2, 0), at(2, 1), at(2, 2)],
    // Columns
    [at(0, 0), at(1, 0), at(2, 0)],
    [at(0, 1), at(1, 1), at(2, 1)],
    [at(0, 2), at(1, 2), at(2, 2)],
    // Diagonals
    [at(0, 0), at(1, 1), at(2, 2)],
    [at(2, 0), at(1, 1), at(0, 2)],
];

/// Checks whether `mover` holds all three squares of any line.
#[instrument(skip(board))]
pub fn has_line(board: &Board, mover: Mover) -> bool {
    let token = Square::Occupied(mover);
    LINES
        .iter()
        .any(|line| line.iter().all(|coord| board.get(*coord) == token))
}

/// Returns the side with three in a row, checking the player first.
#[instrument(skip(board))]
pub fn check_winner(board: &Board) -> Option<Mover> {
    [Mover::Player, Mover::Computer]
        .into_iter()
        .find(|mover| has_line(board, *mover))
}
