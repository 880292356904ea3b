//! Full-board detection for tic-tac-toe.

use super::super::Board;
use tracing::instrument;

/// Checks if the board has no empty squares left.
///
/// A full board with no winning line is a tie.
#[instrument(skip(board))]
pub fn is_full(board: &Board) -> bool {
    board.empty_squares().is_empty()
}
