//! Game rules for tic-tac-toe.
//!
//! Pure functions over a [`Board`]. The engine calls [`evaluate`] once
//! after every move, against the board that move produced.

pub mod draw;
pub mod win;

pub use draw::is_full;
pub use win::{check_winner, has_line};

use super::{Board, Winner};
use tracing::instrument;

/// Decides whether `board` ends the game.
///
/// A completed line wins (the player's lines are checked before the
/// computer's); otherwise a full board is a tie; otherwise play continues
/// and `None` is returned.
#[instrument(skip(board))]
pub fn evaluate(board: &Board) -> Option<Winner> {
    if let Some(mover) = check_winner(board) {
        return Some(Winner::from(mover));
    }
    is_full(board).then_some(Winner::Tie)
}

#[cfg(test)]
mod tests {
    use super::super::{Coord, Mover, Square};
    use super::*;

    fn board(rows: [&str; 3]) -> Board {
        let mut squares = [[Square::Empty; 3]; 3];
        for (x, row) in rows.iter().enumerate() {
            for (y, symbol) in row.chars().enumerate() {
                squares[x][y] = Square::try_from(symbol.to_string()).unwrap();
            }
        }
        Board::from_rows(squares)
    }

    #[test]
    fn test_player_column_wins() {
        let b = board(["OX.", ".XO", ".X."]);
        assert_eq!(evaluate(&b), Some(Winner::Player));
    }

    #[test]
    fn test_computer_column_wins() {
        let b = board(["OXO", "XXO", "X.O"]);
        assert_eq!(evaluate(&b), Some(Winner::Computer));
    }

    #[test]
    fn test_full_board_without_line_is_tie() {
        let b = board(["OXO", "XXO", "XOX"]);
        assert_eq!(evaluate(&b), Some(Winner::Tie));
    }

    #[test]
    fn test_open_board_continues() {
        let b = board(["OX.", ".XO", "..."]);
        assert_eq!(evaluate(&b), None);
    }

    #[test]
    fn test_player_checked_before_computer() {
        // Unreachable in play, but fixes the tie-break order.
        let b = board(["XXX", "OOO", "..."]);
        assert_eq!(evaluate(&b), Some(Winner::Player));
    }

    #[test]
    fn test_win_on_last_square_is_not_tie() {
        let b = board(["XOX", "OXO", "OXX"]);
        assert!(is_full(&b));
        assert_eq!(evaluate(&b), Some(Winner::Player));
        assert_eq!(b.get(Coord::new(2, 2).unwrap()), Square::Occupied(Mover::Player));
    }
}
