//! Game aggregate and move engine.
//!
//! A [`Game`] owns its append-only move history. The current board is
//! always the snapshot stored on the latest move, so the history is the
//! single source of truth for game state. The only other mutable field is
//! the winner, which goes from unset to set exactly once.

use super::error::{GameError, InvalidMove};
use super::random::IndexSource;
use super::rules;
use super::types::{Board, Coord, Mover, Square, Winner};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// One token placement and the board it produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Move {
    /// Who placed the token.
    mover: Mover,
    /// Board state right after the placement.
    board: Board,
}

impl Move {
    /// Creates a move record.
    pub fn new(mover: Mover, board: Board) -> Self {
        Self { mover, board }
    }
}

/// A single game between the owner and the computer.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Game {
    /// Game identifier.
    id: i32,
    /// Id of the user who owns the game.
    owner: i32,
    /// Outcome, once the game is over.
    winner: Option<Winner>,
    /// Moves in creation order.
    moves: Vec<Move>,
}

/// Returns the board before anyone has moved.
pub fn initial_board() -> Board {
    Board::new()
}

impl Game {
    /// Creates a fresh game with no moves and no winner.
    #[instrument]
    pub fn new(id: i32, owner: i32) -> Self {
        Self {
            id,
            owner,
            winner: None,
            moves: Vec::new(),
        }
    }

    /// Rebuilds a game from stored state.
    #[instrument(skip(moves), fields(moves = moves.len()))]
    pub fn restore(id: i32, owner: i32, winner: Option<Winner>, moves: Vec<Move>) -> Self {
        Self {
            id,
            owner,
            winner,
            moves,
        }
    }

    /// Returns the board after the latest move, or the initial board.
    pub fn current_board(&self) -> Board {
        self.moves
            .last()
            .map(|mv| *mv.board())
            .unwrap_or_else(initial_board)
    }

    /// Checks whether the game has ended.
    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    /// True if the game is still running and `coord` is empty.
    #[instrument(skip(self), fields(game_id = self.id))]
    pub fn is_move_valid(&self, coord: Coord) -> bool {
        !self.is_over() && self.current_board().is_empty(coord)
    }

    /// Places the player's token at `coord`.
    ///
    /// Returns the new move and the winner it produced, if any.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidMove`] if the game is over or the square
    /// is taken. Nothing is changed in that case.
    #[instrument(skip(self), fields(game_id = self.id))]
    pub fn make_player_move(&mut self, coord: Coord) -> Result<(Move, Option<Winner>), GameError> {
        if self.is_over() {
            warn!(winner = ?self.winner, "Player tried to move in a finished game");
            return Err(InvalidMove::GameOver.into());
        }

        if !self.current_board().is_empty(coord) {
            warn!(%coord, "Player tried to move onto an occupied square");
            return Err(InvalidMove::Occupied(coord).into());
        }

        Ok(self.apply_move(coord, Mover::Player))
    }

    /// Places the computer's token on a randomly chosen empty square.
    ///
    /// Empty squares are listed row-major and one is picked by drawing an
    /// index from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidMove`] if the game is over or no square
    /// is free.
    #[instrument(skip(self, source), fields(game_id = self.id))]
    pub fn make_computer_move(
        &mut self,
        source: &mut dyn IndexSource,
    ) -> Result<(Move, Option<Winner>), GameError> {
        if self.is_over() {
            warn!(winner = ?self.winner, "Computer asked to move in a finished game");
            return Err(InvalidMove::GameOver.into());
        }

        let empty = self.current_board().empty_squares();
        if empty.is_empty() {
            warn!("Computer asked to move on a full board");
            return Err(InvalidMove::BoardFull.into());
        }

        let index = source.next_index(empty.len());
        let coord = empty[index];
        debug!(candidates = empty.len(), index, %coord, "Computer picked square");

        Ok(self.apply_move(coord, Mover::Computer))
    }

    /// Appends a move for `mover` at `coord` and records any result.
    ///
    /// Callers have already checked that the square is empty and the game
    /// is running.
    fn apply_move(&mut self, coord: Coord, mover: Mover) -> (Move, Option<Winner>) {
        let board = self.current_board().with(coord, Square::Occupied(mover));
        let mv = Move::new(mover, board);
        self.moves.push(mv);

        if let Some(winner) = rules::evaluate(&board) {
            info!(game_id = self.id, ?winner, moves = self.moves.len(), "Game over");
            self.winner = Some(winner);
        }

        debug!(game_id = self.id, ?mover, %coord, "Move applied");
        (mv, self.winner)
    }
}

#[cfg(test)]
mod tests {
    use super::super::random::ScriptedIndex;
    use super::*;

    fn coord(x: usize, y: usize) -> Coord {
        Coord::new(x, y).unwrap()
    }

    #[test]
    fn test_new_game_has_initial_board() {
        let game = Game::new(1, 1);
        assert_eq!(game.current_board(), initial_board());
        assert!(game.winner().is_none());
        assert!(game.moves().is_empty());
    }

    #[test]
    fn test_player_move_records_snapshot() {
        let mut game = Game::new(1, 1);
        let (mv, winner) = game.make_player_move(coord(1, 0)).unwrap();

        assert_eq!(*mv.mover(), Mover::Player);
        assert_eq!(mv.board().get(coord(1, 0)), Square::Occupied(Mover::Player));
        assert_eq!(winner, None);
        assert_eq!(game.moves().len(), 1);
        assert_eq!(game.current_board(), *mv.board());
    }

    #[test]
    fn test_occupied_square_rejected_without_change() {
        let mut game = Game::new(1, 1);
        game.make_player_move(coord(0, 0)).unwrap();
        let before = game.clone();

        let err = game.make_player_move(coord(0, 0)).unwrap_err();
        assert_eq!(err, GameError::InvalidMove(InvalidMove::Occupied(coord(0, 0))));
        assert_eq!(game, before);
    }

    #[test]
    fn test_computer_uses_drawn_index() {
        let mut game = Game::new(1, 1);
        game.make_player_move(coord(0, 0)).unwrap();

        // Empty squares: (0,1) (0,2) (1,0) (1,1) ...; index 3 is the center.
        let mut source = ScriptedIndex::fixed(3);
        let (mv, _) = game.make_computer_move(&mut source).unwrap();
        assert_eq!(mv.board().get(coord(1, 1)), Square::Occupied(Mover::Computer));
    }

    #[test]
    fn test_full_board_rejects_computer() {
        let board = Board::from_rows([
            [Square::Occupied(Mover::Computer), Square::Occupied(Mover::Player), Square::Occupied(Mover::Computer)],
            [Square::Occupied(Mover::Player), Square::Occupied(Mover::Player), Square::Occupied(Mover::Computer)],
            [Square::Occupied(Mover::Player), Square::Occupied(Mover::Computer), Square::Occupied(Mover::Player)],
        ]);
        let mut game = Game::restore(1, 1, None, vec![Move::new(Mover::Player, board)]);

        let err = game
            .make_computer_move(&mut ScriptedIndex::fixed(0))
            .unwrap_err();
        assert_eq!(err, GameError::InvalidMove(InvalidMove::BoardFull));
    }
}
