//! Database models and their mapping onto game types.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use tracing::instrument;

use crate::db::{DbError, schema};
use crate::games::tictactoe::{Board, Game, Move, Mover, Winner};

/// User account database model.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::users)]
pub struct User {
    id: i32,
    username: String,
    api_token: String,
    created_at: NaiveDateTime,
}

/// Insertable user model for creating new accounts.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::users)]
pub struct NewUser {
    username: String,
    api_token: String,
}

/// Game database model.
#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable, Getters)]
#[diesel(table_name = schema::games)]
#[diesel(belongs_to(User))]
pub struct GameRow {
    id: i32,
    user_id: i32,
    game_winner: Option<String>,
    created_at: NaiveDateTime,
}

impl GameRow {
    /// Parses the stored winner, if any.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the column holds an unknown value.
    #[instrument(skip(self), fields(game_id = self.id))]
    pub fn parse_winner(&self) -> Result<Option<Winner>, DbError> {
        self.game_winner
            .as_deref()
            .map(|s| {
                s.parse::<Winner>()
                    .map_err(|_| DbError::new(format!("Invalid game_winner: '{}'", s)))
            })
            .transpose()
    }

    /// Combines this row with its moves into a [`Game`].
    ///
    /// `moves` must already be in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the winner or any move fails to parse.
    #[instrument(skip(self, moves), fields(game_id = self.id, moves = moves.len()))]
    pub fn into_game(self, moves: Vec<MoveRow>) -> Result<Game, DbError> {
        let winner = self.parse_winner()?;
        let moves = moves
            .iter()
            .map(MoveRow::to_move)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Game::restore(self.id, self.user_id, winner, moves))
    }
}

/// Insertable game model.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::games)]
pub struct NewGame {
    user_id: i32,
}

/// Move database model.
#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable, Getters)]
#[diesel(table_name = schema::moves)]
#[diesel(belongs_to(GameRow, foreign_key = game_id))]
pub struct MoveRow {
    id: i32,
    game_id: i32,
    move_by: String,
    board_state: String,
    created_at: NaiveDateTime,
}

impl MoveRow {
    /// Converts the stored row into a [`Move`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if `move_by` names an unknown mover or the board
    /// is not valid JSON.
    #[instrument(skip(self), fields(move_id = self.id))]
    pub fn to_move(&self) -> Result<Move, DbError> {
        let mover = Mover::parse(&self.move_by)?;
        let board: Board = serde_json::from_str(&self.board_state)?;
        Ok(Move::new(mover, board))
    }
}

/// Insertable move model.
#[derive(Debug, Clone, Insertable, Getters)]
#[diesel(table_name = schema::moves)]
pub struct NewMove {
    game_id: i32,
    move_by: String,
    board_state: String,
}

impl NewMove {
    /// Prepares a move of game `game_id` for insertion.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the board fails to serialize.
    #[instrument(skip(mv), fields(mover = %mv.mover()))]
    pub fn from_move(game_id: i32, mv: &Move) -> Result<Self, DbError> {
        Ok(Self {
            game_id,
            move_by: mv.mover().to_string(),
            board_state: serde_json::to_string(mv.board())?,
        })
    }
}
