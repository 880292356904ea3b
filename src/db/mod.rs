//! Database persistence layer for users, games and moves.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only

pub use error::DbError;
pub use models::{GameRow, MoveRow, NewGame, NewMove, NewUser, User};
pub use repository::{GameRepository, MIGRATIONS};
