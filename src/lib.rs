//! Tic-tac-toe against a random computer opponent.
//!
//! # Architecture
//!
//! - **Games**: the rules engine (board, move legality, win/tie detection,
//!   random computer moves)
//! - **Db**: SQLite persistence for users, games and their move history
//! - **Game service**: ownership checks and transactional turns
//! - **Server**: token-authenticated JSON API over axum
//!
//! # Example
//!
//! ```
//! use tictactoe_server::{Coord, Game, ScriptedIndex, Winner};
//!
//! let mut game = Game::new(1, 1);
//! let (_, winner) = game.make_player_move(Coord::new(1, 1).unwrap()).unwrap();
//! assert_eq!(winner, None);
//!
//! let (reply, _) = game.make_computer_move(&mut ScriptedIndex::fixed(0)).unwrap();
//! assert_eq!(reply.board().get(Coord::new(0, 0).unwrap()).symbol(), "O");
//! assert_ne!(*game.winner(), Some(Winner::Computer));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod db;
mod game_service;
mod games;
mod server;

// Crate-level exports - Configuration
pub use config::{ConfigError, DATABASE_URL_ENV, ServerConfig};

// Crate-level exports - Persistence
pub use db::{DbError, GameRepository, GameRow, MIGRATIONS, MoveRow, NewGame, NewMove, NewUser, User};

// Crate-level exports - Service layer
pub use game_service::{GameService, GameView, ServiceError, SharedIndexSource, TurnOutcome};

// Crate-level exports - HTTP server
pub use server::{
    ApiError, AppState, AuthUser, CreatedGame, HealthResponse, MakeMoveRequest, parse_token, router,
};

// Crate-level exports - Game types (tic-tac-toe)
pub use games::tictactoe::{
    Board, Coord, Game, GameError, IndexSource, InvalidMove, Move, Mover, RngIndex, ScriptedIndex,
    Square, Winner, initial_board, player_token, rules,
};
