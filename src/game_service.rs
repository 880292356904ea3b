//! Game business logic layer.
//!
//! Sits between the HTTP handlers and the repository: scopes every lookup
//! to the calling user, and runs each turn as one database transaction.

use std::sync::{Arc, Mutex, PoisonError};

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::db::{DbError, GameRepository, User};
use crate::games::tictactoe::{Board, Coord, Game, GameError, IndexSource, Move, Winner};

/// Random source shared by all requests.
pub type SharedIndexSource = Arc<Mutex<dyn IndexSource + Send>>;

/// Error returned by [`GameService`] operations.
#[derive(Debug, Clone, derive_more::Display)]
pub enum ServiceError {
    /// The game does not exist or belongs to another user.
    #[display("Not found.")]
    NotFound,
    /// The engine rejected the request.
    #[display("{}", _0)]
    Game(GameError),
    /// Storage failed.
    #[display("{}", _0)]
    Db(DbError),
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServiceError::NotFound => None,
            ServiceError::Game(err) => Some(err),
            ServiceError::Db(err) => Some(err),
        }
    }
}

impl From<GameError> for ServiceError {
    fn from(err: GameError) -> Self {
        ServiceError::Game(err)
    }
}

impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        ServiceError::Db(err)
    }
}

impl From<diesel::result::Error> for ServiceError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        ServiceError::Db(DbError::from(err))
    }
}

/// A game as shown to its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct GameView {
    /// Game identifier.
    id: i32,
    /// Current board.
    board: Board,
    /// Outcome, or `None` while the game is running.
    game_winner: Option<Winner>,
}

impl From<&Game> for GameView {
    fn from(game: &Game) -> Self {
        Self {
            id: *game.id(),
            board: game.current_board(),
            game_winner: *game.winner(),
        }
    }
}

/// Result of one turn: the board after the last move made and the winner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct TurnOutcome {
    /// Board after the player's move, or after the computer's reply.
    board: Board,
    /// Outcome, or `None` while the game is running.
    game_winner: Option<Winner>,
}

/// Service layer for playing games.
#[derive(Clone)]
pub struct GameService {
    repository: GameRepository,
    index_source: SharedIndexSource,
}

impl std::fmt::Debug for GameService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameService")
            .field("repository", &self.repository)
            .finish_non_exhaustive()
    }
}

impl GameService {
    /// Creates a service backed by `repository`, drawing computer moves from
    /// `index_source`.
    #[instrument(skip(repository, index_source))]
    pub fn new<S>(repository: GameRepository, index_source: S) -> Self
    where
        S: IndexSource + Send + 'static,
    {
        info!("Creating GameService");
        Self {
            repository,
            index_source: Arc::new(Mutex::new(index_source)),
        }
    }

    /// Returns the underlying repository.
    pub fn repository(&self) -> &GameRepository {
        &self.repository
    }

    /// Resolves an API token to its user.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Db`] if the lookup fails.
    #[instrument(skip(self, token))]
    pub fn authenticate(&self, token: &str) -> Result<Option<User>, ServiceError> {
        Ok(self.repository.user_by_token(token)?)
    }

    /// Registers a new user and issues their API token.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Db`] if the name is taken.
    #[instrument(skip(self))]
    pub fn create_user(&self, username: String) -> Result<User, ServiceError> {
        Ok(self.repository.create_user(username)?)
    }

    /// Starts a new game for `user`.
    #[instrument(skip(self, user), fields(user_id = user.id()))]
    pub fn create_game(&self, user: &User) -> Result<GameView, ServiceError> {
        let game = self.repository.create_game(*user.id())?;
        Ok(GameView::from(&game))
    }

    /// Lists `user`'s games, oldest first.
    #[instrument(skip(self, user), fields(user_id = user.id()))]
    pub fn list_games(&self, user: &User) -> Result<Vec<GameView>, ServiceError> {
        let games = self.repository.list_games(*user.id())?;
        Ok(games.iter().map(GameView::from).collect())
    }

    /// Gets one of `user`'s games.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] if the game is missing or not theirs.
    #[instrument(skip(self, user), fields(user_id = user.id()))]
    pub fn get_game(&self, user: &User, game_id: i32) -> Result<GameView, ServiceError> {
        let game = self
            .repository
            .find_game(*user.id(), game_id)?
            .ok_or(ServiceError::NotFound)?;
        Ok(GameView::from(&game))
    }

    /// Lists the board after each move of one of `user`'s games.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] if the game is missing or not theirs.
    #[instrument(skip(self, user), fields(user_id = user.id()))]
    pub fn list_moves(&self, user: &User, game_id: i32) -> Result<Vec<Board>, ServiceError> {
        let moves = self
            .repository
            .list_moves(*user.id(), game_id)?
            .ok_or(ServiceError::NotFound)?;
        Ok(moves.iter().map(|mv| *mv.board()).collect())
    }

    /// Plays the user's move at `coord` and, if the game goes on, the
    /// computer's reply.
    ///
    /// Loading the game, applying both moves and storing the result happen
    /// in one transaction: on any error nothing is written.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] for a missing or foreign game and
    /// [`ServiceError::Game`] if the engine rejects the move.
    #[instrument(skip(self, user), fields(user_id = user.id()))]
    pub fn play_turn(
        &self,
        user: &User,
        game_id: i32,
        coord: Coord,
    ) -> Result<TurnOutcome, ServiceError> {
        let user_id = *user.id();

        self.repository.transaction(|conn| {
            let mut game = GameRepository::load_game(conn, user_id, game_id)?
                .ok_or(ServiceError::NotFound)?;

            let mut made: Vec<Move> = Vec::with_capacity(2);
            let (player_move, winner) = game.make_player_move(coord)?;
            made.push(player_move);

            if winner.is_none() {
                let mut source = self
                    .index_source
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                let (computer_move, _) = game.make_computer_move(&mut *source)?;
                made.push(computer_move);
            } else {
                debug!(?winner, "Player move ended the game");
            }

            for mv in &made {
                GameRepository::insert_move(conn, game_id, mv)?;
            }

            if let Some(winner) = *game.winner() {
                GameRepository::set_winner(conn, game_id, winner)?;
            }

            let outcome = TurnOutcome {
                board: game.current_board(),
                game_winner: *game.winner(),
            };
            info!(game_id, moves = made.len(), winner = ?outcome.game_winner, "Turn complete");
            Ok(outcome)
        })
        .inspect_err(|err| warn!(game_id, error = %err, "Turn rejected"))
    }
}
