//! Database repository for users, games and moves.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use rand::Rng;
use rand::distributions::Alphanumeric;
use tracing::{debug, info, instrument};

use crate::db::{DbError, GameRow, MoveRow, NewGame, NewMove, NewUser, User, schema};
use crate::games::tictactoe::{Game, Move, Winner};

/// Schema migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Length of generated API tokens.
const TOKEN_LEN: usize = 32;

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Database repository for user and game operations.
///
/// Each public method opens its own connection. Work that has to be atomic
/// goes through [`GameRepository::transaction`] and the connection-scoped
/// helpers.
#[derive(Debug, Clone)]
pub struct GameRepository {
    db_path: String,
}

impl GameRepository {
    /// Creates a new repository for the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is empty.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        if db_path.trim().is_empty() {
            return Err(DbError::new("Database path is empty"));
        }
        info!(path = %db_path, "Creating GameRepository");
        Ok(Self { db_path })
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.db_path)
            .map_err(|e| DbError::new(format!("Failed to connect to '{}': {}", self.db_path, e)))?;
        conn.batch_execute(&format!(
            "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = {};",
            BUSY_TIMEOUT_MS
        ))?;
        Ok(conn)
    }

    /// Applies any pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(format!("Migration failed: {}", e)))?;
        info!(count = applied.len(), "Migrations applied");
        Ok(())
    }

    /// Runs `f` inside an immediate transaction.
    ///
    /// The write lock is taken when the transaction starts, so two
    /// transactions touching the same game run one after the other. If `f`
    /// returns an error everything it wrote is rolled back.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns, or a connection/transaction error.
    #[instrument(skip(self, f))]
    pub fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T, E>,
        E: From<diesel::result::Error> + From<DbError>,
    {
        let mut conn = self.connection()?;
        conn.immediate_transaction(f)
    }

    /// Creates a user with a freshly generated API token.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the username is taken or a database error occurs.
    #[instrument(skip(self))]
    pub fn create_user(&self, username: String) -> Result<User, DbError> {
        debug!(username = %username, "Creating user");
        let mut conn = self.connection()?;

        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect();
        let new_user = NewUser::new(username, token);

        let user = diesel::insert_into(schema::users::table)
            .values(&new_user)
            .returning(User::as_returning())
            .get_result(&mut conn)?;

        info!(user_id = user.id(), username = %user.username(), "User created");
        Ok(user)
    }

    /// Looks up the user holding `token`. Returns `None` if no user matches.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, token))]
    pub fn user_by_token(&self, token: &str) -> Result<Option<User>, DbError> {
        let mut conn = self.connection()?;

        let user = schema::users::table
            .filter(schema::users::api_token.eq(token))
            .select(User::as_select())
            .first(&mut conn)
            .optional()?;

        debug!(found = user.is_some(), "Token lookup");
        Ok(user)
    }

    /// Gets a user by username. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn user_by_name(&self, username: &str) -> Result<Option<User>, DbError> {
        let mut conn = self.connection()?;

        let user = schema::users::table
            .filter(schema::users::username.eq(username))
            .select(User::as_select())
            .first(&mut conn)
            .optional()?;

        debug!(found = user.is_some(), "Username lookup");
        Ok(user)
    }

    /// Creates an empty game owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn create_game(&self, user_id: i32) -> Result<Game, DbError> {
        let mut conn = self.connection()?;

        let row = diesel::insert_into(schema::games::table)
            .values(&NewGame::new(user_id))
            .returning(GameRow::as_returning())
            .get_result(&mut conn)?;

        info!(game_id = row.id(), user_id, "Game created");
        row.into_game(Vec::new())
    }

    /// Lists all games owned by `user_id` with their moves, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs or a stored move is
    /// malformed.
    #[instrument(skip(self))]
    pub fn list_games(&self, user_id: i32) -> Result<Vec<Game>, DbError> {
        let mut conn = self.connection()?;

        let rows = schema::games::table
            .filter(schema::games::user_id.eq(user_id))
            .order((schema::games::created_at.asc(), schema::games::id.asc()))
            .select(GameRow::as_select())
            .load(&mut conn)?;

        let moves = MoveRow::belonging_to(&rows)
            .order(schema::moves::id.asc())
            .select(MoveRow::as_select())
            .load(&mut conn)?
            .grouped_by(&rows);

        let games = rows
            .into_iter()
            .zip(moves)
            .map(|(row, moves)| row.into_game(moves))
            .collect::<Result<Vec<_>, _>>()?;

        info!(user_id, count = games.len(), "Games loaded");
        Ok(games)
    }

    /// Gets game `game_id` if it belongs to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn find_game(&self, user_id: i32, game_id: i32) -> Result<Option<Game>, DbError> {
        let mut conn = self.connection()?;
        Self::load_game(&mut conn, user_id, game_id)
    }

    /// Lists the moves of game `game_id` in creation order, or `None` if the
    /// game does not exist or belongs to someone else.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_moves(&self, user_id: i32, game_id: i32) -> Result<Option<Vec<Move>>, DbError> {
        let mut conn = self.connection()?;
        Ok(Self::load_game(&mut conn, user_id, game_id)?.map(|game| game.moves().clone()))
    }

    /// Loads an owned game with its moves on an existing connection.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(conn))]
    pub fn load_game(
        conn: &mut SqliteConnection,
        user_id: i32,
        game_id: i32,
    ) -> Result<Option<Game>, DbError> {
        let row = schema::games::table
            .filter(schema::games::id.eq(game_id))
            .filter(schema::games::user_id.eq(user_id))
            .select(GameRow::as_select())
            .first(conn)
            .optional()?;

        let Some(row) = row else {
            debug!("Game not found for user");
            return Ok(None);
        };

        let moves = MoveRow::belonging_to(&row)
            .order(schema::moves::id.asc())
            .select(MoveRow::as_select())
            .load(conn)?;

        debug!(moves = moves.len(), "Game loaded");
        row.into_game(moves).map(Some)
    }

    /// Appends a move to game `game_id` on an existing connection.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(conn, mv), fields(mover = %mv.mover()))]
    pub fn insert_move(
        conn: &mut SqliteConnection,
        game_id: i32,
        mv: &Move,
    ) -> Result<MoveRow, DbError> {
        let new_move = NewMove::from_move(game_id, mv)?;

        let row = diesel::insert_into(schema::moves::table)
            .values(&new_move)
            .returning(MoveRow::as_returning())
            .get_result(conn)?;

        debug!(move_id = row.id(), "Move stored");
        Ok(row)
    }

    /// Records the outcome of game `game_id` on an existing connection.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(conn))]
    pub fn set_winner(
        conn: &mut SqliteConnection,
        game_id: i32,
        winner: Winner,
    ) -> Result<(), DbError> {
        let updated = diesel::update(schema::games::table.find(game_id))
            .set(schema::games::game_winner.eq(winner.as_ref()))
            .execute(conn)?;

        if updated != 1 {
            return Err(DbError::new(format!("Game {} not found when setting winner", game_id)));
        }

        info!(?winner, "Winner recorded");
        Ok(())
    }
}
