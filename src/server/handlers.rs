//! Request handlers for the games API.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::AppState;
use super::auth::AuthUser;
use super::error::ApiError;
use crate::game_service::{GameView, ServiceError, TurnOutcome};
use crate::games::tictactoe::{Board, Coord};

/// Body of `POST /games/{id}/move`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MakeMoveRequest {
    /// Row, 0-2.
    pub x: i64,
    /// Column, 0-2.
    pub y: i64,
}

impl MakeMoveRequest {
    /// Checks both coordinates are on the board.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] naming the first axis out of range.
    #[instrument]
    pub fn coord(&self) -> Result<Coord, ApiError> {
        let x = validate_coordinate("X", self.x)?;
        let y = validate_coordinate("Y", self.y)?;
        Coord::new(x, y).ok_or_else(|| ApiError::Internal("Validated coordinate rejected".into()))
    }
}

fn validate_coordinate(name: &str, value: i64) -> Result<usize, ApiError> {
    usize::try_from(value)
        .ok()
        .filter(|v| *v < Board::SIZE)
        .ok_or_else(|| {
            ApiError::Validation(format!(
                "{} coordinate must be an integer between 0 and 2",
                name
            ))
        })
}

/// Response to `POST /games`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CreatedGame {
    /// Id of the new game.
    pub id: i32,
}

/// Response to `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"`.
    pub status: String,
}

/// Runs blocking service work off the async runtime.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ServiceError> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await??)
}

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// `GET /games`: the caller's games, oldest first.
#[instrument(skip(state, user), fields(user_id = user.id()))]
pub async fn list_games(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<GameView>>, ApiError> {
    let service = state.service().clone();
    let games = blocking(move || service.list_games(&user)).await?;
    debug!(count = games.len(), "Listed games");
    Ok(Json(games))
}

/// `POST /games`: starts a new game for the caller.
#[instrument(skip(state, user), fields(user_id = user.id()))]
pub async fn create_game(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<(StatusCode, Json<CreatedGame>), ApiError> {
    let service = state.service().clone();
    let game = blocking(move || service.create_game(&user)).await?;
    info!(game_id = game.id(), "Game started");
    Ok((StatusCode::CREATED, Json(CreatedGame { id: *game.id() })))
}

/// `GET /games/{id}`
#[instrument(skip(state, user, path), fields(user_id = user.id()))]
pub async fn get_game(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<GameView>, ApiError> {
    let Path(game_id) = path?;
    let service = state.service().clone();
    let game = blocking(move || service.get_game(&user, game_id)).await?;
    Ok(Json(game))
}

/// `GET /games/{id}/moves`: board after every move, oldest first.
#[instrument(skip(state, user, path), fields(user_id = user.id()))]
pub async fn list_moves(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<Vec<Board>>, ApiError> {
    let Path(game_id) = path?;
    let service = state.service().clone();
    let boards = blocking(move || service.list_moves(&user, game_id)).await?;
    Ok(Json(boards))
}

/// `POST /games/{id}/move`: plays the caller's move and the computer's reply.
#[instrument(skip(state, user, path, payload), fields(user_id = user.id()))]
pub async fn make_move(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<MakeMoveRequest>, JsonRejection>,
) -> Result<Json<TurnOutcome>, ApiError> {
    let Path(game_id) = path?;
    let Json(request) = payload.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
    let coord = request.coord()?;
    debug!(%coord, "Move requested");

    let service = state.service().clone();
    let outcome = blocking(move || service.play_turn(&user, game_id, coord)).await?;
    Ok(Json(outcome))
}
