//! HTTP server: routes, shared state and request logging.

mod auth;
mod error;
mod handlers;

pub use auth::{AuthUser, parse_token};
pub use error::ApiError;
pub use handlers::{CreatedGame, HealthResponse, MakeMoveRequest};

use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tracing::{info, instrument};

use crate::game_service::GameService;

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    service: GameService,
}

impl AppState {
    /// Wraps the game service for use by the router.
    pub fn new(service: GameService) -> Self {
        Self { service }
    }

    /// Returns the game service.
    pub fn service(&self) -> &GameService {
        &self.service
    }
}

/// Logs each incoming request. Headers are left out since they carry
/// credentials.
fn log_request(req: Request<Body>) -> Request<Body> {
    info!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
    req
}

/// Builds the application router.
///
/// | Method | Path | |
/// |---|---|---|
/// | GET | `/health` | liveness, no auth |
/// | GET, POST | `/games` | list / create |
/// | GET | `/games/{id}` | one game |
/// | POST | `/games/{id}/move` | play a turn |
/// | GET | `/games/{id}/moves` | board history |
#[instrument(skip(state))]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/games", get(handlers::list_games).post(handlers::create_game))
        .route("/games/{id}", get(handlers::get_game))
        .route("/games/{id}/move", post(handlers::make_move))
        .route("/games/{id}/moves", get(handlers::list_moves))
        .layer(ServiceBuilder::new().map_request(log_request as fn(Request<Body>) -> Request<Body>))
        .with_state(state)
}
