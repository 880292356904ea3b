//! HTTP error responses.

use axum::Json;
use axum::extract::rejection::PathRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::{error, instrument};

use crate::game_service::ServiceError;
use crate::games::tictactoe::GameError;

/// Error returned by a handler, rendered as `{"detail": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ApiError {
    /// No or unknown credentials.
    #[display("Authentication credentials were not provided.")]
    NotAuthenticated,
    /// Missing game, or a game owned by someone else.
    #[display("Not found.")]
    NotFound,
    /// The request was understood but cannot be applied.
    #[display("{}", _0)]
    Validation(String),
    /// Anything the client cannot fix.
    #[display("Internal server error.")]
    Internal(String),
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotAuthenticated => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    #[instrument]
    fn into_response(self) -> Response {
        if let ApiError::Internal(cause) = &self {
            error!(cause = %cause, "Request failed");
        }
        let body = Json(json!({ "detail": self.to_string() }));
        (self.status(), body).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound => ApiError::NotFound,
            ServiceError::Game(GameError::InvalidMove(reason)) => {
                ApiError::Validation(reason.to_string())
            }
            ServiceError::Game(other) => ApiError::Internal(other.to_string()),
            ServiceError::Db(db) => ApiError::Internal(db.to_string()),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("Blocking task failed: {}", err))
    }
}
