//! Token authentication.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::{debug, instrument};

use super::AppState;
use super::error::ApiError;
use crate::db::User;

/// The authenticated caller.
///
/// Extracting it reads `Authorization: Token <key>` (or `Bearer <key>`)
/// and rejects the request with 403 if the key is missing or unknown.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// Pulls the key out of an `Authorization` header value.
#[instrument(skip(header))]
pub fn parse_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    let known = scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer");
    (known && !token.is_empty()).then_some(token)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_token)
            .map(str::to_string)
            .ok_or_else(|| {
                debug!("Missing or malformed Authorization header");
                ApiError::NotAuthenticated
            })?;

        let service = state.service().clone();
        let user = tokio::task::spawn_blocking(move || service.authenticate(&token)).await??;

        user.map(AuthUser).ok_or_else(|| {
            debug!("Unknown API token");
            ApiError::NotAuthenticated
        })
    }
}
