//! Authentication
//!
//! Identity providers hand us a profile in exchange for an authorization
//! code; we persist the account and issue an opaque session token. The
//! middleware here resolves that token on every protected request.

mod provider;

pub use provider::IdentityClient;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use crate::db::SessionRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// The user id resolved from the request's session token
#[derive(Debug, Clone)]
pub struct CurrentUser(pub String);

/// Pull the token out of an `Authorization: Bearer <token>` header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str> {
    let header = headers
        .get("authorization")
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?
        .to_str()
        .map_err(|_| {
            AppError::Unauthorized("Authorization header is not valid UTF-8".to_string())
        })?;

    let (scheme, token) = header.split_once(' ').ok_or_else(|| {
        AppError::Unauthorized("Authorization header must be `Bearer <token>`".to_string())
    })?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AppError::Unauthorized(
            "Authorization scheme must be `Bearer`".to_string(),
        ));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::Unauthorized("Bearer token is empty".to_string()));
    }

    Ok(token)
}

/// Require a valid session, making the user id available to handlers.
///
/// Runs before any core logic; an unknown or absent token never reaches a
/// repository-touching handler.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let token = extract_bearer_token(request.headers())?.to_string();

    let sessions = SessionRepository::new(state.db());
    let user_id = sessions
        .resolve(&token)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Unknown session token".to_string()))?;
    sessions.touch(&token).await?;

    request.extensions_mut().insert(CurrentUser(user_id));
    Ok(next.run(request).await)
}
