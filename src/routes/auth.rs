//! Authentication endpoints
//!
//! `POST /authenticate/{provider}` trades an OAuth authorization code for a
//! session token; `GET /me` returns the profile behind a token.

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::db::{ProviderProfile, SessionRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Public authentication routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/authenticate/google", post(authenticate_google))
        .route("/authenticate/discord", post(authenticate_discord))
}

/// Session-protected profile route
pub fn me_router() -> Router<AppState> {
    Router::new().route("/me", get(me))
}

#[derive(Debug, Deserialize)]
pub struct AuthQuery {
    code: String,
    redirect_uri: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub name: String,
    #[serde(rename = "avatarUrl")]
    pub avatar_url: Option<String>,
    pub token: String,
}

async fn authenticate_google(
    State(state): State<AppState>,
    Query(query): Query<AuthQuery>,
) -> Result<Json<AuthResponse>> {
    let profile = state
        .identity()
        .exchange_google(&query.code, &query.redirect_uri)
        .await?;
    finish_login(&state, profile).await
}

async fn authenticate_discord(
    State(state): State<AppState>,
    Query(query): Query<AuthQuery>,
) -> Result<Json<AuthResponse>> {
    let profile = state
        .identity()
        .exchange_discord(&query.code, &query.redirect_uri)
        .await?;
    finish_login(&state, profile).await
}

async fn finish_login(state: &AppState, profile: ProviderProfile) -> Result<Json<AuthResponse>> {
    let user = UserRepository::new(state.db()).upsert(&profile).await?;
    let token = SessionRepository::new(state.db()).create(&user.id).await?;

    tracing::info!(provider = %profile.provider, user = %user.id, "Authenticated user");

    Ok(Json(AuthResponse {
        name: user.name,
        avatar_url: user.avatar_url,
        token,
    }))
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub name: String,
    #[serde(rename = "avatarUrl")]
    pub avatar_url: Option<String>,
}

async fn me(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<Json<MeResponse>> {
    let user = UserRepository::new(state.db())
        .get(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User not found: {}", user_id)))?;

    Ok(Json(MeResponse {
        name: user.name,
        avatar_url: user.avatar_url,
    }))
}
