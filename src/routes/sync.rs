//! Sync endpoints
//!
//! One path, three verbs: `POST /sync` compares the client's solve set
//! against ours, `PUT /sync` stores new solves, `DELETE /sync` removes them.
//! Everything is scoped to the session's user.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Extension, Json, Router};
use serde_json::Value;

use crate::auth::CurrentUser;
use crate::db::SolveRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::sync::{reconcile, validate_push, MoveEncoding, PullResponse};

pub fn router() -> Router<AppState> {
    Router::new().route("/sync", post(pull).put(push).delete(remove))
}

/// Clients that send the newer `api-version` header speak the compact tuple
/// form; everyone else gets verbose move objects.
fn negotiated_encoding(headers: &HeaderMap) -> MoveEncoding {
    if headers.contains_key("api-version") {
        MoveEncoding::Encoded
    } else {
        MoveEncoding::Verbose
    }
}

/// Compare the client's known solve ids against the stored set
async fn pull(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    headers: HeaderMap,
    Json(known): Json<Vec<i64>>,
) -> Result<Json<PullResponse>> {
    let encoding = negotiated_encoding(&headers);

    let stored = SolveRepository::new(state.db())
        .find_by_user(&user_id)
        .await?;
    let outcome = reconcile(stored, &known);

    Ok(Json(PullResponse {
        missing: outcome.missing,
        solves: outcome
            .to_send
            .into_iter()
            .map(|solve| solve.into_wire(encoding))
            .collect(),
    }))
}

/// Store a batch of new solves
async fn push(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(body): Json<Value>,
) -> Result<StatusCode> {
    let batch = match body {
        Value::Array(items) => items,
        _ => {
            return Err(AppError::BadRequest(
                "Expected an array of solves".to_string(),
            ))
        }
    };

    let solves = validate_push(batch)?;
    SolveRepository::new(state.db())
        .insert_many(&user_id, &solves)
        .await?;

    tracing::debug!(user = %user_id, count = solves.len(), "Stored pushed solves");
    Ok(StatusCode::NO_CONTENT)
}

/// Delete solves by start time
async fn remove(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(body): Json<Value>,
) -> Result<StatusCode> {
    let ids: Vec<i64> = match body {
        Value::Array(items) => items.iter().filter_map(Value::as_i64).collect(),
        _ => {
            return Err(AppError::BadRequest(
                "Expected an array of solve ids".to_string(),
            ))
        }
    };

    let deleted = SolveRepository::new(state.db())
        .delete_by_user_and_ids(&user_id, &ids)
        .await?;

    tracing::debug!(user = %user_id, deleted, "Deleted solves");
    Ok(StatusCode::NO_CONTENT)
}
