//! Aggregate statistics endpoint

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::db::SolveRepository;
use crate::error::Result;
use crate::state::AppState;
use crate::stats::{aggregate, ChartData, ScoreKind};

pub fn router() -> Router<AppState> {
    Router::new().route("/statistics/:event/:kind", get(statistics))
}

/// Histogram of everyone's scores for an event, over time or move count
async fn statistics(
    State(state): State<AppState>,
    Path((event, kind)): Path<(String, String)>,
) -> Result<Json<ChartData>> {
    let kind: ScoreKind = kind.parse()?;

    let rows = SolveRepository::new(state.db())
        .find_event_scores(&event)
        .await?;

    Ok(Json(aggregate(rows, kind)))
}
