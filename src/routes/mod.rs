//! Route modules for the Slidetimer server

pub mod auth;
pub mod health;
pub mod stats;
pub mod sync;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::require_session;
use crate::state::AppState;

/// Request bodies are solve batches; cap them well below a megabyte
const BODY_LIMIT: usize = 512 * 1024;

/// Build the full application router
pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .merge(sync::router())
        .merge(auth::me_router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(stats::router())
        .merge(protected)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
