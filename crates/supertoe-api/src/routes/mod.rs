//! HTTP and WebSocket routes.

use axum::Router;

use crate::state::AppState;

pub mod game;
pub mod health;
pub mod ws;

/// Builds the full application router with every route mounted.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(game::router())
        .merge(ws::router())
        .with_state(state)
}
