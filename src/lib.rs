// Public API for integration tests and potential library usage
pub mod api;
pub mod config;
pub mod game;
pub mod protocol;
pub mod reveal;
pub mod state;
pub mod store;
pub mod sweeper;
pub mod types;
pub mod ws;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use state::AppState;

/// Full HTTP surface: authoring API, `/ws`, and the static screens
pub fn app(state: Arc<AppState>) -> Router {
    let static_dir = state.config.static_dir.clone();

    Router::new()
        .merge(api::router())
        .route("/ws", get(ws::ws_handler))
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
