pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use state::AppState;

/// The full application: routes, request tracing and shared state.
pub fn app(state: Arc<AppState>) -> Router {
    routes::api_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
