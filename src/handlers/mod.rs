pub mod admin;
pub mod public;

use axum::Router;

use crate::db::AppState;

/// All routes, without transport layers (tracing, CORS).
pub fn router() -> Router<AppState> {
    Router::new()
        // Public endpoints (no auth)
        .merge(public::router())
        // Admin API (shared secret)
        .merge(admin::router())
}
