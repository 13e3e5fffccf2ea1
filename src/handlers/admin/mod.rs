mod licenses;

pub use licenses::*;

use axum::{
    Router,
    routing::{get, post},
};

use crate::db::AppState;

/// Admin API. Every handler extracts `AdminAccess`, so each route answers
/// 401 without the `X-Admin-Key` header (or an equivalent Bearer token).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/generate", post(generate_license))
        .route("/admin/licenses", get(list_licenses))
        .route("/admin/deactivate", post(deactivate_license))
}
