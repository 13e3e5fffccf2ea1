use axum::body::Bytes;
use axum::extract::State;

use crate::db::AppState;
use crate::extractors::Json;
use crate::models::{ValidateRequest, Verdict};

/// POST /validate
///
/// Always answers 200 with a verdict. A body that is not a JSON object
/// counts as missing parameters.
pub async fn validate_license(State(state): State<AppState>, body: Bytes) -> Json<Verdict> {
    let req: ValidateRequest = serde_json::from_slice(&body).unwrap_or_else(|e| {
        tracing::debug!("Unreadable validate body: {}", e);
        ValidateRequest::default()
    });

    Json(state.licenses.validate(req.key(), req.fingerprint()))
}
