use axum::body::Bytes;
use axum::extract::State;

use crate::db::AppState;
use crate::error::{AppError, Result};
use crate::extractors::Json;
use crate::models::{
    DeactivateLicense, DeactivateResponse, GenerateLicense, GeneratedLicense, License,
};
use crate::service::AdminAccess;
use crate::util::{SECONDS_PER_DAY, now};

/// Work out the absolute expiry requested by the issuer.
fn resolve_expiry(req: &GenerateLicense, now: i64) -> Result<Option<i64>> {
    match (&req.expires_at, req.expires_in_days) {
        (Some(_), Some(_)) => Err(AppError::BadRequest(
            "expires_at and expires_in_days cannot both be set".into(),
        )),
        (Some(expires_at), None) => expires_at.resolve().map_err(AppError::BadRequest),
        (None, Some(days)) if days > 0 => days
            .checked_mul(SECONDS_PER_DAY)
            .and_then(|secs| now.checked_add(secs))
            .map(Some)
            .ok_or_else(|| AppError::BadRequest("expires_in_days is too large".into())),
        (None, Some(_)) => Err(AppError::BadRequest(
            "expires_in_days must be positive".into(),
        )),
        (None, None) => Ok(None),
    }
}

/// POST /admin/generate
///
/// The body is optional; an empty body issues a license that never expires.
pub async fn generate_license(
    State(state): State<AppState>,
    admin: AdminAccess,
    body: Bytes,
) -> Result<Json<GeneratedLicense>> {
    let req: GenerateLicense = if body.iter().all(u8::is_ascii_whitespace) {
        GenerateLicense::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::BadRequest(e.to_string()))?
    };

    let expires_at = resolve_expiry(&req, now())?;
    let license = state.licenses.generate(&admin, expires_at)?;

    Ok(Json(license.into()))
}

/// GET /admin/licenses
pub async fn list_licenses(
    State(state): State<AppState>,
    admin: AdminAccess,
) -> Result<Json<Vec<License>>> {
    Ok(Json(state.licenses.list(&admin)?))
}

/// POST /admin/deactivate
pub async fn deactivate_license(
    State(state): State<AppState>,
    admin: AdminAccess,
    Json(req): Json<DeactivateLicense>,
) -> Result<Json<DeactivateResponse>> {
    let key = req
        .key
        .ok_or_else(|| AppError::MissingParameters("key is required".into()))?;
    let existed = state.licenses.deactivate(&admin, &key)?;

    Ok(Json(DeactivateResponse { success: existed }))
}
