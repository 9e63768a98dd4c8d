use crate::{error::AppError, state::AppState};
use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

/// Requires `Authorization: Bearer <CRON_SECRET>` when a secret is configured.
pub async fn scheduler_auth(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(secret) = state.config.cron_secret.as_deref() else {
        return Ok(next.run(req).await);
    };

    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized("Missing scheduler credentials".to_string()))?;

    if !bool::from(token.as_bytes().ct_eq(secret.as_bytes())) {
        return Err(AppError::Unauthorized(
            "Invalid scheduler credentials".to_string(),
        ));
    }

    Ok(next.run(req).await)
}
