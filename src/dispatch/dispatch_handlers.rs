use axum::{extract::State, Json};
use chrono::Utc;

use super::dispatch_dto::{HealthResponse, RunSummary};
use crate::{error::Result, state::AppState};

/// Dispatch due email reminders
#[utoipa::path(
    post,
    path = "/api/reminders/email/run",
    responses(
        (status = 200, description = "Run completed", body = RunSummary),
        (status = 401, description = "Missing or invalid scheduler secret", body = ErrorResponse),
        (status = 500, description = "Reminders could not be loaded", body = ErrorResponse)
    ),
    tag = "reminders",
    security(("bearer_auth" = []))
)]
pub async fn run_email_reminders(State(state): State<AppState>) -> Result<Json<RunSummary>> {
    let report = state.dispatcher.run_email_reminders(Utc::now()).await?;

    Ok(Json(report.into()))
}

/// Dispatch due push reminders
#[utoipa::path(
    post,
    path = "/api/reminders/push/run",
    responses(
        (status = 200, description = "Run completed", body = RunSummary),
        (status = 401, description = "Missing or invalid scheduler secret", body = ErrorResponse),
        (status = 500, description = "Reminders could not be loaded or push is not configured", body = ErrorResponse)
    ),
    tag = "reminders",
    security(("bearer_auth" = []))
)]
pub async fn run_push_reminders(State(state): State<AppState>) -> Result<Json<RunSummary>> {
    let report = state.dispatcher.run_push_reminders(Utc::now()).await?;

    Ok(Json(report.into()))
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
