use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::reminder::Channel;

/// Failure reading reminders, profiles or subscriptions.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum LedgerError {
    /// A log entry with this dedupe key already exists.
    #[error("Dedupe key already recorded: {0}")]
    Conflict(String),

    #[error("Send ledger unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        LedgerError::Unavailable(err.to_string())
    }
}

/// Failure delivering one message to one target.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    #[error("Delivery rejected: {0}")]
    Rejected(String),

    /// The push endpoint is no longer valid and should be pruned.
    #[error("Endpoint gone: {0}")]
    Gone(String),

    #[error("Transport unavailable: {0}")]
    Unavailable(String),
}

impl SendError {
    pub fn kind(&self) -> &'static str {
        match self {
            SendError::Rejected(_) => "rejected",
            SendError::Gone(_) => "gone",
            SendError::Unavailable(_) => "unavailable",
        }
    }
}

impl From<reqwest::Error> for SendError {
    fn from(err: reqwest::Error) -> Self {
        SendError::Unavailable(err.to_string())
    }
}

/// Fatal, run-level failure. Per-reminder failures never surface here.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Failed to load reminders: {0}")]
    Load(#[from] StoreError),

    #[error("The {0} channel is not configured")]
    ChannelNotConfigured(Channel),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Dispatch(ref e) => {
                tracing::error!("Reminder run failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            AppError::Unauthorized(ref msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_error_kind() {
        assert_eq!(SendError::Rejected("bad".into()).kind(), "rejected");
        assert_eq!(SendError::Gone("410".into()).kind(), "gone");
        assert_eq!(SendError::Unavailable("timeout".into()).kind(), "unavailable");
    }

    #[test]
    fn test_dispatch_error_maps_to_500() {
        let err = AppError::from(DispatchError::Load(StoreError::Unavailable(
            "connection refused".into(),
        )));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_unauthorized_maps_to_401() {
        let err = AppError::Unauthorized("Invalid scheduler credentials".into());
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }
}
