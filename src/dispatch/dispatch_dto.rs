use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::dispatch_service::RunReport;

/// Result of a completed channel run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RunSummary {
    /// Reminders delivered to at least one target in this run.
    pub sent: usize,
}

impl From<RunReport> for RunSummary {
    fn from(report: RunReport) -> Self {
        Self { sent: report.sent }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}
