use chrono::Utc;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use tracing::{error, info};

use crate::{error::DispatchError, state::AppState};

/// Runs both channels on `schedule` (six-field cron, seconds first).
pub async fn start_reminder_scheduler(
    state: AppState,
    schedule: &str,
) -> Result<(), JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_async(schedule, move |_uuid, _l| {
        let state = state.clone();

        Box::pin(async move {
            let now = Utc::now();

            match state.dispatcher.run_email_reminders(now).await {
                Ok(report) => info!("Scheduled email run sent {}", report.sent),
                Err(e) => error!("Scheduled email run failed: {}", e),
            }

            match state.dispatcher.run_push_reminders(now).await {
                Ok(report) => info!("Scheduled push run sent {}", report.sent),
                Err(DispatchError::ChannelNotConfigured(_)) => {}
                Err(e) => error!("Scheduled push run failed: {}", e),
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    info!("Reminder scheduler started ({})", schedule);
    Ok(())
}
