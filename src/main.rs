use std::sync::Arc;

use reminder_dispatch::{
    channel::{EmailSender, HttpEmailTransport, PushSender, WebPushTransport},
    db::{create_pool, run_migrations},
    dispatch::{start_reminder_scheduler, ReminderDispatcher},
    ledger::SendLedgerRepository,
    profile::ProfileRepository,
    push_subscription::SubscriptionRepository,
    recipient::RecipientResolver,
    reminder::ReminderRepository,
    routes::create_router,
    state::{AppState, Config},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,reminder_dispatch=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env()?);

    tracing::info!("Connecting to database...");
    let db = create_pool(&config.database_url).await?;

    tracing::info!("Running migrations...");
    run_migrations(&db).await?;

    let timeout = config.dispatch.send_timeout;
    let email = EmailSender::new(
        Arc::new(HttpEmailTransport::new(&config.email, timeout)),
        config.email.from.clone(),
        config.email.app_url.clone(),
    );
    let push = match &config.vapid {
        Some(vapid) => Some(PushSender::new(Arc::new(WebPushTransport::new(
            vapid.clone(),
            timeout,
        )?))),
        None => {
            tracing::warn!("VAPID keys not configured, push reminders are disabled");
            None
        }
    };

    let dispatcher = ReminderDispatcher::new(
        Arc::new(ReminderRepository::new(db.clone())),
        RecipientResolver::new(
            Arc::new(ProfileRepository::new(db.clone())),
            Arc::new(SubscriptionRepository::new(db.clone())),
        ),
        Arc::new(SendLedgerRepository::new(db.clone())),
        email,
        push,
        config.dispatch,
    );

    let state = AppState {
        config: config.clone(),
        dispatcher: Arc::new(dispatcher),
    };

    if let Some(schedule) = config.reminder_cron.clone() {
        let scheduler_state = state.clone();
        tokio::spawn(async move {
            if let Err(e) = start_reminder_scheduler(scheduler_state, &schedule).await {
                tracing::error!("Reminder scheduler error: {:?}", e);
            }
        });
    }

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
