use axum::{
    middleware,
    routing::post,
    Router,
};

use super::dispatch_handlers;
use crate::{middleware::scheduler_auth, state::AppState};

pub fn reminder_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/email/run", post(dispatch_handlers::run_email_reminders))
        .route("/push/run", post(dispatch_handlers::run_push_reminders))
        .route_layer(middleware::from_fn_with_state(state, scheduler_auth))
}
