pub mod dispatch_dto;
pub mod dispatch_handlers;
pub mod dispatch_scheduler;
pub mod dispatch_service;
pub mod routes;

pub use dispatch_dto::{ErrorResponse, HealthResponse, RunSummary};
pub use dispatch_handlers::{health, run_email_reminders, run_push_reminders};
pub use dispatch_scheduler::start_reminder_scheduler;
pub use dispatch_service::{ReminderDispatcher, ReminderOutcome, RunReport};
