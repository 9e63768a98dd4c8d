pub mod auth;

pub use auth::scheduler_auth;
