pub mod channel;
pub mod db;
pub mod dispatch;
pub mod error;
pub mod ledger;
pub mod middleware;
pub mod profile;
pub mod push_subscription;
pub mod recipient;
pub mod reminder;
pub mod routes;
pub mod state;
