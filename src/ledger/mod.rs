pub mod dedupe;
pub mod ledger_models;
pub mod ledger_repository;

pub use dedupe::dedupe_key;
pub use ledger_models::SendLogEntry;
pub use ledger_repository::{InMemorySendLedger, SendLedger, SendLedgerRepository};
