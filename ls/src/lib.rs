//! LedgerStore - persistent tables for a chama savings group
//!
//! The ledger is insert-only: members and contributions are created once and
//! never updated or deleted. Balances are always derived by aggregating
//! contribution rows, so the store needs no read-modify-write path and the
//! only consistency guarantee it must provide is per-row atomicity plus the
//! phone uniqueness constraint on members.
//!
//! # Modules
//!
//! - [`records`] - typed Member and Contribution records
//! - [`store`] - the [`LedgerStore`] capability trait
//! - [`sqlite`] - rusqlite-backed implementation
//! - [`memory`] - in-memory implementation for tests

pub mod error;
pub mod memory;
pub mod records;
pub mod sqlite;
pub mod store;

pub use error::StoreError;
pub use memory::MemoryLedger;
pub use records::{Contribution, Member, NewContribution};
pub use sqlite::SqliteLedger;
pub use store::LedgerStore;

/// Current time as Unix milliseconds
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
