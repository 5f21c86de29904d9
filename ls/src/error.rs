//! Ledger store error types

use thiserror::Error;

/// Errors that can occur during ledger store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Malformed {table} record: missing field '{field}'")]
    MalformedRecord {
        table: &'static str,
        field: &'static str,
    },

    #[error("A member is already registered for phone {phone}")]
    DuplicateMember { phone: String },

    #[error("No member found for id {0}")]
    UnknownMember(String),
}

impl StoreError {
    /// Check whether this error is the uniqueness constraint firing on a
    /// concurrent registration of the same phone.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::DuplicateMember { .. })
    }
}
