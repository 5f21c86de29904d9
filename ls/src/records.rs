//! Typed ledger records
//!
//! These are the rows the store hands back to the core. Reading a row with a
//! missing required field fails with [`StoreError::MalformedRecord`] at the
//! store boundary instead of panicking at first field access.

use serde::{Deserialize, Serialize};

/// A registered chama member
///
/// Created on first registration, never deleted. The phone number is the
/// unique lookup key; `id` is store-assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Store-assigned identifier (UUIDv7 string)
    pub id: String,

    /// Full display name, title-cased at registration
    pub name: String,

    /// Canonical phone number, unique across members
    pub phone: String,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
}

/// A single recorded payment
///
/// Immutable once created. `period` is derived from the record's creation
/// time, never supplied by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    /// Store-assigned identifier (UUIDv7 string)
    pub id: String,

    /// The member this payment belongs to
    pub member_id: String,

    /// Parsed payment amount in the group's currency
    pub amount: f64,

    /// Calendar month+year bucket, e.g. "March 2025"
    pub period: String,

    /// Labeled purpose, lowercased; "general" when the sender gave none
    pub category: String,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
}

/// Fields for a contribution insert; id and created_at are store-assigned
#[derive(Debug, Clone)]
pub struct NewContribution {
    pub member_id: String,
    pub amount: f64,
    pub period: String,
    pub category: String,
}
