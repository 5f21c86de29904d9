//! Request-level error taxonomy
//!
//! Only two failure modes escape a flow: a missing caller identity and a
//! ledger store fault. Everything else (unregistered caller, unparsable
//! contribution, assistant fault) renders as a reply string inside the flow,
//! so the HTTP layer sees it as a normal 200 response.

use ledgerstore::StoreError;
use thiserror::Error;

/// Errors that abort a webhook request
#[derive(Debug, Error)]
pub enum BotError {
    #[error("inbound message carries no phone number")]
    MissingIdentity,

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_wraps_transparently() {
        let err = BotError::from(StoreError::MalformedRecord {
            table: "members",
            field: "phone",
        });
        assert_eq!(err.to_string(), "Malformed members record: missing field 'phone'");
    }
}
