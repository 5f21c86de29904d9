//! Registration flow
//!
//! A phone number is either unknown or registered; the only transition is
//! the first message carrying a usable name. The store lookup precedes every
//! insert, so a repeated registration attempt is an informational no-op.

use tracing::info;

use ledgerstore::{LedgerStore, StoreError};

use crate::domain::title_case;
use crate::router::triggers::looks_like_name;

/// Handle a message that landed in the registration/acknowledgment flow
///
/// `supplied_name` is the webhook's explicit name field when present;
/// otherwise a message that reads as a bare name is used. Unknown callers
/// without a usable name are prompted, with no side effect.
pub async fn handle(
    ledger: &dyn LedgerStore,
    phone: &str,
    supplied_name: Option<&str>,
    message: &str,
) -> Result<String, StoreError> {
    if let Some(member) = ledger.find_member_by_phone(phone).await? {
        // Idempotent: a second registration attempt never inserts
        if supplied_name.is_some() || looks_like_name(message) {
            return Ok(format!("✅ You're already registered, {}!", member.name));
        }
        return Ok(
            "✅ You're already registered, type 'Check Balance' or 'I paid 500 for welfare'."
                .to_string(),
        );
    }

    let name = supplied_name
        .map(title_case)
        .or_else(|| looks_like_name(message).then(|| title_case(message)));

    match name {
        Some(name) => {
            let member = ledger.insert_member(&name, phone).await?;
            info!(member_id = %member.id, %phone, "member registered");
            Ok(format!("🎉 {}, you've been registered!", member.name))
        }
        None => Ok("👋 Please reply with your full name to join the chama.".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerstore::MemoryLedger;

    #[tokio::test]
    async fn test_registers_from_bare_name_message() {
        let ledger = MemoryLedger::new();

        let reply = handle(&ledger, "+254700000001", None, "wanjiku kamau").await.unwrap();
        assert_eq!(reply, "🎉 Wanjiku Kamau, you've been registered!");

        let member = ledger.find_member_by_phone("+254700000001").await.unwrap().unwrap();
        assert_eq!(member.name, "Wanjiku Kamau");
    }

    #[tokio::test]
    async fn test_registers_from_supplied_name() {
        let ledger = MemoryLedger::new();

        let reply = handle(&ledger, "+254700000001", Some("otieno odhiambo"), "")
            .await
            .unwrap();
        assert_eq!(reply, "🎉 Otieno Odhiambo, you've been registered!");
    }

    #[tokio::test]
    async fn test_prompts_when_no_usable_name() {
        let ledger = MemoryLedger::new();

        let reply = handle(&ledger, "+254700000001", None, "hello").await.unwrap();
        assert_eq!(reply, "👋 Please reply with your full name to join the chama.");
        assert!(ledger.find_member_by_phone("+254700000001").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_repeat_registration_is_idempotent() {
        let ledger = MemoryLedger::new();

        handle(&ledger, "+254700000001", None, "wanjiku kamau").await.unwrap();
        let reply = handle(&ledger, "+254700000001", None, "wanjiku kamau").await.unwrap();

        assert_eq!(reply, "✅ You're already registered, Wanjiku Kamau!");
        assert_eq!(ledger.list_members().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_registered_caller_without_name_gets_command_hint() {
        let ledger = MemoryLedger::new();
        ledger.insert_member("Wanjiku Kamau", "+254700000001").await.unwrap();

        let reply = handle(&ledger, "+254700000001", None, "hi").await.unwrap();
        assert!(reply.contains("'Check Balance'"));
    }
}
