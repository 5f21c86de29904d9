//! Assistant delegate
//!
//! Builds a ledger-derived context for the caller and submits it with their
//! raw message to the LLM capability. Capability faults never escape: they
//! render as a degraded reply and the webhook request still succeeds.

use std::sync::Arc;
use tracing::{debug, warn};

use ledgerstore::{Contribution, LedgerStore, Member, StoreError};

use crate::domain::{MemberRole, title_case};
use crate::llm::{CompletionRequest, LlmClient, Message};
use crate::prompts::{ContextRecord, MemberContext, render_member_context};

const NO_RECORDS_REPLY: &str = "⚠️ You haven't made any contributions yet.";

/// LLM-backed assistant for free-form questions
pub struct AssistantDelegate {
    ledger: Arc<dyn LedgerStore>,
    llm: Arc<dyn LlmClient>,
    currency: String,
    max_tokens: u32,
}

impl AssistantDelegate {
    pub fn new(
        ledger: Arc<dyn LedgerStore>,
        llm: Arc<dyn LlmClient>,
        currency: impl Into<String>,
        max_tokens: u32,
    ) -> Self {
        Self {
            ledger,
            llm,
            currency: currency.into(),
            max_tokens,
        }
    }

    /// Answer a free-form question with ledger context
    ///
    /// Callers with no contribution history short-circuit to a fixed reply
    /// without spending a model call.
    pub async fn handle(&self, phone: &str, message: &str) -> Result<String, StoreError> {
        let Some(member) = self.ledger.find_member_by_phone(phone).await? else {
            return Ok(NO_RECORDS_REPLY.to_string());
        };

        let records = self.ledger.contributions_for_member(&member.id).await?;
        if records.is_empty() {
            debug!(member_id = %member.id, "no contribution history, skipping LLM call");
            return Ok(NO_RECORDS_REPLY.to_string());
        }

        let role = if self.ledger.is_admin(phone).await? {
            MemberRole::Admin
        } else {
            MemberRole::Member
        };

        let context = self.build_context(&member, role, &records);
        let system_prompt = match render_member_context(&context) {
            Ok(rendered) => rendered,
            Err(e) => {
                warn!(error = %e, "context template render failed");
                return Ok(format!("⚠️ AI Error: {e}"));
            }
        };

        let request = CompletionRequest {
            system_prompt,
            messages: vec![Message::user(message)],
            max_tokens: self.max_tokens,
        };

        match self.llm.complete(request).await {
            Ok(response) => Ok(response
                .content
                .unwrap_or_else(|| "⚠️ AI Error: empty completion".to_string())),
            Err(e) => {
                warn!(error = %e, "assistant call failed");
                Ok(format!("⚠️ AI Error: {e}"))
            }
        }
    }

    fn build_context(&self, member: &Member, role: MemberRole, records: &[Contribution]) -> MemberContext {
        let total_paid: f64 = records.iter().map(|c| c.amount).sum();

        // Distinct periods in first-seen order
        let mut months_paid: Vec<&str> = Vec::new();
        for c in records {
            if !months_paid.contains(&c.period.as_str()) {
                months_paid.push(&c.period);
            }
        }

        MemberContext {
            role: role.as_str(),
            name: member.name.clone(),
            currency: self.currency.clone(),
            total_paid: total_paid as i64,
            months_paid: months_paid.join(", "),
            records: records
                .iter()
                .map(|c| ContextRecord {
                    period: c.period.clone(),
                    category: title_case(&c.category),
                    currency: self.currency.clone(),
                    amount: c.amount as i64,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::mock::MockLlmClient;
    use ledgerstore::{MemoryLedger, NewContribution};

    async fn seeded_ledger() -> (Arc<MemoryLedger>, Member) {
        let ledger = Arc::new(MemoryLedger::new());
        let member = ledger.insert_member("Wanjiku Kamau", "+254700000001").await.unwrap();
        (ledger, member)
    }

    async fn add_contribution(ledger: &MemoryLedger, member_id: &str, period: &str, category: &str, amount: f64) {
        ledger
            .insert_contribution(NewContribution {
                member_id: member_id.to_string(),
                amount,
                period: period.to_string(),
                category: category.to_string(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_no_history_short_circuits_without_llm_call() {
        let (ledger, _member) = seeded_ledger().await;
        let llm = Arc::new(MockLlmClient::replying("should not be called"));

        let delegate = AssistantDelegate::new(ledger, llm.clone(), "KES", 512);
        let reply = delegate.handle("+254700000001", "how much do I owe?").await.unwrap();

        assert_eq!(reply, "⚠️ You haven't made any contributions yet.");
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_caller_short_circuits() {
        let ledger = Arc::new(MemoryLedger::new());
        let llm = Arc::new(MockLlmClient::replying("nope"));

        let delegate = AssistantDelegate::new(ledger, llm.clone(), "KES", 512);
        let reply = delegate.handle("+254799999999", "hello").await.unwrap();

        assert_eq!(reply, "⚠️ You haven't made any contributions yet.");
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_returns_completion_text() {
        let (ledger, member) = seeded_ledger().await;
        add_contribution(&ledger, &member.id, "March 2025", "welfare", 500.0).await;

        let llm = Arc::new(MockLlmClient::replying("You have paid KES 500 so far."));
        let delegate = AssistantDelegate::new(ledger, llm.clone(), "KES", 512);

        let reply = delegate.handle("+254700000001", "what have I paid?").await.unwrap();
        assert_eq!(reply, "You have paid KES 500 so far.");
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_capability_fault_degrades_to_error_reply() {
        let (ledger, member) = seeded_ledger().await;
        add_contribution(&ledger, &member.id, "March 2025", "welfare", 500.0).await;

        let llm = Arc::new(MockLlmClient::failing("quota exceeded"));
        let delegate = AssistantDelegate::new(ledger, llm, "KES", 512);

        let reply = delegate.handle("+254700000001", "hello?").await.unwrap();
        assert!(reply.starts_with("⚠️ AI Error:"));
        assert!(reply.contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_context_summarizes_history() {
        let (ledger, member) = seeded_ledger().await;
        add_contribution(&ledger, &member.id, "March 2025", "welfare", 500.0).await;
        add_contribution(&ledger, &member.id, "March 2025", "savings", 300.0).await;
        add_contribution(&ledger, &member.id, "April 2025", "welfare", 500.0).await;
        ledger.insert_admin("+254700000001").await.unwrap();

        let llm = Arc::new(MockLlmClient::replying("ok"));
        let delegate = AssistantDelegate::new(ledger.clone(), llm, "KES", 512);

        let records = ledger.contributions_for_member(&member.id).await.unwrap();
        let context = delegate.build_context(&member, MemberRole::Admin, &records);

        assert_eq!(context.role, "admin");
        assert_eq!(context.total_paid, 1300);
        assert_eq!(context.months_paid, "March 2025, April 2025");
        assert_eq!(context.records.len(), 3);
        assert_eq!(context.records[0].category, "Welfare");
    }
}
