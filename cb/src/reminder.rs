//! Reminder job
//!
//! A batch sweep over every member: aggregate the current period's
//! contributions, and message anyone short of a configured target with one
//! combined list of what they still owe. No dedup state is kept - running
//! the sweep twice in one period sends twice. At-least-once, by design.

use futures::StreamExt;
use futures::stream;
use std::sync::Arc;
use tracing::{info, warn};

use ledgerstore::{LedgerStore, Member, StoreError};

use crate::balance::{aggregate_by_category, outstanding};
use crate::config::ContributionsConfig;
use crate::domain::title_case;
use crate::outbound::Messenger;

/// Members are independent, so the sweep runs a few in parallel; the bound
/// keeps us inside the messaging API's rate limits.
const MAX_IN_FLIGHT: usize = 8;

/// Outcome counts from one reminder sweep
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ReminderStats {
    /// Members examined
    pub members: usize,
    /// Members with unpaid categories who were messaged
    pub reminded: usize,
    /// Sends that failed (logged, not retried)
    pub send_failures: usize,
}

enum Outcome {
    FullyPaid,
    Sent,
    SendFailed,
}

/// Batch sweep that nudges members with unpaid categories
pub struct ReminderJob {
    ledger: Arc<dyn LedgerStore>,
    messenger: Arc<dyn Messenger>,
    contributions: ContributionsConfig,
}

impl ReminderJob {
    pub fn new(
        ledger: Arc<dyn LedgerStore>,
        messenger: Arc<dyn Messenger>,
        contributions: ContributionsConfig,
    ) -> Self {
        Self {
            ledger,
            messenger,
            contributions,
        }
    }

    /// Run one sweep for the given period
    pub async fn run(&self, period: &str) -> Result<ReminderStats, StoreError> {
        let members = self.ledger.list_members().await?;
        info!(member_count = members.len(), %period, "reminder sweep starting");

        let mut stats = ReminderStats {
            members: members.len(),
            ..Default::default()
        };

        let mut outcomes = stream::iter(members)
            .map(|member| self.remind_member(member, period))
            .buffer_unordered(MAX_IN_FLIGHT);

        while let Some(outcome) = outcomes.next().await {
            match outcome? {
                Outcome::FullyPaid => {}
                Outcome::Sent => stats.reminded += 1,
                Outcome::SendFailed => stats.send_failures += 1,
            }
        }

        info!(?stats, "reminder sweep finished");
        Ok(stats)
    }

    async fn remind_member(&self, member: Member, period: &str) -> Result<Outcome, StoreError> {
        let contributions = self.ledger.contributions_for_period(&member.id, period).await?;
        let totals = aggregate_by_category(&contributions);
        let owed = outstanding(&totals, &self.contributions.targets);

        if owed.is_empty() {
            return Ok(Outcome::FullyPaid);
        }

        let items: Vec<String> = owed
            .iter()
            .map(|(category, amount)| {
                format!("{} ({} {})", title_case(category), self.contributions.currency, *amount as i64)
            })
            .collect();

        let message = format!(
            "📤 Hello {}, you still owe for {}: {}. Please contribute today!",
            member.name,
            period,
            items.join(", ")
        );

        match self.messenger.send(&member.phone, &message).await {
            Ok(()) => Ok(Outcome::Sent),
            Err(e) => {
                warn!(phone = %member.phone, error = %e, "reminder send failed");
                Ok(Outcome::SendFailed)
            }
        }
    }
}
