//! Contribution parsing and recording
//!
//! The parser pulls an amount and optional category out of free text; the
//! recorder turns a successful parse into exactly one ledger insert stamped
//! with the processing-time period.

use regex::Regex;
use std::sync::LazyLock;
use tracing::info;

use ledgerstore::{LedgerStore, NewContribution, StoreError};

use crate::config::ContributionsConfig;
use crate::domain::current_period;

/// First run of 2-6 digits, optionally followed by "for <word>"
static AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{2,6})(?:\s*for\s*(\w+))?").expect("hardcoded pattern"));

/// A successfully parsed contribution message
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedContribution {
    pub amount: f64,
    pub category: Option<String>,
}

impl ParsedContribution {
    /// The category to record, falling back to the configured default
    pub fn category_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.category.as_deref().unwrap_or(default)
    }
}

/// Extract an amount and category from free text
///
/// Returns `None` when the message has no 2-6 digit run. The category is
/// taken verbatim (lowercased) - a misspelled category is accepted and
/// tracked under its own name.
pub fn parse_contribution(message: &str) -> Option<ParsedContribution> {
    let lower = message.to_lowercase();
    let caps = AMOUNT_RE.captures(&lower)?;

    let amount: f64 = caps[1].parse().ok()?;
    let category = caps.get(2).map(|m| m.as_str().to_string());

    Some(ParsedContribution { amount, category })
}

/// Parse the message and record one contribution for the caller
///
/// The caller must already be a member; unknown phones get a registration
/// nudge and no insert happens. The period is always the current processing
/// month, regardless of message wording.
pub async fn handle(
    ledger: &dyn LedgerStore,
    config: &ContributionsConfig,
    phone: &str,
    message: &str,
) -> Result<String, StoreError> {
    let Some(parsed) = parse_contribution(message) else {
        return Ok("⚠️ I couldn't understand that. Try: 'I paid 500 for welfare'.".to_string());
    };

    let Some(member) = ledger.find_member_by_phone(phone).await? else {
        return Ok("⚠️ You're not registered. Please send your full name.".to_string());
    };

    let category = parsed.category_or(&config.default_category).to_string();
    let contribution = ledger
        .insert_contribution(NewContribution {
            member_id: member.id.clone(),
            amount: parsed.amount,
            period: current_period(),
            category,
        })
        .await?;

    info!(
        member_id = %member.id,
        amount = contribution.amount,
        category = %contribution.category,
        period = %contribution.period,
        "contribution recorded"
    );

    Ok(format!(
        "✅ Got {} {} for {}. Thanks {}!",
        config.currency, contribution.amount as i64, contribution.category, member.name
    ))
}
