//! Balance engine
//!
//! Aggregates a member's contributions for the current period and reports
//! them against the configured expected targets. Only the configured
//! categories are surfaced; anything contributed under another name stays in
//! the ledger but never appears in the report.

use std::collections::HashMap;

use ledgerstore::{Contribution, LedgerStore, StoreError};

use crate::config::{CategoryTarget, ContributionsConfig};
use crate::domain::{current_period, title_case};

/// Sum contribution amounts per category
///
/// Rows with an empty category normalize to "general".
pub fn aggregate_by_category(contributions: &[Contribution]) -> HashMap<String, f64> {
    let mut totals = HashMap::new();
    for c in contributions {
        let category = if c.category.is_empty() { "general" } else { c.category.as_str() };
        *totals.entry(category.to_string()).or_insert(0.0) += c.amount;
    }
    totals
}

/// Categories still short of their target, as (category, outstanding) pairs
/// in target order
pub fn outstanding(totals: &HashMap<String, f64>, targets: &[CategoryTarget]) -> Vec<(String, f64)> {
    targets
        .iter()
        .filter_map(|target| {
            let paid = totals.get(&target.category).copied().unwrap_or(0.0);
            let owed = target.amount - paid;
            (owed > 0.0).then(|| (target.category.clone(), owed))
        })
        .collect()
}

/// One report line per configured target, in target order
pub fn report_lines(
    totals: &HashMap<String, f64>,
    targets: &[CategoryTarget],
    currency: &str,
) -> Vec<String> {
    targets
        .iter()
        .map(|target| {
            let paid = totals.get(&target.category).copied().unwrap_or(0.0);
            let balance = target.amount - paid;
            let category = title_case(&target.category);
            if balance <= 0.0 {
                format!("✅ {}: Fully paid ({} {})", category, currency, paid as i64)
            } else {
                format!(
                    "⚠️ {}: You owe {} {} (Paid: {})",
                    category, currency, balance as i64, paid as i64
                )
            }
        })
        .collect()
}

/// Build the current-period balance report for a caller
pub async fn handle(
    ledger: &dyn LedgerStore,
    config: &ContributionsConfig,
    phone: &str,
) -> Result<String, StoreError> {
    let Some(member) = ledger.find_member_by_phone(phone).await? else {
        return Ok("⚠️ You're not registered.".to_string());
    };

    let period = current_period();
    let contributions = ledger.contributions_for_period(&member.id, &period).await?;
    let totals = aggregate_by_category(&contributions);
    let lines = report_lines(&totals, &config.targets, &config.currency);

    Ok(format!("📊 *Your balance for {}:*\n{}", period, lines.join("\n")))
}
