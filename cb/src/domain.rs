//! Shared domain helpers: period keys, roles, name casing

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// The period bucket for a record created right now
///
/// Periods are always derived from processing time, never from message
/// content, so every contribution logged within one calendar month lands
/// under the same key.
pub fn current_period() -> String {
    period_key(Local::now().date_naive())
}

/// Period key for an arbitrary date, e.g. "March 2025"
pub fn period_key(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

/// Whether a caller's free-form messages may reach the assistant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Admin,
    Member,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Admin => "admin",
            MemberRole::Member => "member",
        }
    }
}

/// Title-case a name: first letter of each word upper, rest lower
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_key_format() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        assert_eq!(period_key(date), "March 2025");

        let date = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        assert_eq!(period_key(date), "December 2025");
    }

    #[test]
    fn test_same_month_same_key() {
        let first = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let last = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        assert_eq!(period_key(first), period_key(last));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("wanjiku kamau"), "Wanjiku Kamau");
        assert_eq!(title_case("OTIENO ODHIAMBO"), "Otieno Odhiambo");
        assert_eq!(title_case("  achieng   were "), "Achieng Were");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_role_as_str() {
        assert_eq!(MemberRole::Admin.as_str(), "admin");
        assert_eq!(MemberRole::Member.as_str(), "member");
    }
}
