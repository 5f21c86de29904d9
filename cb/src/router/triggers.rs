//! Trigger patterns for intent classification
//!
//! Routing is pure pattern matching on the lowercased message. The keyword
//! sets overlap lexically ("have i paid" contains "paid"), so the order the
//! router checks them in is load-bearing - see the route table.

use regex::Regex;
use std::sync::LazyLock;

static CONTRIBUTION_TRIGGERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bpaid\b|\bsent\b|\btuma\b|\bi have paid\b").expect("hardcoded pattern")
});

static BALANCE_TRIGGERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bbalance\b|\bowe\b|\bhave i paid\b|\bnimeshalipa\b").expect("hardcoded pattern")
});

/// Does this (lowercased) message announce a payment?
pub fn is_contribution(message_lower: &str) -> bool {
    CONTRIBUTION_TRIGGERS.is_match(message_lower)
}

/// Does this (lowercased) message ask about a balance?
pub fn is_balance(message_lower: &str) -> bool {
    BALANCE_TRIGGERS.is_match(message_lower)
}

/// Heuristic for a bare-name registration message: contains whitespace and
/// none of the trigger keywords.
pub fn looks_like_name(message: &str) -> bool {
    let trimmed = message.trim();
    let lower = trimmed.to_lowercase();
    trimmed.contains(char::is_whitespace) && !is_contribution(&lower) && !is_balance(&lower)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contribution_triggers() {
        assert!(is_contribution("i paid 500"));
        assert!(is_contribution("sent 200 for welfare"));
        assert!(is_contribution("nimetuma? no - tuma 300"));
        assert!(is_contribution("i have paid"));
        assert!(!is_contribution("what is my balance"));
        // Word boundaries: "repaid" is not "paid"
        assert!(!is_contribution("loan repaid"));
    }

    #[test]
    fn test_balance_triggers() {
        assert!(is_balance("check balance"));
        assert!(is_balance("what do i owe"));
        assert!(is_balance("have i paid this month?"));
        assert!(is_balance("nimeshalipa?"));
        assert!(!is_balance("hello there"));
    }

    #[test]
    fn test_looks_like_name() {
        assert!(looks_like_name("Wanjiku Kamau"));
        assert!(looks_like_name("  mary   atieno  "));

        // Single word: not enough to register on
        assert!(!looks_like_name("Wanjiku"));

        // Keyword-bearing messages are never names
        assert!(!looks_like_name("i paid 500"));
        assert!(!looks_like_name("my balance please"));
    }
}
