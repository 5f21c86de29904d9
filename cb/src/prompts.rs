//! Assistant prompt templates
//!
//! The system context is compiled into the binary and rendered with
//! Handlebars from ledger-derived data.

use handlebars::Handlebars;
use serde::Serialize;

/// System context for the assistant: who is asking and what they have paid
pub const MEMBER_CONTEXT: &str = r#"You are a helpful chatbot for a community savings group (Chama).
This user is a {{role}}.
Name: {{name}}
Total Paid: {{currency}} {{total_paid}}
Months Paid: {{months_paid}}

Contribution history:
{{#each records}}
- {{this.period}} | {{this.category}}: {{this.currency}} {{this.amount}}
{{/each}}"#;

/// One line-itemized contribution for the context template
#[derive(Debug, Serialize)]
pub struct ContextRecord {
    pub period: String,
    pub category: String,
    pub currency: String,
    pub amount: i64,
}

/// Data for the member context template
#[derive(Debug, Serialize)]
pub struct MemberContext {
    pub role: &'static str,
    pub name: String,
    pub currency: String,
    pub total_paid: i64,
    pub months_paid: String,
    pub records: Vec<ContextRecord>,
}

/// Render the assistant system context
pub fn render_member_context(context: &MemberContext) -> Result<String, handlebars::RenderError> {
    let mut handlebars = Handlebars::new();
    // Prompt text, not HTML
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.render_template(MEMBER_CONTEXT, context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_member_context() {
        let context = MemberContext {
            role: "admin",
            name: "Wanjiku Kamau".to_string(),
            currency: "KES".to_string(),
            total_paid: 800,
            months_paid: "March 2025, April 2025".to_string(),
            records: vec![
                ContextRecord {
                    period: "March 2025".to_string(),
                    category: "Welfare".to_string(),
                    currency: "KES".to_string(),
                    amount: 500,
                },
                ContextRecord {
                    period: "April 2025".to_string(),
                    category: "Savings".to_string(),
                    currency: "KES".to_string(),
                    amount: 300,
                },
            ],
        };

        let rendered = render_member_context(&context).unwrap();

        assert!(rendered.contains("This user is a admin."));
        assert!(rendered.contains("Name: Wanjiku Kamau"));
        assert!(rendered.contains("Total Paid: KES 800"));
        assert!(rendered.contains("Months Paid: March 2025, April 2025"));
        assert!(rendered.contains("- March 2025 | Welfare: KES 500"));
        assert!(rendered.contains("- April 2025 | Savings: KES 300"));
    }

    #[test]
    fn test_render_without_records() {
        let context = MemberContext {
            role: "member",
            name: "Otieno Odhiambo".to_string(),
            currency: "KES".to_string(),
            total_paid: 0,
            months_paid: String::new(),
            records: vec![],
        };

        let rendered = render_member_context(&context).unwrap();
        assert!(rendered.contains("Total Paid: KES 0"));
    }
}
