//! Comment text, evaluation summaries and escalation e-mail text

use serde::{Deserialize, Serialize};
use shared_types::{EscalationLevel, Violation};

use crate::severity::SeverityResolver;

/// Quoted text longer than this is shortened in the comment prefix
const PREFIX_QUOTE_MAX_CHARS: usize = 50;

/// Comment body for a violation: the approval line, then the explanation.
///
/// With `quoted` set, the comment starts with `[Re: '<quoted>']` so readers
/// can tell which clause it refers to.
pub fn format_comment(violation: &Violation, quoted: Option<&str>) -> String {
    let body = format!(
        "{} approval required\n\n{}",
        violation.escalation_level, violation.comment_body
    );
    match quoted {
        Some(quoted) => format!("[Re: '{}']\n\n{}", shorten_quote(quoted), body),
        None => body,
    }
}

fn shorten_quote(quoted: &str) -> String {
    if quoted.chars().count() <= PREFIX_QUOTE_MAX_CHARS {
        quoted.to_string()
    } else {
        let head: String = quoted.chars().take(PREFIX_QUOTE_MAX_CHARS - 3).collect();
        format!("{}...", head)
    }
}

/// Legend lines mapping highlight colors to approval levels
pub fn color_guide() -> Vec<String> {
    EscalationLevel::ALL
        .iter()
        .map(|level| {
            format!(
                "{} = {} approval",
                SeverityResolver::color_name(*level),
                level
            )
        })
        .collect()
}

/// Headline numbers of an evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub violation_count: usize,
    pub anchored_count: usize,
    pub skipped_count: usize,
    /// `None` when the contract has no violations
    pub highest_escalation: Option<EscalationLevel>,
}

impl EvaluationSummary {
    pub fn headline(&self) -> String {
        if self.violation_count == 0 {
            return "No policy violations found. The contract complies with all approval matrix rules."
                .to_string();
        }
        let highest = self
            .highest_escalation
            .map(|level| level.label())
            .unwrap_or("None");
        format!(
            "{} contract term(s) deviate from policy; {} of {} comment(s) placed. Highest approval level required: {}.",
            self.violation_count, self.anchored_count, self.violation_count, highest
        )
    }
}

/// Rendered escalation e-mail. Delivery is left to the mail collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationEmail {
    pub subject: String,
    pub body: String,
}

pub fn escalation_email(
    recipient_name: &str,
    contract_title: &str,
    contract_url: &str,
    violations_summary: &str,
    escalation_level: EscalationLevel,
) -> EscalationEmail {
    let guide: String = color_guide()
        .iter()
        .map(|line| format!("- {}\n", line))
        .collect();

    let body = format!(
        "Dear {recipient_name},\n\n\
         Approval is required for the following contract that has been evaluated and requires escalation to {escalation_level}.\n\n\
         Contract: {contract_title}\n\
         Review here: {contract_url}\n\n\
         Summary of Policy Violations:\n\
         {violations_summary}\n\n\
         Please review the contract at your earliest convenience. The violations have been highlighted in the document with color-coded backgrounds and detailed comments.\n\n\
         Color Guide:\n\
         {guide}\n\
         Best regards,\n\
         Contract Approval System\n"
    );

    EscalationEmail {
        subject: format!("Contract Approval Required: {}", contract_title),
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shared_types::Severity;

    fn violation() -> Violation {
        Violation {
            category: "Liability".to_string(),
            condition: "Liability cap above 100%".to_string(),
            severity: Severity::High,
            escalation_level: EscalationLevel::Ceo,
            clause_text: "Total liability cap shall be 500%".to_string(),
            comment_body: "Cap is five times the contract price.".to_string(),
        }
    }

    #[test]
    fn test_format_comment_without_prefix() {
        assert_eq!(
            format_comment(&violation(), None),
            "CEO approval required\n\nCap is five times the contract price."
        );
    }

    #[test]
    fn test_format_comment_shortens_long_quote() {
        let quote = "a".repeat(60);
        let comment = format_comment(&violation(), Some(&quote));
        let expected_prefix = format!("[Re: '{}...']\n\nCEO approval required", "a".repeat(47));
        assert!(comment.starts_with(&expected_prefix));

        let short = format_comment(&violation(), Some("500%"));
        assert!(short.starts_with("[Re: '500%']\n\n"));
    }

    #[test]
    fn test_color_guide() {
        assert_eq!(
            color_guide(),
            vec![
                "Yellow = Head of BU approval".to_string(),
                "Orange = BA President approval".to_string(),
                "Red = CEO approval".to_string(),
            ]
        );
    }

    #[test]
    fn test_summary_headline() {
        let summary = EvaluationSummary {
            violation_count: 3,
            anchored_count: 2,
            skipped_count: 1,
            highest_escalation: Some(EscalationLevel::BaPresident),
        };
        assert_eq!(
            summary.headline(),
            "3 contract term(s) deviate from policy; 2 of 3 comment(s) placed. Highest approval level required: BA President."
        );

        let clean = EvaluationSummary {
            violation_count: 0,
            anchored_count: 0,
            skipped_count: 0,
            highest_escalation: None,
        };
        assert!(clean.headline().starts_with("No policy violations found"));
    }

    #[test]
    fn test_escalation_email() {
        let email = escalation_email(
            "Antti",
            "Supply Agreement",
            "https://docs.google.com/document/d/abc/edit",
            "- Liability cap of 500%",
            EscalationLevel::Ceo,
        );
        assert_eq!(email.subject, "Contract Approval Required: Supply Agreement");
        assert!(email.body.starts_with("Dear Antti,\n\n"));
        assert!(email.body.contains("requires escalation to CEO."));
        assert!(email.body.contains("- Red = CEO approval\n"));
        assert!(email.body.ends_with("Contract Approval System\n"));
    }
}
