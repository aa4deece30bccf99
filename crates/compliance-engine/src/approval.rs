//! Contract approval matrix
//!
//! Each rule names a contract condition and, per organizational role, how
//! that role is involved when the condition is triggered. The role marked
//! `Approves/Decides` is the escalation level a violation of the rule needs.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use shared_types::EscalationLevel;

use crate::error::Result;
use crate::recommendation::normalize_condition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvolvementLevel {
    #[serde(rename = "Prepares/Initiates")]
    PreparesInitiates,
    #[serde(rename = "Support required")]
    SupportRequired,
    #[serde(rename = "Always involved")]
    AlwaysInvolved,
    #[serde(rename = "Approves/Decides")]
    ApprovesDecides,
}

impl InvolvementLevel {
    pub fn label(&self) -> &'static str {
        match self {
            InvolvementLevel::PreparesInitiates => "Prepares/Initiates",
            InvolvementLevel::SupportRequired => "Support required",
            InvolvementLevel::AlwaysInvolved => "Always involved",
            InvolvementLevel::ApprovesDecides => "Approves/Decides",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRule {
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Condition")]
    pub condition: String,
    /// Roles in the order the matrix lists them
    #[serde(rename = "Approval_Matrix", with = "ordered_roles")]
    pub approval_matrix: Vec<(String, InvolvementLevel)>,
}

impl ApprovalRule {
    /// Highest escalation role that approves this rule. Roles outside the
    /// escalation ladder (legal, finance, ...) are ignored.
    pub fn required_escalation(&self) -> Option<EscalationLevel> {
        self.approval_matrix
            .iter()
            .filter(|(_, level)| *level == InvolvementLevel::ApprovesDecides)
            .filter_map(|(role, _)| role.parse::<EscalationLevel>().ok())
            .max()
    }

    pub fn involvement(&self, role: &str) -> Option<InvolvementLevel> {
        self.approval_matrix
            .iter()
            .find(|(name, _)| name == role)
            .map(|(_, level)| *level)
    }
}

/// Serde for a JSON object of role to involvement, keeping key order
mod ordered_roles {
    use std::fmt;

    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};

    use super::InvolvementLevel;

    pub fn serialize<S: Serializer>(
        roles: &[(String, InvolvementLevel)],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(roles.len()))?;
        for (role, level) in roles {
            map.serialize_entry(role, level)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<(String, InvolvementLevel)>, D::Error> {
        deserializer.deserialize_map(RolesVisitor)
    }

    struct RolesVisitor;

    impl<'de> Visitor<'de> for RolesVisitor {
        type Value = Vec<(String, InvolvementLevel)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of role names to involvement levels")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut roles = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some(entry) = access.next_entry::<String, InvolvementLevel>()? {
                roles.push(entry);
            }
            Ok(roles)
        }
    }
}

/// Layout used when embedding the matrix in an analysis prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatrixFormat {
    #[default]
    Markdown,
    Structured,
    Compact,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApprovalMatrix {
    pub rules: Vec<ApprovalRule>,
}

impl ApprovalMatrix {
    pub fn new(rules: Vec<ApprovalRule>) -> Self {
        Self { rules }
    }

    /// Parse the matrix; unknown involvement labels are rejected here
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Rule for a condition, compared trimmed and case-insensitively
    pub fn find_condition(&self, condition: &str) -> Option<&ApprovalRule> {
        let wanted = normalize_condition(condition);
        self.rules
            .iter()
            .find(|r| normalize_condition(&r.condition) == wanted)
    }

    pub fn render(&self, format: MatrixFormat) -> String {
        match format {
            MatrixFormat::Markdown => self.render_markdown(),
            MatrixFormat::Structured => self.render_structured(),
            MatrixFormat::Compact => self.render_compact(),
        }
    }

    fn render_markdown(&self) -> String {
        let mut out = String::from("# Contract Approval Matrix\n\n");
        out.push_str("Use this matrix to determine required approvals for contract terms:\n\n");

        // Categories in first-seen order
        let mut categories: Vec<&str> = Vec::new();
        for rule in &self.rules {
            if !categories.contains(&rule.category.as_str()) {
                categories.push(&rule.category);
            }
        }

        for category in categories {
            let _ = writeln!(out, "## {}\n", category);
            for rule in self.rules.iter().filter(|r| r.category == category) {
                let _ = writeln!(out, "### Condition: {}\n", rule.condition);
                out.push_str("| Role | Involvement Level |\n");
                out.push_str("|------|-------------------|\n");
                for (role, level) in &rule.approval_matrix {
                    let _ = writeln!(out, "| {} | {} |", role, level.label());
                }
                out.push('\n');
            }
        }

        out
    }

    fn render_structured(&self) -> String {
        let rule_line = "-".repeat(80);
        let mut out = format!("CONTRACT APPROVAL MATRIX\n{}\n\n", "=".repeat(80));

        for (i, rule) in self.rules.iter().enumerate() {
            let _ = writeln!(out, "RULE #{}", i + 1);
            let _ = writeln!(out, "{}", rule_line);
            let _ = writeln!(out, "Category: {}", rule.category);
            let _ = writeln!(out, "Trigger Condition: {}", rule.condition);
            out.push_str("\nRequired Approvals:\n");
            for (role, level) in &rule.approval_matrix {
                let _ = writeln!(out, "  • {}: {}", role, level.label());
            }
            out.push('\n');
        }

        out
    }

    fn render_compact(&self) -> String {
        let mut lines = vec!["CONTRACT APPROVAL RULES:".to_string()];
        for (i, rule) in self.rules.iter().enumerate() {
            let approvers: Vec<String> = rule
                .approval_matrix
                .iter()
                .map(|(role, level)| format!("{}({})", role, level.label()))
                .collect();
            lines.push(format!(
                "{}. [{}] IF {} THEN REQUIRE: {}",
                i + 1,
                rule.category,
                rule.condition,
                approvers.join(", ")
            ));
        }
        lines.join("\n")
    }
}
