use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One contiguous run of plain text with its native index range.
///
/// Lengths are counted in `char`s; each character consumes one native index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSegment {
    pub native_start: u64,
    pub native_end: u64,
    pub text: String,
}

impl TextSegment {
    pub fn new(native_start: u64, native_end: u64, text: impl Into<String>) -> Self {
        Self {
            native_start,
            native_end,
            text: text.into(),
        }
    }
}

/// Revision a document reference points at. Only the head revision is tracked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentRevision {
    #[default]
    Head,
}

impl DocumentRevision {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentRevision::Head => "head",
        }
    }
}

/// The document a request operates on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub document_id: String,
    #[serde(default)]
    pub revision: DocumentRevision,
}

impl DocumentRef {
    pub fn head(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            revision: DocumentRevision::Head,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Organizational role required to approve a deviation, in ascending authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EscalationLevel {
    HeadOfBu,
    BaPresident,
    Ceo,
}

impl EscalationLevel {
    pub const ALL: [EscalationLevel; 3] = [
        EscalationLevel::HeadOfBu,
        EscalationLevel::BaPresident,
        EscalationLevel::Ceo,
    ];

    /// Label used by the approval matrix and in comment text
    pub fn label(&self) -> &'static str {
        match self {
            EscalationLevel::HeadOfBu => "Head of BU",
            EscalationLevel::BaPresident => "BA President",
            EscalationLevel::Ceo => "CEO",
        }
    }
}

impl fmt::Display for EscalationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Label that does not name a known escalation role
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown escalation level: {0}")]
pub struct UnknownEscalationLevel(pub String);

impl FromStr for EscalationLevel {
    type Err = UnknownEscalationLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Head of BU" | "HeadOfBU" => Ok(EscalationLevel::HeadOfBu),
            "BA President" | "BAPresident" => Ok(EscalationLevel::BaPresident),
            "CEO" => Ok(EscalationLevel::Ceo),
            other => Err(UnknownEscalationLevel(other.to_string())),
        }
    }
}

impl Serialize for EscalationLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for EscalationLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

/// A clause flagged as a policy violation by the upstream analysis stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub category: String,
    #[serde(alias = "policy_violated")]
    pub condition: String,
    pub severity: Severity,
    pub escalation_level: EscalationLevel,
    pub clause_text: String,
    #[serde(alias = "comment")]
    pub comment_body: String,
}

/// Highlight color with channels in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RgbColor {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl RgbColor {
    pub const YELLOW: RgbColor = RgbColor::new(1.0, 1.0, 0.6);
    pub const ORANGE: RgbColor = RgbColor::new(1.0, 0.7, 0.4);
    pub const RED: RgbColor = RgbColor::new(1.0, 0.6, 0.6);

    pub const fn new(red: f64, green: f64, blue: f64) -> Self {
        Self { red, green, blue }
    }
}

/// How an excerpt was found in the document text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchMethod {
    Exact,
    FallbackSubstring,
    Unmatched,
}

impl MatchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMethod::Exact => "exact",
            MatchMethod::FallbackSubstring => "fallback-substring",
            MatchMethod::Unmatched => "unmatched",
        }
    }
}

impl fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Background highlight over a native index range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightRequest {
    pub native_start: u64,
    pub native_end: u64,
    pub color: RgbColor,
}

/// A violation tied to a native range, ready for the annotation API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchoredComment {
    pub native_range_start: u64,
    pub native_range_length: u64,
    pub highlight_color: RgbColor,
    pub anchor_descriptor: String,
    pub comment_text: String,
    pub match_method: MatchMethod,
    pub highlight: HighlightRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedDeviation {
    pub condition: String,
    pub negotiated_term: String,
}

/// A closed contract from a customer's negotiation record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalContract {
    pub contract_id: i64,
    pub closing_recency: String,
    #[serde(default)]
    pub accepted_deviations: Vec<AcceptedDeviation>,
    pub negotiation_rounds: u32,
}

/// Summary statistics over a customer's historical contracts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub total_contracts: usize,
    pub total_accepted_deviations: usize,
    pub average_negotiation_rounds: f64,
    /// Share of contracts with at least one accepted deviation
    pub acceptance_rate: f64,
    /// Normalized conditions of every accepted deviation
    #[serde(default)]
    pub accepted_conditions: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendedAction {
    ReNegotiate,
    EscalateDirectly,
    CautiousApproach,
}

impl RecommendedAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendedAction::ReNegotiate => "re-negotiate",
            RecommendedAction::EscalateDirectly => "escalate-directly",
            RecommendedAction::CautiousApproach => "cautious-approach",
        }
    }
}

impl fmt::Display for RecommendedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: RecommendedAction,
    pub rationale: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escalation_levels_are_ordered() {
        assert!(EscalationLevel::HeadOfBu < EscalationLevel::BaPresident);
        assert!(EscalationLevel::BaPresident < EscalationLevel::Ceo);
    }

    #[test]
    fn test_escalation_level_parses_matrix_labels() {
        assert_eq!("Head of BU".parse(), Ok(EscalationLevel::HeadOfBu));
        assert_eq!("BAPresident".parse(), Ok(EscalationLevel::BaPresident));
        assert_eq!(" CEO ".parse(), Ok(EscalationLevel::Ceo));
        assert_eq!(
            "CFO".parse::<EscalationLevel>(),
            Err(UnknownEscalationLevel("CFO".to_string()))
        );
    }

    #[test]
    fn test_violation_rejects_unknown_escalation_at_load() {
        let json = r#"{
            "category": "Liability",
            "condition": "Liability cap above 100%",
            "severity": "high",
            "escalation_level": "Board",
            "clause_text": "Total liability cap shall be 500%",
            "comment_body": "Cap exceeds policy"
        }"#;
        let err = serde_json::from_str::<Violation>(json).unwrap_err();
        assert!(err.to_string().contains("Unknown escalation level"));
    }

    #[test]
    fn test_violation_accepts_analysis_field_names() {
        let json = r#"{
            "category": "Payment",
            "policy_violated": "Payment terms over 60 days",
            "severity": "medium",
            "escalation_level": "BA President",
            "clause_text": "due for payment 120 days net",
            "comment": "Payment term too long"
        }"#;
        let violation: Violation = serde_json::from_str(json).unwrap();
        assert_eq!(violation.condition, "Payment terms over 60 days");
        assert_eq!(violation.escalation_level, EscalationLevel::BaPresident);
        assert_eq!(violation.comment_body, "Payment term too long");
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(
            serde_json::to_string(&MatchMethod::FallbackSubstring).unwrap(),
            "\"fallback-substring\""
        );
        assert_eq!(
            serde_json::to_string(&RecommendedAction::ReNegotiate).unwrap(),
            "\"re-negotiate\""
        );
        assert_eq!(
            serde_json::to_string(&EscalationLevel::HeadOfBu).unwrap(),
            "\"Head of BU\""
        );
        assert!(serde_json::from_str::<RecommendedAction>("\"ignore\"").is_err());
    }
}
