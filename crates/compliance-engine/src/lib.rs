//! Clause anchoring and escalation core for contract review
//!
//! Takes a document as ordered text segments plus the clause excerpts an
//! upstream analysis flagged as policy violations, and produces anchored,
//! color-coded comments, the overall escalation level, and a deterministic
//! negotiation recommendation from the customer's history.
//!
//! Everything here is pure and synchronous. Talking to the document API,
//! the language model and the mail service belongs to the callers.

pub mod anchor;
pub mod approval;
pub mod config;
pub mod document;
pub mod error;
pub mod history;
pub mod locator;
pub mod offsets;
pub mod recommendation;
pub mod report;
pub mod severity;

pub use anchor::{AnchorBuilder, AnchorDescriptor};
pub use approval::{ApprovalMatrix, ApprovalRule, InvolvementLevel, MatrixFormat};
pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use history::{CustomerHistory, CustomerRef};
pub use locator::{ExcerptLocator, LocateResult};
pub use offsets::OffsetIndex;
pub use recommendation::{RecommendationEngine, RecommendationThresholds};
pub use report::EvaluationSummary;
pub use severity::SeverityResolver;

use serde::{Deserialize, Serialize};
use shared_types::{
    AnchoredComment, AuditAction, AuditChain, CustomerProfile, DocumentRef, EscalationLevel,
    Recommendation, TextSegment, Violation,
};
use tracing::{debug, info, warn};

/// Actor name recorded in review audit events
pub const AUDIT_ACTOR: &str = "compliance-engine";

/// What happened to one violation of a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ViolationOutcome {
    Anchored {
        index: usize,
        condition: String,
        comment: AnchoredComment,
    },
    /// The excerpt could not be found; the rest of the batch still proceeds
    Skipped {
        index: usize,
        condition: String,
        excerpt: String,
        attempts: Vec<String>,
        reason: String,
    },
}

impl ViolationOutcome {
    pub fn index(&self) -> usize {
        match self {
            ViolationOutcome::Anchored { index, .. } | ViolationOutcome::Skipped { index, .. } => {
                *index
            }
        }
    }

    pub fn comment(&self) -> Option<&AnchoredComment> {
        match self {
            ViolationOutcome::Anchored { comment, .. } => Some(comment),
            ViolationOutcome::Skipped { .. } => None,
        }
    }
}

/// Result of anchoring a batch of violations against one document snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub document: DocumentRef,
    /// One entry per input violation, in input order
    pub outcomes: Vec<ViolationOutcome>,
    pub summary: EvaluationSummary,
    pub audit: AuditChain,
}

impl EvaluationReport {
    pub fn anchored(&self) -> impl Iterator<Item = &AnchoredComment> {
        self.outcomes.iter().filter_map(ViolationOutcome::comment)
    }

    pub fn skipped(&self) -> impl Iterator<Item = &ViolationOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ViolationOutcome::Skipped { .. }))
    }

    /// Record the customer recommendation made for this document
    pub fn record_assessment(&mut self, assessment: &CustomerAssessment) {
        let snapshot = self
            .audit
            .events
            .first()
            .map(|e| e.snapshot_hash.clone())
            .unwrap_or_default();
        self.audit.append(
            AuditAction::RecommendationIssued {
                action: assessment.recommendation.action,
            },
            AUDIT_ACTOR,
            &snapshot,
            Some(assessment.recommendation.rationale.clone()),
        );
    }
}

/// Profile and recommendation for the customer behind a contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerAssessment {
    pub customer: CustomerRef,
    pub profile: CustomerProfile,
    pub required_escalation: EscalationLevel,
    pub recommendation: Recommendation,
}

/// ComplianceEngine entry point
pub struct ComplianceEngine {
    config: EngineConfig,
    locator: ExcerptLocator,
    recommender: RecommendationEngine,
}

impl ComplianceEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            locator: ExcerptLocator::new(config.fallback_prefix_chars),
            recommender: RecommendationEngine::new(config.thresholds),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Locate and anchor every violation in the document.
    ///
    /// Malformed segments fail the whole request. A violation whose excerpt
    /// cannot be found is reported as skipped and the batch continues.
    pub fn anchor_violations(
        &self,
        document: &DocumentRef,
        segments: &[TextSegment],
        violations: &[Violation],
    ) -> Result<EvaluationReport> {
        let index = OffsetIndex::build(segments)?;
        let snapshot = index.content_hash();
        let mut audit = AuditChain::new(&document.document_id);
        audit.append(
            AuditAction::EvaluationStarted {
                violations: violations.len() as u32,
            },
            AUDIT_ACTOR,
            &snapshot,
            None,
        );

        let mut outcomes = Vec::with_capacity(violations.len());
        for (i, violation) in violations.iter().enumerate() {
            let outcome = self.anchor_one(&index, document, i, violation)?;
            match &outcome {
                ViolationOutcome::Anchored { comment, .. } => {
                    info!(
                        violation = i + 1,
                        total = violations.len(),
                        method = %comment.match_method,
                        native_start = comment.native_range_start,
                        native_length = comment.native_range_length,
                        "anchored {}",
                        violation.condition
                    );
                    audit.append(
                        AuditAction::CommentAnchored {
                            method: comment.match_method,
                            native_start: comment.native_range_start,
                            native_length: comment.native_range_length,
                        },
                        AUDIT_ACTOR,
                        &snapshot,
                        Some(violation.condition.clone()),
                    );
                }
                ViolationOutcome::Skipped { attempts, .. } => {
                    warn!(
                        violation = i + 1,
                        total = violations.len(),
                        attempts = ?attempts,
                        "skipped {}: excerpt not found",
                        violation.condition
                    );
                    audit.append(
                        AuditAction::ExcerptSkipped {
                            attempts: attempts.clone(),
                        },
                        AUDIT_ACTOR,
                        &snapshot,
                        Some(violation.condition.clone()),
                    );
                }
            }
            outcomes.push(outcome);
        }

        let anchored_count = outcomes.iter().filter(|o| o.comment().is_some()).count();
        let highest_escalation = if violations.is_empty() {
            None
        } else {
            Some(SeverityResolver::highest_of(
                violations.iter().map(|v| v.escalation_level),
            )?)
        };
        let summary = EvaluationSummary {
            violation_count: violations.len(),
            anchored_count,
            skipped_count: violations.len() - anchored_count,
            highest_escalation,
        };
        info!(
            "Comments placed: {}/{}",
            summary.anchored_count, summary.violation_count
        );

        Ok(EvaluationReport {
            document: document.clone(),
            outcomes,
            summary,
            audit,
        })
    }

    fn anchor_one(
        &self,
        index: &OffsetIndex,
        document: &DocumentRef,
        position: usize,
        violation: &Violation,
    ) -> Result<ViolationOutcome> {
        let located = match self.locator.locate(index.plain_text(), &violation.clause_text) {
            Ok(located) => located,
            Err(EngineError::ExcerptNotFound { excerpt, attempts }) => {
                return Ok(ViolationOutcome::Skipped {
                    index: position,
                    condition: violation.condition.clone(),
                    excerpt,
                    attempts,
                    reason: "Text not found in document".to_string(),
                });
            }
            Err(other) => return Err(other),
        };

        debug!(
            context = %locator::context(index.plain_text(), &located, locator::CONTEXT_RADIUS),
            "located {}",
            violation.condition
        );

        let color = SeverityResolver::color_for(violation.escalation_level);
        let quoted = self
            .config
            .prefix_comments
            .then_some(located.matched_text.as_str());
        let comment_text = report::format_comment(violation, quoted);
        let comment = AnchorBuilder::build(index, document, &located, color, comment_text)?;

        Ok(ViolationOutcome::Anchored {
            index: position,
            condition: violation.condition.clone(),
            comment,
        })
    }

    /// Recommend how to approach the customer given the contract's violations
    pub fn recommend_for(
        &self,
        history: &CustomerHistory,
        customer: &CustomerRef,
        violations: &[Violation],
    ) -> Result<CustomerAssessment> {
        let required_escalation =
            SeverityResolver::highest_of(violations.iter().map(|v| v.escalation_level))?;
        let profile = history.profile_for(customer);
        let conditions: Vec<&str> = violations.iter().map(|v| v.condition.as_str()).collect();
        let recommendation = self
            .recommender
            .recommend(&profile, required_escalation, &conditions);

        info!(
            action = %recommendation.action,
            contracts = profile.total_contracts,
            "recommendation for {:?}",
            customer
        );

        Ok(CustomerAssessment {
            customer: customer.clone(),
            profile,
            required_escalation,
            recommendation,
        })
    }
}

impl Default for ComplianceEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
