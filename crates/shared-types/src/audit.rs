//! Tamper-evident audit log for contract review runs
//!
//! Every anchoring outcome (including the search method used and the
//! attempts made for skipped excerpts) is recorded so operators can see
//! exactly how each comment was placed.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::types::{MatchMethod, RecommendedAction};

/// Types of auditable review events
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    EvaluationStarted {
        violations: u32,
    },
    CommentAnchored {
        method: MatchMethod,
        native_start: u64,
        native_length: u64,
    },
    ExcerptSkipped {
        attempts: Vec<String>,
    },
    RecommendationIssued {
        action: RecommendedAction,
    },
}

/// A single audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_id: String,
    pub timestamp: String,
    pub action: AuditAction,
    pub actor: String,
    /// Fingerprint of the document text the event was computed against
    pub snapshot_hash: String,
    pub previous_hash: Option<String>,
    pub details: Option<String>,
}

impl AuditEvent {
    pub fn new(
        action: AuditAction,
        actor: &str,
        snapshot_hash: &str,
        previous_hash: Option<String>,
        details: Option<String>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now().to_rfc3339(),
            action,
            actor: actor.to_string(),
            snapshot_hash: snapshot_hash.to_string(),
            previous_hash,
            details,
        }
    }

    /// Compute the hash of this event (for chain linking)
    pub fn compute_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.event_id.as_bytes());
        hasher.update(self.timestamp.as_bytes());
        hasher.update(serde_json::to_string(&self.action).unwrap_or_default().as_bytes());
        hasher.update(self.actor.as_bytes());
        hasher.update(self.snapshot_hash.as_bytes());
        if let Some(ref prev) = self.previous_hash {
            hasher.update(prev.as_bytes());
        }
        if let Some(ref details) = self.details {
            hasher.update(details.as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

/// Chain of audit events with hash linking
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AuditChain {
    pub events: Vec<AuditEvent>,
    pub document_id: String,
    pub created_at: String,
}

impl AuditChain {
    pub fn new(document_id: &str) -> Self {
        Self {
            events: Vec::new(),
            document_id: document_id.to_string(),
            created_at: Utc::now().to_rfc3339(),
        }
    }

    /// Get the hash of the last event (for linking)
    pub fn last_hash(&self) -> Option<String> {
        self.events.last().map(|e| e.compute_hash())
    }

    /// Append an event, automatically linking to previous hash
    pub fn append(
        &mut self,
        action: AuditAction,
        actor: &str,
        snapshot_hash: &str,
        details: Option<String>,
    ) -> &AuditEvent {
        let previous_hash = self.last_hash();
        let event = AuditEvent::new(action, actor, snapshot_hash, previous_hash, details);
        self.events.push(event);
        &self.events[self.events.len() - 1]
    }

    /// Verify the integrity of the chain
    pub fn verify(&self) -> Result<(), String> {
        let mut expected_prev: Option<String> = None;

        for (i, event) in self.events.iter().enumerate() {
            if event.previous_hash != expected_prev {
                return Err(format!(
                    "Chain broken at event {}: expected prev {:?}, got {:?}",
                    i, expected_prev, event.previous_hash
                ));
            }
            expected_prev = Some(event.compute_hash());
        }

        Ok(())
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize audit chain: {}", e))
    }

    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Failed to deserialize audit chain: {}", e))
    }

    /// One display line per event
    pub fn summary(&self) -> Vec<String> {
        self.events
            .iter()
            .map(|e| {
                let detail = match &e.action {
                    AuditAction::EvaluationStarted { violations } => {
                        format!("evaluation started ({} violations)", violations)
                    }
                    AuditAction::CommentAnchored {
                        method,
                        native_start,
                        native_length,
                    } => format!(
                        "anchored at {}+{} ({})",
                        native_start, native_length, method
                    ),
                    AuditAction::ExcerptSkipped { attempts } => {
                        format!("skipped after {} attempt(s)", attempts.len())
                    }
                    AuditAction::RecommendationIssued { action } => {
                        format!("recommended {}", action)
                    }
                };
                format!(
                    "[{}] {} - {}",
                    e.timestamp.split('T').next().unwrap_or(&e.timestamp),
                    e.actor,
                    detail
                )
            })
            .collect()
    }
}

/// Compute SHA-256 hash of document text
pub fn hash_text(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}
