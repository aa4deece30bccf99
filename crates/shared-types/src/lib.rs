pub mod audit;
pub mod types;

pub use audit::{hash_text, AuditAction, AuditChain, AuditEvent};
pub use types::{
    AcceptedDeviation, AnchoredComment, CustomerProfile, DocumentRef, DocumentRevision,
    EscalationLevel, HighlightRequest, HistoricalContract, MatchMethod, Recommendation,
    RecommendedAction, RgbColor, Severity, TextSegment, UnknownEscalationLevel, Violation,
};
