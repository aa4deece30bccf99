use shared_types::UnknownEscalationLevel;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// The document reader handed over segments that cannot be mapped.
    /// Fatal for the whole request.
    #[error("Malformed document structure at segment {segment}: {reason}")]
    MalformedDocumentStructure { segment: usize, reason: String },

    /// Recoverable per violation: the caller skips it and reports the attempts.
    #[error("Excerpt not found after {} attempt(s): {excerpt:?}", attempts.len())]
    ExcerptNotFound {
        excerpt: String,
        attempts: Vec<String>,
    },

    #[error(transparent)]
    UnknownEscalationLevel(#[from] UnknownEscalationLevel),

    /// A located range that does not belong to the index it is applied to
    #[error("Range {offset}+{length} is outside the {len}-character document")]
    RangeOutOfBounds {
        offset: usize,
        length: usize,
        len: usize,
    },

    #[error("No violations given; there is no escalation level to resolve")]
    EmptyViolationSet,

    #[error("Could not extract document ID from: {0}")]
    InvalidDocumentId(String),

    #[error("Invalid input: {0}")]
    InvalidInput(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
