//! Error types for the review server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use compliance_engine::EngineError;
use serde::Serialize;
use thiserror::Error;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    #[error("No violations given")]
    EmptyViolationSet,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: String,
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::InvalidRequest(_) | ServerError::EmptyViolationSet => {
                StatusCode::BAD_REQUEST
            }
            ServerError::MalformedDocument(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ServerError::InvalidRequest(_) => "INVALID_REQUEST",
            ServerError::MalformedDocument(_) => "MALFORMED_DOCUMENT",
            ServerError::EmptyViolationSet => "EMPTY_VIOLATION_SET",
            ServerError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
            code: self.code().to_string(),
        };

        (self.status(), Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::MalformedDocumentStructure { .. } => {
                ServerError::MalformedDocument(err.to_string())
            }
            EngineError::EmptyViolationSet => ServerError::EmptyViolationSet,
            EngineError::UnknownEscalationLevel(_)
            | EngineError::InvalidDocumentId(_)
            | EngineError::InvalidInput(_) => ServerError::InvalidRequest(err.to_string()),
            other => ServerError::Internal(other.to_string()),
        }
    }
}
