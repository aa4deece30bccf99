//! API handlers for the review server
//!
//! Provides REST endpoints for:
//! - Anchoring flagged clauses as color-coded comments
//! - Negotiation recommendations from customer history
//! - The approval matrix rendered for analysis prompts
//! - Escalation e-mail text

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ServerError;
use crate::AppState;

use compliance_engine::anchor::update_text_style;
use compliance_engine::document::{document_url, extract_document_id, flatten_body, DocumentBody};
use compliance_engine::report::{color_guide, escalation_email, EscalationEmail};
use compliance_engine::{CustomerAssessment, CustomerRef, EvaluationReport, MatrixFormat};
use shared_types::{DocumentRef, EscalationLevel, TextSegment, Violation};

/// Health check response
#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "review-server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Anchor request body
#[derive(Deserialize)]
pub struct AnchorRequest {
    /// Document ID or full document URL
    pub document_id: String,

    /// Text segments already flattened by the caller
    pub segments: Option<Vec<TextSegment>>,

    /// Raw document body as returned by the document API
    pub body: Option<DocumentBody>,

    /// Violations flagged by the analysis stage
    #[serde(default)]
    pub violations: Vec<Violation>,

    /// Customer name; when present the response includes a recommendation
    pub customer: Option<String>,
}

/// Anchor response
#[derive(Serialize)]
pub struct AnchorResponse {
    pub success: bool,
    pub document_url: String,
    pub headline: String,
    pub color_guide: Vec<String>,
    /// Background-color style requests, one per anchored comment
    pub highlight_requests: Vec<serde_json::Value>,
    pub report: EvaluationReport,
    pub assessment: Option<CustomerAssessment>,
}

/// Handler: POST /api/anchor
pub async fn handle_anchor(
    State(state): State<AppState>,
    Json(req): Json<AnchorRequest>,
) -> Result<Json<AnchorResponse>, ServerError> {
    let document_id = extract_document_id(&req.document_id)?;
    info!(
        "Anchor request: document={}, violations={}",
        document_id,
        req.violations.len()
    );

    let segments = match (req.segments, req.body) {
        (Some(segments), None) => segments,
        (None, Some(body)) => flatten_body(&body),
        (Some(_), Some(_)) => {
            return Err(ServerError::InvalidRequest(
                "Provide either 'segments' or 'body', not both".to_string(),
            ))
        }
        (None, None) => {
            return Err(ServerError::InvalidRequest(
                "Missing document text: provide 'segments' or 'body'".to_string(),
            ))
        }
    };
    debug!("Document has {} segment(s)", segments.len());

    let document = DocumentRef::head(document_id.as_str());
    let mut report = state
        .engine
        .anchor_violations(&document, &segments, &req.violations)?;

    let assessment = match req.customer {
        Some(name) if !req.violations.is_empty() => {
            let customer = CustomerRef::from_name(Some(&name));
            let assessment = state
                .engine
                .recommend_for(&state.history, &customer, &req.violations)?;
            report.record_assessment(&assessment);
            Some(assessment)
        }
        _ => None,
    };

    let highlight_requests = report
        .anchored()
        .map(|comment| update_text_style(&comment.highlight))
        .collect();

    Ok(Json(AnchorResponse {
        success: true,
        document_url: document_url(&document_id),
        headline: report.summary.headline(),
        color_guide: color_guide(),
        highlight_requests,
        report,
        assessment,
    }))
}

/// Recommendation request body
#[derive(Deserialize)]
pub struct RecommendRequest {
    /// Customer name as extracted from the contract, if any
    pub customer: Option<String>,

    #[serde(default)]
    pub violations: Vec<Violation>,
}

/// Recommendation response
#[derive(Serialize)]
pub struct RecommendResponse {
    pub success: bool,
    #[serde(flatten)]
    pub assessment: CustomerAssessment,
}

/// Handler: POST /api/recommend
pub async fn handle_recommend(
    State(state): State<AppState>,
    Json(req): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>, ServerError> {
    let customer = CustomerRef::from_name(req.customer.as_deref());
    info!("Recommendation request: customer={:?}", customer);

    let assessment = state
        .engine
        .recommend_for(&state.history, &customer, &req.violations)?;

    Ok(Json(RecommendResponse {
        success: true,
        assessment,
    }))
}

/// Known customers response
#[derive(Serialize)]
pub struct CustomerListResponse {
    pub success: bool,
    pub customers: Vec<String>,
    pub count: usize,
}

/// Handler: GET /api/customers
pub async fn handle_list_customers(State(state): State<AppState>) -> Json<CustomerListResponse> {
    let customers: Vec<String> = state
        .history
        .customers()
        .into_iter()
        .map(str::to_string)
        .collect();
    let count = customers.len();

    Json(CustomerListResponse {
        success: true,
        customers,
        count,
    })
}

/// Query for the approval matrix prompt
#[derive(Deserialize)]
pub struct MatrixQuery {
    #[serde(default)]
    pub format: MatrixFormat,
}

/// Approval matrix response
#[derive(Serialize)]
pub struct MatrixResponse {
    pub success: bool,
    pub format: MatrixFormat,
    pub rule_count: usize,
    pub prompt: String,
}

/// Handler: GET /api/approval-matrix
pub async fn handle_approval_matrix(
    State(state): State<AppState>,
    Query(query): Query<MatrixQuery>,
) -> Json<MatrixResponse> {
    debug!("Rendering approval matrix as {:?}", query.format);

    Json(MatrixResponse {
        success: true,
        format: query.format,
        rule_count: state.matrix.rules.len(),
        prompt: state.matrix.render(query.format),
    })
}

/// Escalation e-mail request body
#[derive(Deserialize)]
pub struct EscalationEmailRequest {
    pub recipient_name: String,
    pub contract_title: String,
    /// Document ID or full document URL
    pub document_id: String,
    pub violations_summary: String,
    pub escalation_level: EscalationLevel,
}

/// Handler: POST /api/escalation-email
pub async fn handle_escalation_email(
    Json(req): Json<EscalationEmailRequest>,
) -> Result<Json<EscalationEmail>, ServerError> {
    let document_id = extract_document_id(&req.document_id)?;
    info!(
        "Escalation e-mail: document={}, level={}",
        document_id, req.escalation_level
    );

    Ok(Json(escalation_email(
        &req.recipient_name,
        &req.contract_title,
        &document_url(&document_id),
        &req.violations_summary,
        req.escalation_level,
    )))
}
