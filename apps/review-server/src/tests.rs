//! Router and property-based tests for the review server API
//!
//! Test categories:
//! - Anchoring from flattened segments and from raw document bodies
//! - Error mapping for malformed documents and empty violation sets
//! - Recommendations from the loaded customer history
//! - Approval matrix prompt formats
//! - Document ID and escalation label parsing

#[cfg(test)]
mod router_tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    use compliance_engine::{ApprovalMatrix, ComplianceEngine, CustomerHistory};

    use crate::api::HealthResponse;
    use crate::{router, AppState};

    const HISTORY: &str = r#"{
        "Nordic Pulp Oy": [
            {
                "contract_id": 1,
                "closing_recency": "2 months ago",
                "accepted_deviations": [
                    {"condition": "Liability cap above 100%", "negotiated_term": "150% cap"}
                ],
                "negotiation_rounds": 1
            },
            {
                "contract_id": 2,
                "closing_recency": "8 months ago",
                "accepted_deviations": [
                    {"condition": "Payment terms over 60 days", "negotiated_term": "90 days net"}
                ],
                "negotiation_rounds": 2
            },
            {
                "contract_id": 3,
                "closing_recency": "2 years ago",
                "negotiation_rounds": 1
            }
        ]
    }"#;

    const MATRIX: &str = r#"[
        {
            "Category": "Liability",
            "Condition": "Liability cap above 100%",
            "Approval_Matrix": {"Head of BU": "Prepares/Initiates", "CEO": "Approves/Decides"}
        }
    ]"#;

    fn server() -> TestServer {
        let state = AppState {
            engine: Arc::new(ComplianceEngine::default()),
            history: Arc::new(CustomerHistory::from_json(HISTORY).unwrap()),
            matrix: Arc::new(ApprovalMatrix::from_json(MATRIX).unwrap()),
        };
        TestServer::new(router(state)).unwrap()
    }

    fn liability_violation(clause: &str) -> Value {
        json!({
            "category": "Liability",
            "condition": "Liability cap above 100%",
            "severity": "high",
            "escalation_level": "CEO",
            "clause_text": clause,
            "comment_body": "Cap exceeds the contract price."
        })
    }

    #[tokio::test]
    async fn test_health() {
        let response = server().get("/health").await;
        response.assert_status_ok();
        let health: HealthResponse = response.json();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.service, "review-server");
    }

    #[tokio::test]
    async fn test_anchor_segments_maps_to_native_range() {
        let response = server()
            .post("/api/anchor")
            .json(&json!({
                "document_id": "doc-hello",
                "segments": [
                    {"native_start": 0, "native_end": 10, "text": "Hello "},
                    {"native_start": 15, "native_end": 20, "text": "World"}
                ],
                "violations": [liability_violation("World")]
            }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        let outcome = &body["report"]["outcomes"][0];
        assert_eq!(outcome["status"], "anchored");
        assert_eq!(outcome["comment"]["native_range_start"], 15);
        assert_eq!(outcome["comment"]["native_range_length"], 5);
        assert_eq!(
            outcome["comment"]["anchor_descriptor"],
            r#"{"r":"head","a":[{"txt":{"o":15,"l":5}}]}"#
        );
        assert_eq!(outcome["comment"]["highlight"]["native_end"], 20);
        assert_eq!(
            body["highlight_requests"][0]["updateTextStyle"]["range"],
            json!({"startIndex": 15, "endIndex": 20})
        );
        assert_eq!(body["report"]["summary"]["highest_escalation"], "CEO");
        assert_eq!(
            body["document_url"],
            "https://docs.google.com/document/d/doc-hello/edit"
        );
        assert!(body["assessment"].is_null());
    }

    #[tokio::test]
    async fn test_anchor_body_with_customer_recommendation() {
        let response = server()
            .post("/api/anchor")
            .json(&json!({
                "document_id": "https://docs.google.com/document/d/abc123/edit",
                "body": {
                    "content": [
                        {
                            "startIndex": 1,
                            "endIndex": 40,
                            "paragraph": {
                                "elements": [{
                                    "startIndex": 1,
                                    "endIndex": 40,
                                    "textRun": {"content": "The liability cap shall be 500 percent\n"}
                                }]
                            }
                        }
                    ]
                },
                "violations": [liability_violation("liability cap shall be 500 percent")],
                "customer": "nordic pulp oy"
            }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["report"]["document"]["document_id"], "abc123");
        assert_eq!(body["report"]["outcomes"][0]["comment"]["native_range_start"], 5);
        assert_eq!(
            body["assessment"]["recommendation"]["action"],
            "escalate-directly"
        );

        let events = body["report"]["audit"]["events"].as_array().unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[2]["action"]["RECOMMENDATION_ISSUED"]["action"],
            "escalate-directly"
        );
    }

    #[tokio::test]
    async fn test_anchor_reports_skipped_excerpt() {
        let response = server()
            .post("/api/anchor")
            .json(&json!({
                "document_id": "doc-1",
                "segments": [{"native_start": 1, "native_end": 12, "text": "Plain text."}],
                "violations": [liability_violation("not in this document")]
            }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["report"]["outcomes"][0]["status"], "skipped");
        assert_eq!(body["report"]["summary"]["skipped_count"], 1);
    }

    #[tokio::test]
    async fn test_anchor_malformed_segments_rejected() {
        let response = server()
            .post("/api/anchor")
            .json(&json!({
                "document_id": "doc-1",
                "segments": [{"native_start": 10, "native_end": 5, "text": "backwards"}],
                "violations": [liability_violation("backwards")]
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "MALFORMED_DOCUMENT");
    }

    #[tokio::test]
    async fn test_anchor_requires_document_text() {
        let response = server()
            .post("/api/anchor")
            .json(&json!({"document_id": "doc-1", "violations": []}))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["code"], "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn test_recommend_requires_violations() {
        let response = server()
            .post("/api/recommend")
            .json(&json!({"customer": "Nordic Pulp Oy", "violations": []}))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["code"], "EMPTY_VIOLATION_SET");
    }

    #[tokio::test]
    async fn test_recommend_unknown_customer_is_cautious() {
        let response = server()
            .post("/api/recommend")
            .json(&json!({"violations": [liability_violation("cap")]}))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["customer"]["kind"], "unknown");
        assert_eq!(body["required_escalation"], "CEO");
        assert_eq!(body["recommendation"]["action"], "cautious-approach");
        assert_eq!(body["profile"]["total_contracts"], 0);
    }

    #[tokio::test]
    async fn test_list_customers() {
        let response = server().get("/api/customers").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["count"], 1);
        assert_eq!(body["customers"][0], "Nordic Pulp Oy");
    }

    #[tokio::test]
    async fn test_approval_matrix_formats() {
        let server = server();

        let compact: Value = server
            .get("/api/approval-matrix")
            .add_query_param("format", "compact")
            .await
            .json();
        assert_eq!(compact["format"], "compact");
        assert_eq!(compact["rule_count"], 1);
        assert!(compact["prompt"]
            .as_str()
            .unwrap()
            .starts_with("CONTRACT APPROVAL RULES:"));

        let markdown: Value = server.get("/api/approval-matrix").await.json();
        assert_eq!(markdown["format"], "markdown");
        assert!(markdown["prompt"]
            .as_str()
            .unwrap()
            .starts_with("# Contract Approval Matrix"));
    }
}

#[cfg(test)]
mod property_tests {
    use proptest::prelude::*;

    use compliance_engine::document::{document_url, extract_document_id};
    use compliance_engine::MatrixFormat;
    use shared_types::{EscalationLevel, Violation};

    /// Generate document IDs in the shape the document API hands out
    fn document_id() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9_-]{10,44}"
    }

    /// Generate role names that are not on the escalation ladder
    fn unknown_role() -> impl Strategy<Value = String> {
        "[a-z]{3,12}".prop_filter("Must not be a known role", |s| s != "ceo")
    }

    proptest! {
        /// Property: IDs survive a round trip through their document URL
        #[test]
        fn document_id_round_trips_through_url(id in document_id()) {
            prop_assert_eq!(extract_document_id(&document_url(&id)).unwrap(), id.clone());
            prop_assert_eq!(extract_document_id(&id).unwrap(), id);
        }

        /// Property: IDs with spaces or slashes are rejected
        #[test]
        fn malformed_document_ids_rejected(head in "[a-z]{1,10}", tail in "[a-z]{1,10}") {
            let id = format!("{} {}", head, tail);
            prop_assert!(extract_document_id(&id).is_err());
        }

        /// Property: Matrix format names are recognized
        #[test]
        fn matrix_formats_recognized(name in prop_oneof![
            Just("markdown"),
            Just("structured"),
            Just("compact"),
        ]) {
            let parsed: Result<MatrixFormat, _> = serde_json::from_value(serde_json::json!(name));
            prop_assert!(parsed.is_ok(), "Format '{}' should parse", name);
        }

        /// Property: Violations naming an unknown role are rejected
        #[test]
        fn unknown_escalation_level_rejected(role in unknown_role()) {
            let json = serde_json::json!({
                "category": "Liability",
                "condition": "Cap",
                "severity": "high",
                "escalation_level": role,
                "clause_text": "cap",
                "comment_body": "too high"
            });
            prop_assert!(serde_json::from_value::<Violation>(json).is_err());
        }

        /// Property: Every escalation label parses back to its level
        #[test]
        fn escalation_labels_parse(level in prop_oneof![
            Just(EscalationLevel::HeadOfBu),
            Just(EscalationLevel::BaPresident),
            Just(EscalationLevel::Ceo),
        ]) {
            prop_assert_eq!(level.label().parse::<EscalationLevel>().unwrap(), level);
        }
    }
}
