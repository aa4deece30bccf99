//! Document identifiers and flattening of the document API's body structure
//!
//! The document API returns nested structural elements (paragraphs, tables
//! of cells that again hold paragraphs). Anchoring only needs the flat list
//! of text runs in document order with their native index ranges.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use shared_types::TextSegment;

use crate::error::{EngineError, Result};

lazy_static! {
    /// Document ID inside a document URL
    static ref DOCUMENT_URL_PATTERN: Regex =
        Regex::new(r"/document/d/([a-zA-Z0-9_-]+)").unwrap();

    /// A bare document ID
    static ref DOCUMENT_ID_PATTERN: Regex = Regex::new(r"^([a-zA-Z0-9_-]+)$").unwrap();
}

/// Extract the document ID from a document URL, or accept a bare ID
pub fn extract_document_id(id_or_url: &str) -> Result<String> {
    let trimmed = id_or_url.trim();
    DOCUMENT_URL_PATTERN
        .captures(trimmed)
        .or_else(|| DOCUMENT_ID_PATTERN.captures(trimmed))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| EngineError::InvalidDocumentId(id_or_url.to_string()))
}

/// Canonical edit URL for a document ID
pub fn document_url(document_id: &str) -> String {
    format!("https://docs.google.com/document/d/{}/edit", document_id)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: DocumentBody,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentBody {
    #[serde(default)]
    pub content: Vec<StructuralElement>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralElement {
    #[serde(default)]
    pub start_index: u64,
    #[serde(default)]
    pub end_index: u64,
    pub paragraph: Option<Paragraph>,
    pub table: Option<Table>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Paragraph {
    #[serde(default)]
    pub elements: Vec<ParagraphElement>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphElement {
    #[serde(default)]
    pub start_index: u64,
    #[serde(default)]
    pub end_index: u64,
    pub text_run: Option<TextRun>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextRun {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    #[serde(default)]
    pub table_rows: Vec<TableRow>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    #[serde(default)]
    pub table_cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableCell {
    #[serde(default)]
    pub content: Vec<StructuralElement>,
}

impl Document {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn segments(&self) -> Vec<TextSegment> {
        flatten_body(&self.body)
    }
}

/// Flatten a body into text runs in document order, descending into tables
/// row by row and cell by cell.
pub fn flatten_body(body: &DocumentBody) -> Vec<TextSegment> {
    let mut segments = Vec::new();
    for element in &body.content {
        flatten_element(element, &mut segments);
    }
    segments
}

fn flatten_element(element: &StructuralElement, segments: &mut Vec<TextSegment>) {
    if let Some(paragraph) = &element.paragraph {
        for run in &paragraph.elements {
            if let Some(text_run) = &run.text_run {
                segments.push(TextSegment::new(
                    run.start_index,
                    run.end_index,
                    text_run.content.clone(),
                ));
            }
        }
    }

    if let Some(table) = &element.table {
        for row in &table.table_rows {
            for cell in &row.table_cells {
                for content in &cell.content {
                    flatten_element(content, segments);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offsets::OffsetIndex;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_document_id() {
        assert_eq!(
            extract_document_id("https://docs.google.com/document/d/1rHt_qNN-x/edit?tab=t.0").unwrap(),
            "1rHt_qNN-x"
        );
        assert_eq!(extract_document_id("abc_123-XYZ").unwrap(), "abc_123-XYZ");
        assert!(matches!(
            extract_document_id("not a url"),
            Err(EngineError::InvalidDocumentId(_))
        ));
        assert_eq!(document_url("abc"), "https://docs.google.com/document/d/abc/edit");
    }

    #[test]
    fn test_flattens_paragraphs_and_tables() {
        let json = r#"{
            "title": "Supply Agreement",
            "body": {
                "content": [
                    {"startIndex": 0, "endIndex": 1, "sectionBreak": {}},
                    {
                        "startIndex": 1, "endIndex": 14,
                        "paragraph": {"elements": [
                            {"startIndex": 1, "endIndex": 8, "textRun": {"content": "Prices "}},
                            {"startIndex": 8, "endIndex": 14, "textRun": {"content": "fixed\n"}}
                        ]}
                    },
                    {
                        "startIndex": 14, "endIndex": 30,
                        "table": {"tableRows": [{"tableCells": [
                            {"content": [{"startIndex": 16, "endIndex": 21, "paragraph": {"elements": [
                                {"startIndex": 16, "endIndex": 21, "textRun": {"content": "Cap\n"}}
                            ]}}]},
                            {"content": [{"startIndex": 22, "endIndex": 27, "paragraph": {"elements": [
                                {"startIndex": 22, "endIndex": 27, "textRun": {"content": "500%\n"}}
                            ]}}]}
                        ]}]}
                    }
                ]
            }
        }"#;

        let document = Document::from_json(json).unwrap();
        assert_eq!(document.title.as_deref(), Some("Supply Agreement"));

        let segments = document.segments();
        assert_eq!(
            segments,
            vec![
                TextSegment::new(1, 8, "Prices "),
                TextSegment::new(8, 14, "fixed\n"),
                TextSegment::new(16, 21, "Cap\n"),
                TextSegment::new(22, 27, "500%\n"),
            ]
        );

        let index = OffsetIndex::build(&segments).unwrap();
        assert_eq!(index.plain_text(), "Prices fixed\nCap\n500%\n");
        assert_eq!(index.native_index_of(17), Some(22));
    }
}
