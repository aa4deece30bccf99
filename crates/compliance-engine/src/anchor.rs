//! Anchor descriptors and highlight ranges for located excerpts

use serde::{Deserialize, Serialize};
use serde_json::json;
use shared_types::{AnchoredComment, DocumentRef, HighlightRequest, RgbColor};

use crate::error::{EngineError, Result};
use crate::locator::LocateResult;
use crate::offsets::OffsetIndex;

/// Anchor in the annotation API's wire shape:
/// `{"r":"head","a":[{"txt":{"o":15,"l":5}}]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorDescriptor {
    #[serde(rename = "r")]
    pub revision: String,
    #[serde(rename = "a")]
    pub regions: Vec<AnchorRegion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorRegion {
    pub txt: TextRegion,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRegion {
    #[serde(rename = "o")]
    pub offset: u64,
    #[serde(rename = "l")]
    pub length: u64,
}

impl AnchorDescriptor {
    pub fn single(document: &DocumentRef, offset: u64, length: u64) -> Self {
        Self {
            revision: document.revision.as_str().to_string(),
            regions: vec![AnchorRegion {
                txt: TextRegion { offset, length },
            }],
        }
    }

    /// Compact JSON as expected by the annotation API
    pub fn to_wire(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

pub struct AnchorBuilder;

impl AnchorBuilder {
    /// Turn a located excerpt into an anchored comment.
    ///
    /// `located` must come from the plain text of this same `index`.
    pub fn build(
        index: &OffsetIndex,
        document: &DocumentRef,
        located: &LocateResult,
        color: RgbColor,
        comment_text: String,
    ) -> Result<AnchoredComment> {
        let (native_start, native_length) = index
            .native_range(located.offset, located.length)
            .ok_or(EngineError::RangeOutOfBounds {
                offset: located.offset,
                length: located.length,
                len: index.len(),
            })?;

        let anchor_descriptor =
            AnchorDescriptor::single(document, native_start, native_length).to_wire()?;

        Ok(AnchoredComment {
            native_range_start: native_start,
            native_range_length: native_length,
            highlight_color: color,
            anchor_descriptor,
            comment_text,
            match_method: located.method,
            highlight: HighlightRequest {
                native_start,
                native_end: native_start + native_length,
                color,
            },
        })
    }
}

/// `updateTextStyle` request body that applies a highlight's background color
pub fn update_text_style(highlight: &HighlightRequest) -> serde_json::Value {
    json!({
        "updateTextStyle": {
            "range": {
                "startIndex": highlight.native_start,
                "endIndex": highlight.native_end,
            },
            "textStyle": {
                "backgroundColor": {
                    "color": {
                        "rgbColor": {
                            "red": highlight.color.red,
                            "green": highlight.color.green,
                            "blue": highlight.color.blue,
                        }
                    }
                }
            },
            "fields": "backgroundColor",
        }
    })
}
