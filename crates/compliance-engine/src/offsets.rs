//! Plain-text offset to native index mapping
//!
//! A document arrives as ordered text segments, each carrying a range in the
//! document's own index space. That space may contain gaps (structural
//! elements that consume indices without producing text), so plain-text
//! offsets and native indices drift apart. `OffsetIndex` records, for every
//! character of the concatenated plain text, the native index it came from.
//!
//! Offsets are counted in `char`s. The index describes one snapshot of the
//! document and must be rebuilt if the document changes before it is used.

use shared_types::{hash_text, TextSegment};

use crate::error::{EngineError, Result};

/// Read-only mapping from plain-text offsets to native indices
#[derive(Debug, Clone)]
pub struct OffsetIndex {
    text: String,
    /// Native index of each character
    natives: Vec<u64>,
    /// Byte offset of each character in `text`
    byte_offsets: Vec<usize>,
    /// Native index one past the final character
    end_native: u64,
}

impl OffsetIndex {
    /// Build the index from segments in document order.
    ///
    /// A segment's native span must cover its text; indices past the end of
    /// the text inside a segment are treated like a gap.
    pub fn build(segments: &[TextSegment]) -> Result<Self> {
        let total_chars: usize = segments.iter().map(|s| s.text.chars().count()).sum();
        let mut text = String::with_capacity(segments.iter().map(|s| s.text.len()).sum());
        let mut natives = Vec::with_capacity(total_chars);
        let mut byte_offsets = Vec::with_capacity(total_chars);
        let mut previous_end: Option<u64> = None;
        let mut end_native = segments.first().map(|s| s.native_start).unwrap_or(0);

        for (i, segment) in segments.iter().enumerate() {
            validate_segment(i, segment, previous_end)?;
            previous_end = Some(segment.native_end);

            let mut native = segment.native_start;
            for ch in segment.text.chars() {
                byte_offsets.push(text.len());
                natives.push(native);
                text.push(ch);
                native += 1;
            }
            if !segment.text.is_empty() {
                end_native = native;
            }
        }

        Ok(Self {
            text,
            natives,
            byte_offsets,
            end_native,
        })
    }

    /// Concatenation of all segment texts
    pub fn plain_text(&self) -> &str {
        &self.text
    }

    /// Number of characters in the plain text
    pub fn len(&self) -> usize {
        self.natives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.natives.is_empty()
    }

    /// Native index for a plain-text offset in `[0, len]`.
    ///
    /// `len` maps to one past the final native index so zero-length ranges
    /// at the end of the document are addressable.
    pub fn native_index_of(&self, offset: usize) -> Option<u64> {
        if offset == self.natives.len() {
            Some(self.end_native)
        } else {
            self.natives.get(offset).copied()
        }
    }

    /// Plain-text offset of the character at `native`, or `None` for indices
    /// in a gap or outside the document.
    pub fn plain_offset_of(&self, native: u64) -> Option<usize> {
        self.natives.binary_search(&native).ok()
    }

    pub fn char_at_native(&self, native: u64) -> Option<char> {
        let offset = self.plain_offset_of(native)?;
        self.text[self.byte_offsets[offset]..].chars().next()
    }

    /// Byte offset in `plain_text()` of a char offset in `[0, len]`
    pub fn byte_offset_of(&self, offset: usize) -> Option<usize> {
        if offset == self.byte_offsets.len() {
            Some(self.text.len())
        } else {
            self.byte_offsets.get(offset).copied()
        }
    }

    /// Plain-text slice covering `length` chars starting at `offset`
    pub fn plain_slice(&self, offset: usize, length: usize) -> Option<&str> {
        let start = self.byte_offset_of(offset)?;
        let end = self.byte_offset_of(offset.checked_add(length)?)?;
        Some(&self.text[start..end])
    }

    /// Convert a plain-text range to `(native_start, native_length)`.
    ///
    /// The native range ends one past the last character's index, so it may
    /// span interior gaps but never the gap that follows the range.
    pub fn native_range(&self, offset: usize, length: usize) -> Option<(u64, u64)> {
        let start = self.native_index_of(offset)?;
        if length == 0 {
            return Some((start, 0));
        }
        let last = self.natives.get(offset.checked_add(length - 1)?)?;
        Some((start, last + 1 - start))
    }

    /// SHA-256 fingerprint of the plain text
    pub fn content_hash(&self) -> String {
        hash_text(&self.text)
    }
}

fn validate_segment(index: usize, segment: &TextSegment, previous_end: Option<u64>) -> Result<()> {
    if segment.native_end < segment.native_start {
        return Err(EngineError::MalformedDocumentStructure {
            segment: index,
            reason: format!(
                "native end {} precedes native start {}",
                segment.native_end, segment.native_start
            ),
        });
    }

    let span = segment.native_end - segment.native_start;
    let chars = segment.text.chars().count() as u64;
    if span < chars {
        return Err(EngineError::MalformedDocumentStructure {
            segment: index,
            reason: format!(
                "native span {} is shorter than its {} characters of text",
                span, chars
            ),
        });
    }

    if let Some(previous_end) = previous_end {
        if segment.native_start < previous_end {
            return Err(EngineError::MalformedDocumentStructure {
                segment: index,
                reason: format!(
                    "starts at {} before the previous segment ends at {}",
                    segment.native_start, previous_end
                ),
            });
        }
    }

    Ok(())
}
