//! Splits normalized text into bounded-length units along natural boundaries.
//!
//! The scan never re-reads consumed text: each accepted span starts where the
//! previous one ended, so the raw spans tile the input exactly. Lengths are
//! counted in characters, spans are stored as byte ranges.

use crate::defaults::MIN_BOUNDARY_RATIO;
use crate::error::{ReadaloudError, Result};
use std::ops::Range;

/// Boundary markers in priority order.
///
/// Only the position of the latest match matters when choosing a cut; the
/// order documents intent.
const BOUNDARY_MARKERS: &[&str] = &["。", ".\n", "\n", "、", ", ", " "];

/// One bounded slice of the input text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    /// 1-based position among all units.
    pub index: usize,
    /// Trimmed text handed to the provider.
    pub text: String,
    /// Raw byte range of the accepted span in the source text, before trimming.
    pub span: Range<usize>,
}

/// Text chunker with a fixed maximum unit length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    max_length: usize,
}

impl Chunker {
    /// Create a chunker producing units of at most `max_length` characters.
    pub fn new(max_length: usize) -> Result<Self> {
        if max_length == 0 {
            return Err(ReadaloudError::invalid_value(
                "synthesis.max_unit_length",
                "must be a positive integer",
            ));
        }
        Ok(Self { max_length })
    }

    /// Maximum unit length in characters.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Split `text` into units.
    ///
    /// Empty or whitespace-only input yields no units. Spans that are empty
    /// after trimming are dropped without consuming an index.
    pub fn chunk(&self, text: &str) -> Vec<Unit> {
        // Byte offset of every char boundary, including the end of the text.
        let offsets: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let char_count = offsets.len() - 1;
        let min_boundary = self.max_length as f64 * MIN_BOUNDARY_RATIO;

        let mut units = Vec::new();
        let mut start = 0;

        while start < char_count {
            let mut end = (start + self.max_length).min(char_count);

            if end != char_count {
                let window = &text[offsets[start]..offsets[end]];
                if let Some(boundary) = last_boundary(window)
                    && boundary as f64 >= min_boundary
                {
                    end = start + boundary + 1;
                }
            }

            let span = offsets[start]..offsets[end];
            let trimmed = text[span.clone()].trim();
            if !trimmed.is_empty() {
                units.push(Unit {
                    index: units.len() + 1,
                    text: trimmed.to_string(),
                    span,
                });
            }

            start = end;
        }

        units
    }
}

/// Split `text` into units of at most `max_length` characters.
pub fn chunk(text: &str, max_length: usize) -> Result<Vec<Unit>> {
    Ok(Chunker::new(max_length)?.chunk(text))
}

/// Character offset of the latest boundary marker in `window`.
///
/// The latest match wins regardless of which marker produced it.
// TODO: rank by marker first and use position only as a tie-break, so a late
// space no longer beats an earlier sentence end.
fn last_boundary(window: &str) -> Option<usize> {
    BOUNDARY_MARKERS
        .iter()
        .filter_map(|marker| window.rfind(marker))
        .max()
        .map(|byte| window[..byte].chars().count())
}
