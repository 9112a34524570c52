use anyhow::Result;
use regex::Regex;

use crate::types::ClauseRecord;

/// Minimum trimmed length (in chars) for a split segment to count as a
/// clause. Guards against stray whitespace-only fragments from malformed
/// input.
pub const MIN_CLAUSE_LEN: usize = 10;

/// Default clause-boundary markers: the English "Article N" form and the
/// Korean "제N조" form used in the source contract corpus.
const DEFAULT_BOUNDARY_PATTERN: &str = r"Article\s+\d+|제\s*\d+\s*조";

/// Splits raw contract text into ordered clause records.
///
/// The split is zero-width: each segment starts at a boundary-marker
/// occurrence and the marker text stays at the head of its segment, never
/// consumed or duplicated. Text before the first marker (a preamble naming
/// the parties) is kept as its own segment.
pub struct ClauseSegmenter {
    boundary: Regex,
}

impl ClauseSegmenter {
    pub fn new() -> Result<Self> {
        Self::with_pattern(DEFAULT_BOUNDARY_PATTERN)
    }

    pub fn with_pattern(pattern: &str) -> Result<Self> {
        Ok(Self {
            boundary: Regex::new(pattern)?,
        })
    }

    /// Segment `raw_text` into clauses.
    ///
    /// Ordinals are assigned 1-based over the *filtered* output, so gaps
    /// from discarded fragments never appear downstream. Empty or
    /// marker-less input yields an empty Vec: nothing to evaluate, not an
    /// error.
    pub fn segment(&self, raw_text: &str) -> Vec<ClauseRecord> {
        let starts: Vec<usize> = self
            .boundary
            .find_iter(raw_text)
            .map(|m| m.start())
            .collect();
        if starts.is_empty() {
            return Vec::new();
        }

        let mut bounds = Vec::with_capacity(starts.len() + 1);
        if starts[0] > 0 {
            bounds.push(0);
        }
        bounds.extend(starts);

        let mut records = Vec::new();
        for (i, &start) in bounds.iter().enumerate() {
            let end = bounds.get(i + 1).copied().unwrap_or(raw_text.len());
            let segment = raw_text[start..end].trim();
            if segment.chars().count() > MIN_CLAUSE_LEN {
                records.push(ClauseRecord {
                    ordinal: (records.len() + 1) as u32,
                    text: segment.to_string(),
                });
            }
        }
        records
    }
}
