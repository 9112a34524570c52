use serde::{Deserialize, Serialize};

// ── Clauses ──────────────────────────────────────────────────────────────

/// One numbered unit of a contract's text, the atomic unit of evaluation.
/// Created once by the segmenter and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClauseRecord {
    /// 1-based position within the filtered, ordered segmenter output.
    pub ordinal: u32,
    /// Trimmed clause text, boundary marker retained at the head.
    pub text: String,
}

// ── Retrieval ────────────────────────────────────────────────────────────

/// Supporting statute/precedent text attached to a clause before scoring.
/// Built fresh per clause; never cached across clauses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalContext {
    /// Statute snippets ranked by embedding distance (possibly empty).
    pub law_snippets: Vec<String>,
    /// Best-matching precedent, or the no-result sentinel.
    pub precedent_snippet: String,
    /// Both sections concatenated under fixed labeled headers.
    pub combined_text: String,
}

// ── Evaluation results ───────────────────────────────────────────────────

/// Discriminates scored clauses from clauses whose evaluation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvalOutcome {
    Success,
    Error,
}

/// Scored verdict for a single clause.
///
/// `is_toxic` always equals `risk_score >= scorer::TOXIC_THRESHOLD`; both are
/// set together at the single classification point in the scorer. A clause
/// whose evaluation failed carries `outcome: Error`, a zero score, and a
/// populated `error_detail` instead of being dropped from the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub ordinal: u32,
    pub clause_text: String,
    /// Normalized risk score on the canonical 0–10 scale.
    pub risk_score: f64,
    pub is_toxic: bool,
    /// The model's grading rationale.
    pub reason: String,
    /// The combined retrieval context the verdict was grounded on.
    pub context_used: String,
    /// Plain-language explanation and redraft; empty unless the clause is
    /// toxic and generation succeeded.
    pub suggestion: String,
    pub outcome: EvalOutcome,
    /// Populated when `outcome` is `Error`.
    pub error_detail: String,
}

impl EvaluationResult {
    /// Fail-safe result for a clause whose evaluation could not complete.
    /// Scores zero and does not flag, so a transient failure never crashes
    /// the batch; the error stays visible through `outcome`/`error_detail`.
    pub fn error(
        clause: &ClauseRecord,
        context_used: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            ordinal: clause.ordinal,
            clause_text: clause.text.clone(),
            risk_score: 0.0,
            is_toxic: false,
            reason: String::new(),
            context_used: context_used.into(),
            suggestion: String::new(),
            outcome: EvalOutcome::Error,
            error_detail: detail.into(),
        }
    }
}

// ── Progress protocol ────────────────────────────────────────────────────

/// One row of the `complete` payload, as consumed by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub id: u32,
    pub clause: String,
    pub is_toxic: bool,
    pub score: f64,
    pub reason: String,
    pub context: String,
    pub suggestion: String,
    pub outcome: EvalOutcome,
    /// Failure detail for rows with `outcome: "error"`; empty otherwise.
    pub error: String,
}

impl From<&EvaluationResult> for ResultRow {
    fn from(r: &EvaluationResult) -> Self {
        Self {
            id: r.ordinal,
            clause: r.clause_text.clone(),
            is_toxic: r.is_toxic,
            score: r.risk_score,
            reason: r.reason.clone(),
            context: r.context_used.clone(),
            suggestion: r.suggestion.clone(),
            outcome: r.outcome,
            error: r.error_detail.clone(),
        }
    }
}

/// Self-contained progress record streamed to the consumer, one JSON line
/// per event. `complete` carries the full ordered result sequence exactly
/// once; nothing follows `complete` or `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ProgressEvent {
    Progress {
        current: usize,
        total: usize,
        message: String,
    },
    Complete {
        results: Vec<ResultRow>,
    },
    Error {
        message: String,
    },
}
