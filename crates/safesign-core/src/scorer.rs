use std::sync::Arc;

use tracing::{debug, warn};

use crate::completion::CompletionBackend;
use crate::rubric;
use crate::types::{ClauseRecord, EvalOutcome, EvaluationResult, RetrievalContext};

/// Scores at or above this threshold classify a clause as toxic, on the
/// canonical 0–10 scale.
pub const TOXIC_THRESHOLD: f64 = 4.0;

/// Rescale a raw model score to the canonical 0–10 scale.
///
/// Providers that grade on [0,1] are multiplied by 10; the result is clamped
/// to [0,10] and rounded to one decimal. Every boundary that handles a score
/// goes through here; no other conversion exists.
pub fn normalize_score(raw: f64) -> f64 {
    let scaled = if raw <= 1.0 { raw * 10.0 } else { raw };
    (scaled.clamp(0.0, 10.0) * 10.0).round() / 10.0
}

/// The single classification point for the toxicity invariant.
pub fn is_toxic(risk_score: f64) -> bool {
    risk_score >= TOXIC_THRESHOLD
}

/// Obtains a rubric-constrained risk judgment for one clause from the
/// completion backend.
///
/// Never fails past this boundary: model-call failures and unparseable
/// output become `outcome: Error` results with a zero score. That fail-safe
/// favors "did not flag" over crashing the batch; the tradeoff is that a
/// transient parse error suppresses the clause from risk reporting (visible
/// only through `outcome`/`error_detail`).
pub struct RiskScorer {
    backend: Arc<dyn CompletionBackend>,
}

impl RiskScorer {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    pub async fn score(
        &self,
        clause: &ClauseRecord,
        context: &RetrievalContext,
    ) -> EvaluationResult {
        let prompt = rubric::build_scoring_prompt(&clause.text, &context.combined_text);

        let response = match self.backend.complete(&prompt).await {
            Ok(r) => r,
            Err(e) => {
                warn!(clause = clause.ordinal, "model call failed: {e}");
                return EvaluationResult::error(
                    clause,
                    context.combined_text.clone(),
                    format!("model call failed: {e}"),
                );
            }
        };

        let Some((raw_score, reason)) = parse_verdict(&response) else {
            warn!(
                clause = clause.ordinal,
                response_len = response.len(),
                "unparseable model output"
            );
            return EvaluationResult::error(
                clause,
                context.combined_text.clone(),
                format!("unparseable model output: {}", truncate(&response, 200)),
            );
        };

        let risk_score = normalize_score(raw_score);
        debug!(clause = clause.ordinal, score = risk_score, "clause scored");

        EvaluationResult {
            ordinal: clause.ordinal,
            clause_text: clause.text.clone(),
            risk_score,
            is_toxic: is_toxic(risk_score),
            reason,
            context_used: context.combined_text.clone(),
            suggestion: String::new(),
            outcome: EvalOutcome::Success,
            error_detail: String::new(),
        }
    }
}

/// Extract the outermost JSON object from a model response and read the
/// score/reason pair. Models occasionally wrap the JSON in prose or code
/// fences, so slice from the first `{` to the last `}` before parsing.
fn parse_verdict(output: &str) -> Option<(f64, String)> {
    let start = output.find('{')?;
    let end = output[start..].rfind('}')?;
    let v: serde_json::Value = serde_json::from_str(&output[start..start + end + 1]).ok()?;
    let score = v["score"].as_f64()?;
    let reason = v["reason"].as_str().unwrap_or("").to_string();
    Some((score, reason))
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
