use std::sync::Arc;

use tracing::warn;

use crate::completion::CompletionBackend;
use crate::types::EvaluationResult;

/// Fixed answer for clauses that were not flagged; no model call is made.
pub const SAFE_CLAUSE_MESSAGE: &str = "**This clause is safe.**";

/// Fixed placeholder when suggestion generation fails, so one failed
/// suggestion never blocks reporting of the evaluation itself.
pub const SUGGESTION_FAILED: &str = "Suggestion generation failed.";

/// Second-stage generator: plain-language risk explanation plus a compliant
/// redraft for flagged clauses.
pub struct SuggestionGenerator {
    backend: Arc<dyn CompletionBackend>,
}

impl SuggestionGenerator {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    pub async fn suggest(&self, result: &EvaluationResult) -> String {
        if !result.is_toxic {
            return SAFE_CLAUSE_MESSAGE.to_string();
        }

        let prompt = build_suggestion_prompt(
            &result.clause_text,
            &result.reason,
            &result.context_used,
        );
        match self.backend.complete(&prompt).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => SUGGESTION_FAILED.to_string(),
            Err(e) => {
                warn!(clause = result.ordinal, "suggestion generation failed: {e}");
                SUGGESTION_FAILED.to_string()
            }
        }
    }
}

fn build_suggestion_prompt(clause: &str, reason: &str, context: &str) -> String {
    format!(
        "You are a legal expert on the worker's side. Analyze this problematic clause.\n\n\
[Clause]: {clause}\n\
[Risk rationale]: {reason}\n\
[Legal grounding]: {context}\n\n\
Write exactly the following two labeled sections, in markdown:\n\
1. **Plain-language risk**: 1-2 sentences a worker can understand, explaining why this clause is risky.\n\
2. **Suggested redraft**: an example of a fair, legally compliant replacement clause."
    )
}
