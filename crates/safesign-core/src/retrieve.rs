use std::sync::Arc;

use tracing::warn;

use crate::{index::SemanticIndex, types::RetrievalContext};

/// Sentinel substituted when the statute query yields nothing, so the
/// scoring prompt never carries an empty context section.
pub const NO_STATUTE_RESULT: &str =
    "No relevant statutes found (judge from general labor-law knowledge)";
/// Sentinel substituted when the precedent query yields nothing.
pub const NO_PRECEDENT_RESULT: &str = "No relevant precedent found";

/// Fixed section headers the scorer relies on for citation in its reasoning.
pub const STATUTE_HEADER: &str = "=== [Relevant Statutes] ===";
pub const PRECEDENT_HEADER: &str = "=== [Relevant Precedents] ===";

/// Attaches statute and precedent context to a clause before scoring.
///
/// Runs two independent nearest-neighbor queries per clause. Retrieval is
/// advisory: a missing index, a failed search, or an empty result degrades
/// to sentinel text and never fails the clause.
pub struct ContextRetriever {
    statutes: Option<Arc<dyn SemanticIndex>>,
    precedents: Option<Arc<dyn SemanticIndex>>,
    statute_top_k: usize,
    precedent_top_k: usize,
}

impl ContextRetriever {
    pub fn new(
        statutes: Option<Arc<dyn SemanticIndex>>,
        precedents: Option<Arc<dyn SemanticIndex>>,
    ) -> Self {
        Self {
            statutes,
            precedents,
            statute_top_k: 2,
            precedent_top_k: 1,
        }
    }

    pub fn with_top_k(mut self, statute_top_k: usize, precedent_top_k: usize) -> Self {
        self.statute_top_k = statute_top_k.max(1);
        self.precedent_top_k = precedent_top_k.max(1);
        self
    }

    /// Build the retrieval context for one clause. Each clause gets an
    /// independent query; results are never cached across clauses.
    pub async fn retrieve(&self, clause_text: &str) -> RetrievalContext {
        let law_snippets = self
            .query(self.statutes.as_deref(), clause_text, self.statute_top_k, "statute")
            .await;
        let precedent_snippet = self
            .query(
                self.precedents.as_deref(),
                clause_text,
                self.precedent_top_k,
                "precedent",
            )
            .await
            .into_iter()
            .next()
            .unwrap_or_else(|| NO_PRECEDENT_RESULT.to_string());

        let law_text = if law_snippets.is_empty() {
            NO_STATUTE_RESULT.to_string()
        } else {
            law_snippets.join("\n")
        };

        let combined_text = format!(
            "{STATUTE_HEADER}\n{law_text}\n\n{PRECEDENT_HEADER}\n{precedent_snippet}"
        );

        RetrievalContext {
            law_snippets,
            precedent_snippet,
            combined_text,
        }
    }

    async fn query(
        &self,
        index: Option<&dyn SemanticIndex>,
        clause_text: &str,
        k: usize,
        corpus: &str,
    ) -> Vec<String> {
        let Some(index) = index else {
            return Vec::new();
        };
        match index.search(clause_text, k).await {
            Ok(snippets) => snippets,
            Err(e) => {
                warn!(corpus, "index search failed, degrading to sentinel: {e}");
                Vec::new()
            }
        }
    }
}
