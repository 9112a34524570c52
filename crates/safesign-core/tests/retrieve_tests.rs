// Context retriever: independent statute/precedent queries, sentinel
// degradation, and the fixed combined-text structure the scorer relies on.

use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;

use safesign_core::index::SemanticIndex;
use safesign_core::retrieve::{
    ContextRetriever, NO_PRECEDENT_RESULT, NO_STATUTE_RESULT, PRECEDENT_HEADER, STATUTE_HEADER,
};

// ── Stubs ────────────────────────────────────────────────────────────────

struct StaticIndex {
    snippets: Vec<String>,
}

#[async_trait]
impl SemanticIndex for StaticIndex {
    async fn search(&self, _query: &str, k: usize) -> Result<Vec<String>> {
        Ok(self.snippets.iter().take(k).cloned().collect())
    }
}

struct BrokenIndex;

#[async_trait]
impl SemanticIndex for BrokenIndex {
    async fn search(&self, _query: &str, _k: usize) -> Result<Vec<String>> {
        bail!("index unreachable")
    }
}

fn static_index(snippets: &[&str]) -> Arc<dyn SemanticIndex> {
    Arc::new(StaticIndex {
        snippets: snippets.iter().map(|s| s.to_string()).collect(),
    })
}

// =============================================================================
// Happy path: both corpora answer
// =============================================================================

#[tokio::test]
async fn test_combined_text_carries_both_labeled_sections() {
    let retriever = ContextRetriever::new(
        Some(static_index(&[
            "Labor Standards Act art. 56 (overtime pay)",
            "Labor Standards Act art. 20 (no predetermined damages)",
        ])),
        Some(static_index(&["Supreme Court 2010da1234 (comprehensive wage)"])),
    );

    let ctx = retriever.retrieve("wage includes all overtime pay").await;

    assert_eq!(ctx.law_snippets.len(), 2);
    assert_eq!(
        ctx.precedent_snippet,
        "Supreme Court 2010da1234 (comprehensive wage)"
    );
    assert!(ctx.combined_text.contains(STATUTE_HEADER));
    assert!(ctx.combined_text.contains(PRECEDENT_HEADER));
    assert!(ctx.combined_text.contains("art. 56"));
    // Statutes section precedes precedents.
    let s = ctx.combined_text.find(STATUTE_HEADER).unwrap();
    let p = ctx.combined_text.find(PRECEDENT_HEADER).unwrap();
    assert!(s < p);
}

#[tokio::test]
async fn test_top_k_limits_statute_snippets() {
    let retriever = ContextRetriever::new(
        Some(static_index(&["first", "second", "third"])),
        Some(static_index(&["precedent one", "precedent two"])),
    )
    .with_top_k(1, 1);

    let ctx = retriever.retrieve("any clause").await;

    assert_eq!(ctx.law_snippets, vec!["first".to_string()]);
    assert_eq!(ctx.precedent_snippet, "precedent one");
}

// =============================================================================
// Degradation: absent index, broken index, empty results are never fatal
// =============================================================================

#[tokio::test]
async fn test_absent_indices_degrade_to_sentinels() {
    let retriever = ContextRetriever::new(None, None);

    let ctx = retriever.retrieve("any clause").await;

    assert!(ctx.law_snippets.is_empty());
    assert_eq!(ctx.precedent_snippet, NO_PRECEDENT_RESULT);
    assert!(ctx.combined_text.contains(NO_STATUTE_RESULT));
    assert!(ctx.combined_text.contains(NO_PRECEDENT_RESULT));
    // Structure stays intact so the prompt is never malformed.
    assert!(ctx.combined_text.contains(STATUTE_HEADER));
    assert!(ctx.combined_text.contains(PRECEDENT_HEADER));
}

#[tokio::test]
async fn test_unreachable_index_degrades_to_sentinel() {
    let retriever = ContextRetriever::new(
        Some(Arc::new(BrokenIndex)),
        Some(static_index(&["a precedent that still arrives"])),
    );

    let ctx = retriever.retrieve("any clause").await;

    assert!(ctx.combined_text.contains(NO_STATUTE_RESULT));
    assert_eq!(ctx.precedent_snippet, "a precedent that still arrives");
}

#[tokio::test]
async fn test_empty_search_results_degrade_to_sentinels() {
    let retriever =
        ContextRetriever::new(Some(static_index(&[])), Some(static_index(&[])));

    let ctx = retriever.retrieve("any clause").await;

    assert!(ctx.combined_text.contains(NO_STATUTE_RESULT));
    assert_eq!(ctx.precedent_snippet, NO_PRECEDENT_RESULT);
}
