use anyhow::Result;
use async_trait::async_trait;

/// A read-only semantic index over a legal corpus (statutes or precedents).
///
/// Indices are built and maintained by an external process; the pipeline
/// only queries them. Implementations must be safe for concurrent reads.
#[async_trait]
pub trait SemanticIndex: Send + Sync {
    /// Return up to `k` text snippets ranked by embedding distance to
    /// `query`. An empty Vec is a valid answer.
    async fn search(&self, query: &str, k: usize) -> Result<Vec<String>>;
}
