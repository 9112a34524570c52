use anyhow::Result;
use async_trait::async_trait;

/// A language-model completion capability: one prompt in, one full response
/// out. No streaming of the model's own output.
///
/// Passed explicitly as `Arc<dyn CompletionBackend>` so tests substitute
/// stubs. The core makes a single attempt per call; retry policy, if any,
/// lives in the implementation.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}
