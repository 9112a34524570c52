use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use safesign_core::index::SemanticIndex;

/// Client for an external embedding-index service exposing nearest-neighbor
/// search over one legal corpus.
///
/// The index is built and maintained by a separate process; this client only
/// queries it. One instance per corpus (statutes, precedents). Failures
/// propagate to the retriever, which degrades them to sentinel context.
pub struct HttpSemanticIndex {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    k: usize,
}

#[derive(Deserialize)]
struct SearchResponse {
    results: Vec<String>,
}

impl HttpSemanticIndex {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            api_key: String::new(),
            http,
        })
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }
}

#[async_trait]
impl SemanticIndex for HttpSemanticIndex {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<String>> {
        let url = format!("{}/search", self.base_url.trim_end_matches('/'));
        let mut req = self.http.post(&url).json(&SearchRequest { query, k });
        if !self.api_key.is_empty() {
            req = req.bearer_auth(&self.api_key);
        }
        let parsed: SearchResponse = req.send().await?.error_for_status()?.json().await?;
        debug!(k, returned = parsed.results.len(), "index search completed");
        Ok(parsed.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_request_wire_shape() {
        let body = serde_json::to_value(SearchRequest {
            query: "probation pay",
            k: 2,
        })
        .unwrap();
        assert_eq!(body["query"], "probation pay");
        assert_eq!(body["k"], 2);
    }

    #[test]
    fn search_response_parses_results() {
        let parsed: SearchResponse =
            serde_json::from_str(r#"{"results":["Labor Standards Act art. 20"]}"#).unwrap();
        assert_eq!(parsed.results.len(), 1);
    }
}
