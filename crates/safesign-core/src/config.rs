use std::collections::HashMap;

use anyhow::Result;

/// Full application configuration.
/// Sensitive fields (API keys) come from env/.env only and are never logged.
#[derive(Debug, Clone)]
pub struct Config {
    // Web
    pub web_bind: String,
    pub web_port: u16,
    /// Origins allowed to call the analyze endpoint (the external frontend).
    pub cors_origins: Vec<String>,

    // Model provider
    /// "gemini" (default) or "ollama" for local models.
    pub backend: String,
    pub model: String,
    /// Fallback credential when a request does not carry its own key.
    pub gemini_api_key: String,
    pub ollama_base_url: String,
    pub model_timeout_s: u64,

    // Retrieval indices (empty URL = index absent, retrieval degrades)
    pub statute_index_url: String,
    pub precedent_index_url: String,
    pub index_api_key: String,
    pub index_timeout_s: u64,
    pub statute_top_k: usize,
    pub precedent_top_k: usize,

    // Pipeline
    /// Upper bound on concurrently in-flight clause evaluations.
    pub max_concurrent: usize,
}

fn parse_dotenv() -> HashMap<String, String> {
    let mut map = HashMap::new();
    let Ok(contents) = std::fs::read_to_string(".env") else {
        return map;
    };
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((k, v)) = line.split_once('=') {
            map.insert(k.trim().to_string(), v.trim().to_string());
        }
    }
    map
}

fn get(key: &str, dotenv: &HashMap<String, String>) -> Option<String> {
    std::env::var(key).ok().or_else(|| dotenv.get(key).cloned())
}

fn get_str(key: &str, dotenv: &HashMap<String, String>, default: &str) -> String {
    get(key, dotenv).unwrap_or_else(|| default.to_string())
}

fn get_u16(key: &str, dotenv: &HashMap<String, String>, default: u16) -> u16 {
    get(key, dotenv)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn get_u64(key: &str, dotenv: &HashMap<String, String>, default: u64) -> u64 {
    get(key, dotenv)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn get_usize(key: &str, dotenv: &HashMap<String, String>, default: usize) -> usize {
    get(key, dotenv)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let dotenv = parse_dotenv();

        let cors_origins = get_str(
            "CORS_ORIGINS",
            &dotenv,
            "http://127.0.0.1:5173,http://localhost:5173",
        )
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

        Ok(Self {
            web_bind: get_str("WEB_BIND", &dotenv, "127.0.0.1"),
            web_port: get_u16("WEB_PORT", &dotenv, 8000),
            cors_origins,

            backend: get_str("BACKEND", &dotenv, "gemini"),
            model: get_str("MODEL", &dotenv, "gemini-2.5-flash-lite"),
            gemini_api_key: get_str("GEMINI_API_KEY", &dotenv, ""),
            ollama_base_url: get_str("OLLAMA_BASE_URL", &dotenv, "http://localhost:11434"),
            model_timeout_s: get_u64("MODEL_TIMEOUT_S", &dotenv, 120),

            statute_index_url: get_str("STATUTE_INDEX_URL", &dotenv, ""),
            precedent_index_url: get_str("PRECEDENT_INDEX_URL", &dotenv, ""),
            index_api_key: get_str("INDEX_API_KEY", &dotenv, ""),
            index_timeout_s: get_u64("INDEX_TIMEOUT_S", &dotenv, 15),
            statute_top_k: get_usize("STATUTE_TOP_K", &dotenv, 2),
            precedent_top_k: get_usize("PRECEDENT_TOP_K", &dotenv, 1),

            max_concurrent: get_usize("MAX_CONCURRENT", &dotenv, 5),
        })
    }
}
