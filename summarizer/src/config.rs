use anyhow::{Context, Result};

/// Process-wide configuration, loaded once from the environment at startup
/// and treated as read-only afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Credential for the hosted backend. Absence is a valid state: the
    /// remote strategy then reports AuthMissing per host instead of crashing.
    pub remote_api_key: Option<String>,
    pub remote_api_url: String,
    pub remote_model: String,
    pub remote_max_tokens: u32,
    /// Set for constrained deployments that ship without the local engine.
    pub disable_local_model: bool,
    pub local_max_input_tokens: usize,
    /// Bound on the per-batch summarization fan-out.
    pub concurrent_summaries: usize,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid port number")?,
            remote_api_key: std::env::var("REMOTE_API_KEY").ok(),
            remote_api_url: std::env::var("REMOTE_API_URL")
                .unwrap_or_else(|_| "https://api.groq.com/openai/v1/chat/completions".to_string()),
            remote_model: std::env::var("REMOTE_MODEL")
                .unwrap_or_else(|_| "llama-3.1-8b-instant".to_string()),
            remote_max_tokens: std::env::var("REMOTE_MAX_TOKENS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .context("REMOTE_MAX_TOKENS must be a positive integer")?,
            disable_local_model: std::env::var("DISABLE_LOCAL_MODEL")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(false),
            local_max_input_tokens: std::env::var("LOCAL_MODEL_MAX_INPUT_TOKENS")
                .unwrap_or_else(|_| "512".to_string())
                .parse()
                .context("LOCAL_MODEL_MAX_INPUT_TOKENS must be a positive integer")?,
            concurrent_summaries: std::env::var("CONCURRENT_SUMMARIES")
                .unwrap_or_else(|_| "4".to_string())
                .parse::<usize>()
                .context("CONCURRENT_SUMMARIES must be a positive integer")?
                .max(1),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }
}
