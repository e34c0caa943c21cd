use super::{BackendError, BackendErrorKind, Summarizer};
use crate::config::Config;
use crate::models::SummarizerChoice;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

const SYSTEM_PROMPT: &str = "You are a senior cybersecurity analyst. Summarize network \
scan findings accurately and concisely, without inventing details that are not present \
in the data.";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// Low temperature: factual restatement of scan data, not creative writing.
const TEMPERATURE: f64 = 0.3;

const UPSTREAM_DETAIL_LIMIT: usize = 200;

/// Strategy backed by a hosted OpenAI-compatible chat-completions endpoint.
///
/// The credential is optional at construction; a missing key is a valid,
/// detectable state that surfaces as `AuthMissing` per host without any
/// network call being attempted.
pub struct RemoteSummarizer {
    client: Client,
    api_key: Option<String>,
    api_url: String,
    model: String,
    max_tokens: u32,
}

impl RemoteSummarizer {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key: config.remote_api_key.clone(),
            api_url: config.remote_api_url.clone(),
            model: config.remote_model.clone(),
            max_tokens: config.remote_max_tokens,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[async_trait]
impl Summarizer for RemoteSummarizer {
    async fn summarize(&self, prompt: &str) -> Result<String, BackendError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            BackendError::new(
                BackendErrorKind::AuthMissing,
                "no API credential configured for the remote backend",
            )
        })?;

        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": prompt},
            ],
            "temperature": TEMPERATURE,
            "max_tokens": self.max_tokens,
        });

        debug!("calling remote model {} at {}", self.model, self.api_url);
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::new(BackendErrorKind::NetworkError, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!("remote backend returned {}: {}", status, detail);
            return Err(BackendError::new(
                BackendErrorKind::UpstreamError,
                format!("upstream returned {}: {}", status, truncate(&detail)),
            ));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            BackendError::new(
                BackendErrorKind::UpstreamError,
                format!("unreadable upstream response: {}", e),
            )
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                BackendError::new(
                    BackendErrorKind::UpstreamError,
                    "upstream response contained no completion",
                )
            })
    }

    fn name(&self) -> SummarizerChoice {
        SummarizerChoice::Remote
    }
}

fn truncate(detail: &str) -> String {
    detail.chars().take(UPSTREAM_DETAIL_LIMIT).collect()
}
