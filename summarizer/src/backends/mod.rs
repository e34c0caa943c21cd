use crate::config::Config;
use crate::models::{ErrorInfo, SummarizerChoice};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub mod local;
pub mod remote;

pub use local::LocalSummarizer;
pub use remote::RemoteSummarizer;

/// Failure classes a summarization backend can report for one host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// No credential configured for the remote backend.
    AuthMissing,
    /// Transport-level failure reaching the remote endpoint.
    NetworkError,
    /// The remote endpoint answered with a non-success response.
    UpstreamError,
    /// The local model was not loaded at startup.
    ModelUnavailable,
}

impl BackendErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendErrorKind::AuthMissing => "auth_missing",
            BackendErrorKind::NetworkError => "network_error",
            BackendErrorKind::UpstreamError => "upstream_error",
            BackendErrorKind::ModelUnavailable => "model_unavailable",
        }
    }
}

impl fmt::Display for BackendErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct BackendError {
    pub kind: BackendErrorKind,
    pub message: String,
}

impl BackendError {
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<BackendError> for ErrorInfo {
    fn from(error: BackendError) -> Self {
        ErrorInfo {
            kind: error.kind.as_str().to_string(),
            message: error.message,
        }
    }
}

/// A summarization strategy. The dispatcher only ever sees this trait; which
/// concrete backend sits behind it is decided once per request.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, prompt: &str) -> Result<String, BackendError>;

    /// Backend name for logs and metrics labels.
    fn name(&self) -> SummarizerChoice;
}

/// The two strategies, built once at startup from read-only configuration and
/// shared across requests without further mutation.
#[derive(Clone)]
pub struct Backends {
    remote: Arc<dyn Summarizer>,
    local: Arc<dyn Summarizer>,
}

impl Backends {
    pub fn new(remote: Arc<dyn Summarizer>, local: Arc<dyn Summarizer>) -> Self {
        Self { remote, local }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(
            Arc::new(RemoteSummarizer::from_config(config)?),
            Arc::new(LocalSummarizer::from_config(config)),
        ))
    }

    pub fn select(&self, choice: SummarizerChoice) -> Arc<dyn Summarizer> {
        match choice {
            SummarizerChoice::Remote => Arc::clone(&self.remote),
            SummarizerChoice::Local => Arc::clone(&self.local),
        }
    }
}
