pub mod api;
pub mod backends;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod normalize;
pub mod prompt;

pub use backends::{BackendError, BackendErrorKind, Backends, Summarizer};
pub use config::Config;
pub use dispatch::Dispatcher;
pub use models::{BatchRequest, BatchResponse, HostRecord, SummarizerChoice, SummaryResult};
pub use normalize::ValidationError;
