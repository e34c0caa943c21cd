use crate::backends::{Backends, Summarizer};
use crate::metrics;
use crate::models::{BatchResponse, SummarizerChoice, SummaryResult};
use crate::normalize;
use crate::prompt;
use futures::StreamExt;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Orchestrates one batch: normalize each raw host, build its prompt, invoke
/// the selected strategy, and collect per-host outcomes in input order.
///
/// A host's failure never aborts the batch or touches another host's result;
/// errors are captured as data. Structural request problems (empty host list,
/// unknown selector) are rejected at the API boundary before this runs.
pub struct Dispatcher {
    backends: Backends,
    concurrency: usize,
}

impl Dispatcher {
    pub fn new(backends: Backends, concurrency: usize) -> Self {
        Self {
            backends,
            concurrency: concurrency.max(1),
        }
    }

    pub async fn run(&self, hosts: &[Value], choice: SummarizerChoice) -> BatchResponse {
        // Strategy selected once per request; per-item code never branches on
        // the concrete backend.
        let strategy = self.backends.select(choice);

        // `buffered` keeps the fan-out bounded and reassembles completions in
        // input order, so results[i] always matches hosts[i].
        let futures: Vec<_> = hosts
            .iter()
            .map(|raw| summarize_host(raw, Arc::clone(&strategy)))
            .collect();
        let results = futures::stream::iter(futures)
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        BatchResponse {
            summarizer_used: choice,
            results,
        }
    }
}

async fn summarize_host(raw: &Value, strategy: Arc<dyn Summarizer>) -> SummaryResult {
    let backend = strategy.name().as_str();

    let record = match normalize::normalize_host(raw) {
        Ok(record) => record,
        Err(error) => {
            debug!("host rejected by normalizer: {}", error);
            metrics::HOST_RESULTS
                .with_label_values(&[backend, "validation"])
                .inc();
            return SummaryResult::failed(raw_host_ip(raw), error.into());
        }
    };

    let prompt = prompt::build_prompt(&record);
    match strategy.summarize(&prompt).await {
        Ok(text) => {
            metrics::HOST_RESULTS
                .with_label_values(&[backend, "ok"])
                .inc();
            SummaryResult::ok(record.ip, text)
        }
        Err(error) => {
            debug!("backend failed for host {}: {}", record.ip, error);
            metrics::HOST_RESULTS
                .with_label_values(&[backend, error.kind.as_str()])
                .inc();
            SummaryResult::failed(record.ip, error.into())
        }
    }
}

/// Best-effort host identifier for records that failed validation, mirroring
/// the `ip`-or-`unknown` labelling of the response contract.
fn raw_host_ip(raw: &Value) -> String {
    raw.get("ip")
        .and_then(Value::as_str)
        .filter(|ip| !ip.trim().is_empty())
        .map(|ip| ip.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
