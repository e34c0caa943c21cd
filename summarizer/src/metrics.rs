use prometheus::{register_int_counter_vec, IntCounterVec};
use std::sync::LazyLock;

pub static REQUESTS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "summarizer_requests_total",
        "API requests received, by operation",
        &["operation"]
    )
    .unwrap()
});

pub static HOST_RESULTS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "summarizer_host_results_total",
        "Per-host summarization outcomes, by backend and outcome",
        &["backend", "outcome"]
    )
    .unwrap()
});
