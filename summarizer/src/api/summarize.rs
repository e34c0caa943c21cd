use crate::dispatch::Dispatcher;
use crate::error::ApiError;
use crate::metrics;
use crate::models::BatchRequest;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use warp::{Rejection, Reply};

pub async fn handle_batch_summarize(
    request: BatchRequest,
    dispatcher: Arc<Dispatcher>,
) -> Result<impl Reply, Rejection> {
    metrics::REQUESTS
        .with_label_values(&["batch_summarize"])
        .inc();

    if request.hosts.is_empty() {
        return Err(warp::reject::custom(ApiError::BadRequest(
            "hosts list must not be empty".to_string(),
        )));
    }

    let request_id = Uuid::new_v4();
    info!(
        "processing batch [{}]: {} hosts via {} backend",
        request_id,
        request.hosts.len(),
        request.summarizer
    );

    let response = dispatcher.run(&request.hosts, request.summarizer).await;

    let failed = response.results.iter().filter(|r| !r.is_ok()).count();
    info!(
        "batch [{}] done: {} succeeded, {} failed",
        request_id,
        response.results.len() - failed,
        failed
    );

    Ok(warp::reply::json(&response))
}
