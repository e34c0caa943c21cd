use crate::dispatch::Dispatcher;
use crate::error;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, Rejection, Reply};

mod summarize;
mod upload;

/// The full application surface: core API plus health and metrics, with the
/// shared rejection handler applied. `main` only adds logging and CORS.
pub fn app(
    dispatcher: Arc<Dispatcher>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::json(&serde_json::json!({"status": "ok"})));

    let metrics = warp::path("metrics").and(warp::get()).map(|| {
        use prometheus::{Encoder, TextEncoder};
        let encoder = TextEncoder::new();
        let metric_families = prometheus::gather();
        let mut buffer = vec![];
        encoder.encode(&metric_families, &mut buffer).unwrap();
        warp::reply::with_header(buffer, "Content-Type", encoder.format_type())
    });

    health
        .or(metrics)
        .or(routes(dispatcher))
        .recover(error::handle_rejection)
}

pub fn routes(
    dispatcher: Arc<Dispatcher>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let api = warp::path("api").and(warp::path("v1"));

    let batch_route = api
        .and(warp::path("batch_summarize"))
        .and(warp::post())
        .and(warp::body::content_length_limit(4 * 1024 * 1024))
        .and(warp::body::json())
        .and(with_dispatcher(dispatcher.clone()))
        .and_then(summarize::handle_batch_summarize);

    let upload_route = api
        .and(warp::path("upload_dataset"))
        .and(warp::post())
        .and(warp::query::<upload::UploadParams>())
        .and(warp::multipart::form().max_length(16 * 1024 * 1024))
        .and(with_dispatcher(dispatcher))
        .and_then(upload::handle_upload_dataset);

    batch_route.or(upload_route)
}

fn with_dispatcher(
    dispatcher: Arc<Dispatcher>,
) -> impl Filter<Extract = (Arc<Dispatcher>,), Error = Infallible> + Clone {
    warp::any().map(move || dispatcher.clone())
}
