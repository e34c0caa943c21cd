use crate::dispatch::Dispatcher;
use crate::error::ApiError;
use crate::metrics;
use crate::models::SummarizerChoice;
use bytes::Buf;
use futures::TryStreamExt;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;
use warp::multipart::FormData;
use warp::{Rejection, Reply};

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    pub summarizer: Option<String>,
}

/// Accepts a JSON dataset as a multipart `file` part and feeds it through the
/// same dispatcher contract as the batch endpoint.
pub async fn handle_upload_dataset(
    params: UploadParams,
    mut form: FormData,
    dispatcher: Arc<Dispatcher>,
) -> Result<impl Reply, Rejection> {
    metrics::REQUESTS.with_label_values(&["upload_dataset"]).inc();

    let choice = match params.summarizer.as_deref() {
        None => SummarizerChoice::Remote,
        Some(value) => value
            .parse::<SummarizerChoice>()
            .map_err(|e| warp::reject::custom(ApiError::BadRequest(e)))?,
    };

    let mut filename = String::new();
    let mut file_bytes = Vec::new();

    while let Ok(Some(part)) = form.try_next().await {
        let name = part.name().to_string();
        if name == "file" {
            filename = part.filename().unwrap_or("").to_string();
            file_bytes = part
                .stream()
                .try_fold(Vec::new(), |mut vec, data| async move {
                    vec.extend_from_slice(data.chunk());
                    Ok(vec)
                })
                .await
                .map_err(|e| {
                    warp::reject::custom(ApiError::BadRequest(format!(
                        "unreadable file part: {}",
                        e
                    )))
                })?;
        }
    }

    if file_bytes.is_empty() {
        return Err(warp::reject::custom(ApiError::BadRequest(
            "no file uploaded".to_string(),
        )));
    }
    if !filename.ends_with(".json") {
        return Err(warp::reject::custom(ApiError::BadRequest(
            "file must be a JSON document (.json)".to_string(),
        )));
    }

    let document: Value = serde_json::from_slice(&file_bytes).map_err(|e| {
        warp::reject::custom(ApiError::BadRequest(format!("invalid JSON file: {}", e)))
    })?;

    let hosts = hosts_from_document(document);
    if hosts.is_empty() {
        return Err(warp::reject::custom(ApiError::BadRequest(
            "document contains no host records".to_string(),
        )));
    }

    info!(
        "dataset '{}' decoded: {} hosts via {} backend",
        filename,
        hosts.len(),
        choice
    );

    let response = dispatcher.run(&hosts, choice).await;
    Ok(warp::reply::json(&response))
}

/// Uploaded documents come in three shapes: a top-level array of hosts, an
/// object with a `hosts` key, or a bare single host object.
fn hosts_from_document(document: Value) -> Vec<Value> {
    match document {
        Value::Array(items) => items,
        Value::Object(mut object) => match object.remove("hosts") {
            Some(Value::Array(items)) => items,
            Some(other) => vec![other],
            None => vec![Value::Object(object)],
        },
        other => vec![other],
    }
}
