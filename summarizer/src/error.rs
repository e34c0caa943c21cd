use thiserror::Error;
use warp::{reject::Reject, Rejection, Reply};

/// Batch-level request failures. Per-host failures never surface here; they
/// are captured as data inside the response instead.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl Reject for ApiError {}

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Rejection> {
    if let Some(api_err) = err.find::<ApiError>() {
        let (code, message) = match api_err {
            ApiError::BadRequest(_) => (400, "Bad request"),
            ApiError::InternalError(_) => (500, "Internal server error"),
        };

        let json = warp::reply::json(&serde_json::json!({
            "error": message,
            "details": api_err.to_string(),
        }));

        Ok(warp::reply::with_status(
            json,
            warp::http::StatusCode::from_u16(code).unwrap(),
        ))
    } else if let Some(body_err) = err.find::<warp::filters::body::BodyDeserializeError>() {
        // Covers structurally malformed batches, including an unrecognized
        // summarizer selector, before any host is touched.
        let json = warp::reply::json(&serde_json::json!({
            "error": "Bad request",
            "details": body_err.to_string(),
        }));
        Ok(warp::reply::with_status(
            json,
            warp::http::StatusCode::BAD_REQUEST,
        ))
    } else {
        Err(err)
    }
}
