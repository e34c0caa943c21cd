use httpmock::prelude::*;
use serde_json::json;
use std::sync::Arc;
use summarizer::backends::{BackendErrorKind, Backends, RemoteSummarizer, Summarizer};
use summarizer::config::Config;
use summarizer::dispatch::Dispatcher;
use summarizer::models::SummarizerChoice;

fn config_for(server: &MockServer, api_key: Option<&str>) -> Config {
    Config {
        port: 0,
        remote_api_key: api_key.map(String::from),
        remote_api_url: server.url("/openai/v1/chat/completions"),
        remote_model: "llama-3.1-8b-instant".into(),
        remote_max_tokens: 300,
        disable_local_model: false,
        local_max_input_tokens: 512,
        concurrent_summaries: 4,
        log_level: "info".into(),
    }
}

fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    })
}

#[tokio::test]
async fn remote_backend_returns_upstream_completion() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/openai/v1/chat/completions")
            .header("authorization", "Bearer test-key")
            .json_body_partial(r#"{"model": "llama-3.1-8b-instant", "temperature": 0.3}"#);
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(completion_body("  Host runs nginx 1.18 on 443.  "));
    });

    let backend = RemoteSummarizer::from_config(&config_for(&server, Some("test-key"))).unwrap();
    let summary = backend.summarize("scan prompt").await.unwrap();

    mock.assert();
    assert_eq!(summary, "Host runs nginx 1.18 on 443.");
}

#[tokio::test]
async fn missing_credential_never_reaches_the_network() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/openai/v1/chat/completions");
        then.status(200).json_body(completion_body("unused"));
    });

    let backend = RemoteSummarizer::from_config(&config_for(&server, None)).unwrap();
    let error = backend.summarize("scan prompt").await.unwrap_err();

    assert_eq!(error.kind, BackendErrorKind::AuthMissing);
    assert_eq!(mock.hits(), 0);
}

#[tokio::test]
async fn non_success_status_maps_to_upstream_error_with_status() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/openai/v1/chat/completions");
        then.status(500).body("model overloaded");
    });

    let backend = RemoteSummarizer::from_config(&config_for(&server, Some("test-key"))).unwrap();
    let error = backend.summarize("scan prompt").await.unwrap_err();

    assert_eq!(error.kind, BackendErrorKind::UpstreamError);
    assert!(error.message.contains("500"));
    assert!(error.message.contains("model overloaded"));
}

#[tokio::test]
async fn empty_choices_map_to_upstream_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/openai/v1/chat/completions");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({"choices": []}));
    });

    let backend = RemoteSummarizer::from_config(&config_for(&server, Some("test-key"))).unwrap();
    let error = backend.summarize("scan prompt").await.unwrap_err();

    assert_eq!(error.kind, BackendErrorKind::UpstreamError);
    assert!(error.message.contains("no completion"));
}

#[tokio::test]
async fn unreachable_endpoint_maps_to_network_error() {
    let server = MockServer::start();
    let mut config = config_for(&server, Some("test-key"));
    // Port 1 is reserved and closed; the connection attempt fails fast.
    config.remote_api_url = "http://127.0.0.1:1/openai/v1/chat/completions".into();

    let backend = RemoteSummarizer::from_config(&config).unwrap();
    let error = backend.summarize("scan prompt").await.unwrap_err();

    assert_eq!(error.kind, BackendErrorKind::NetworkError);
}

#[tokio::test]
async fn full_batch_through_dispatcher_with_mocked_upstream() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/openai/v1/chat/completions");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(completion_body("Summarized."));
    });

    let config = config_for(&server, Some("test-key"));
    let dispatcher = Dispatcher::new(
        Backends::from_config(&config).unwrap(),
        config.concurrent_summaries,
    );

    let hosts = vec![
        json!({"ip": "10.0.0.1", "services": [{"port": 80, "software": "Apache"}]}),
        json!({"ip": "", "services": []}),
        json!({"ip": "10.0.0.3"}),
    ];
    let response = dispatcher.run(&hosts, SummarizerChoice::Remote).await;

    assert_eq!(response.results.len(), 3);
    assert_eq!(response.results[0].summary_text(), Some("Summarized."));
    assert_eq!(response.results[1].error().unwrap().kind, "validation");
    assert_eq!(response.results[2].summary_text(), Some("Summarized."));
    // Only the two valid hosts produced upstream calls.
    assert_eq!(mock.hits(), 2);
}
