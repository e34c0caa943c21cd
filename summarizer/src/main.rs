use std::sync::Arc;
use tracing::info;
use warp::Filter;

use summarizer::api;
use summarizer::backends::Backends;
use summarizer::config::Config;
use summarizer::dispatch::Dispatcher;
use summarizer::middleware;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!("Starting host-scan summarization service");
    info!(
        "Configuration loaded (remote credential {}, local model {})",
        if config.remote_api_key.is_some() {
            "present"
        } else {
            "absent"
        },
        if config.disable_local_model {
            "disabled"
        } else {
            "enabled"
        }
    );

    let backends = Backends::from_config(&config)?;
    info!("Summarization backends initialized");

    let dispatcher = Arc::new(Dispatcher::new(backends, config.concurrent_summaries));

    let routes = api::app(dispatcher)
        .with(warp::log("api"))
        .with(middleware::cors());

    let addr = ([0, 0, 0, 0], config.port);
    info!("Server listening on {}", addr.1);

    warp::serve(routes).run(addr).await;

    Ok(())
}
