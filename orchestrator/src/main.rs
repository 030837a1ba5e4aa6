use purpose_orchestrator::agents::GeminiClient;
use purpose_orchestrator::api;
use purpose_orchestrator::config::Config;
use purpose_orchestrator::metrics::Metrics;
use purpose_orchestrator::pipeline::Pipeline;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Missing credentials stop the process here, before anything is served
    let config = Config::from_env()?;

    // Initialize tracing; RUST_LOG wins over LOG_LEVEL
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!("Starting personality and life purpose report service");
    info!(
        fast_model = %config.fast_model,
        robust_model = %config.robust_model,
        stage_timeout_secs = config.stage_timeout_secs,
        "Configuration loaded"
    );

    let provider = GeminiClient::new(config.gemini_config())?;
    info!("Gemini client initialized");

    let metrics = Metrics::new()?;
    let pipeline = Arc::new(Pipeline::new(
        Arc::new(provider),
        config.pipeline_settings(),
        metrics.clone(),
    ));

    let routes = api::app(pipeline, metrics, config.cors_origin.as_deref());

    // Start server
    let addr = ([0, 0, 0, 0], config.port);
    info!("Server listening on {}", addr.1);

    warp::serve(routes).run(addr).await;

    Ok(())
}
