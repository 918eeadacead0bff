//! Health Risk Prediction Service - Main Entry Point
//!
//! Loads the random forest once, then serves `POST /api/predict` until Ctrl+C.

use anyhow::Result;
use clap::Parser;
use health_risk_service::{
    config::{AppConfig, DEFAULT_CONFIG_PATH},
    http::{self, ApiState},
    logging,
    metrics::{MetricsReporter, ServiceMetrics},
    models::{InferenceEngine, Predictor},
};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Parser)]
#[command(name = "health-risk-service", about = "Serve health-risk predictions over HTTP")]
struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load_from_path(&cli.config)?;
    logging::init(&config.logging)?;

    info!("Starting Health Risk Prediction Service");
    info!(
        config = %cli.config,
        model = %config.model.path,
        metadata = %config.model.metadata_path,
        "Configuration loaded successfully"
    );

    // Model load failures are fatal
    let engine = InferenceEngine::new(&config)?;
    info!(
        model = %engine.model_name(),
        features = engine.metadata().feature_importances.len(),
        "Model ready"
    );

    let metrics = Arc::new(ServiceMetrics::new());
    if config.metrics.report_interval_secs > 0 {
        let reporter = MetricsReporter::new(metrics.clone(), config.metrics.report_interval_secs);
        tokio::spawn(reporter.start());
    }

    let state = ApiState::new(Arc::new(engine), metrics.clone());
    info!(
        "Feature extractor initialized ({} features)",
        state.extractor.feature_count()
    );
    debug!(columns = ?state.extractor.feature_names(), "Feature column order");
    let app = http::router(state, &config.server.cors_allowed_origins);

    http::serve(&config.server.bind_address(), app).await?;

    info!("Service shutting down...");
    metrics.print_summary();

    Ok(())
}
