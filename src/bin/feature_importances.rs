//! Feature Importance Diagnostic
//!
//! Loads the model artifact and prints the forest's feature importances in
//! training column order.

use anyhow::Result;
use clap::Parser;
use health_risk_service::config::{AppConfig, DEFAULT_CONFIG_PATH};
use health_risk_service::models::ModelLoader;

#[derive(Debug, Parser)]
#[command(name = "feature-importances", about = "Print the model's feature importances")]
struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Also print one line per feature, most important first
    #[arg(long)]
    ranked: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load_from_path(&cli.config)?;

    let loader = ModelLoader::with_threads(config.model.onnx_threads);
    let (_model, metadata) = loader.load_artifact(&config.model)?;

    println!("Feature Importances: {:?}", metadata.feature_importances);

    if cli.ranked {
        for line in ranked_lines(&metadata.ranked_importances()) {
            println!("{}", line);
        }
    }

    Ok(())
}

/// One `name: weight` line per feature.
fn ranked_lines(ranked: &[(&str, f64)]) -> Vec<String> {
    ranked
        .iter()
        .map(|(name, weight)| format!("{}: {:.6}", name, weight))
        .collect()
}
