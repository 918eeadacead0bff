//! ONNX model loader

use anyhow::{Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::Path;
use tracing::info;

use crate::config::ModelConfig;
use crate::models::metadata::ModelMetadata;

/// Loaded ONNX model with metadata
pub struct LoadedModel {
    /// Model name (file stem)
    pub name: String,
    /// ONNX Runtime session
    pub session: Session,
    /// Input name for the model
    pub input_name: String,
    /// Output name for predicted labels
    pub label_output: String,
    /// Output name for class probabilities, if the export has one
    pub probability_output: Option<String>,
}

/// Loader for the random forest artifact
pub struct ModelLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a new model loader with default settings (1 thread)
    pub fn new() -> Self {
        Self::with_threads(1)
    }

    /// Create a new model loader with specified number of threads
    pub fn with_threads(onnx_threads: usize) -> Self {
        Self {
            onnx_threads: onnx_threads.max(1),
        }
    }

    /// Load the ONNX model from file
    pub fn load_model<P: AsRef<Path>>(&self, path: P) -> Result<LoadedModel> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model".to_string());

        info!(model = %name, path = %path.display(), threads = self.onnx_threads, "Loading ONNX model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.onnx_threads)?
            .commit_from_file(path)
            .context(format!("Failed to load model from {:?}", path))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        // skl2onnx names the outputs "output_label" and "output_probability"
        let label_output = session
            .outputs
            .iter()
            .find(|o| o.name.contains("label"))
            .or_else(|| session.outputs.first())
            .map(|o| o.name.clone())
            .unwrap_or_else(|| "output_label".to_string());

        let probability_output = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob"))
            .map(|o| o.name.clone());

        info!(
            model = %name,
            input = %input_name,
            label_output = %label_output,
            probability_output = ?probability_output,
            "Model loaded successfully"
        );

        Ok(LoadedModel {
            name,
            session,
            input_name,
            label_output,
            probability_output,
        })
    }

    /// Load the training metadata sidecar
    pub fn load_metadata<P: AsRef<Path>>(&self, path: P) -> Result<ModelMetadata> {
        let path = path.as_ref();
        let metadata = ModelMetadata::from_file(path)?;
        info!(
            path = %path.display(),
            features = metadata.feature_importances.len(),
            classes = ?metadata.classes,
            "Model metadata loaded"
        );
        Ok(metadata)
    }

    /// Load both halves of the model artifact
    pub fn load_artifact(&self, config: &ModelConfig) -> Result<(LoadedModel, ModelMetadata)> {
        let metadata = self.load_metadata(&config.metadata_path)?;
        let model = self.load_model(&config.path)?;
        Ok((model, metadata))
    }
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self::new()
    }
}
