//! Inference engine for the health-risk random forest

use crate::config::AppConfig;
use crate::error::ServiceError;
use crate::models::loader::{LoadedModel, ModelLoader};
use crate::models::metadata::ModelMetadata;
use crate::types::prediction::{Label, Prediction};
use crate::types::row::FeatureRow;
use anyhow::{anyhow, Context, Result};
use ort::memory::Allocator;
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType};
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Anything that can turn one feature row into a prediction.
///
/// The HTTP layer only sees this trait, so handlers can be exercised
/// without an ONNX runtime.
pub trait Predictor: Send + Sync {
    /// Run the model on a single row.
    fn predict(&self, row: &FeatureRow) -> Result<Prediction, ServiceError>;

    /// Name of the loaded model, for logs and the health endpoint.
    fn model_name(&self) -> &str;
}

/// Random forest inference using ONNX Runtime
pub struct InferenceEngine {
    /// Loaded ONNX model; a session run needs exclusive access
    model: Mutex<LoadedModel>,
    /// Model name, cached outside the lock
    name: String,
    /// Training metadata
    metadata: ModelMetadata,
}

impl InferenceEngine {
    /// Create a new inference engine from configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        let loader = ModelLoader::with_threads(config.model.onnx_threads);
        let (model, metadata) = loader.load_artifact(&config.model)?;
        Ok(Self::from_parts(model, metadata))
    }

    /// Assemble an engine from an already loaded model and its metadata
    pub fn from_parts(model: LoadedModel, metadata: ModelMetadata) -> Self {
        let name = model.name.clone();
        info!(model = %name, "Inference engine initialized");
        Self {
            model: Mutex::new(model),
            name,
            metadata,
        }
    }

    /// Training metadata of the loaded model
    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    /// Run the session on a flat feature vector
    fn run(&self, features: &[f32]) -> Result<Prediction> {
        use ort::value::Tensor;

        let mut guard = self
            .model
            .lock()
            .map_err(|e| anyhow!("Lock error: {}", e))?;
        let model = &mut *guard;

        // Prepare input tensor - shape [1, num_features]
        let shape = vec![1_i64, features.len() as i64];
        let input_tensor =
            Tensor::from_array((shape, features.to_vec())).context("Failed to create input tensor")?;

        let outputs = model
            .session
            .run(ort::inputs![&model.input_name => input_tensor])?;

        let labels = Self::extract_labels(&outputs, &model.label_output)?;

        let probabilities = match &model.probability_output {
            Some(name) => match Self::extract_probabilities(&outputs, name) {
                Ok(probs) => Some(probs),
                Err(e) => {
                    warn!(model = %model.name, error = %e, "Could not extract class probabilities");
                    None
                }
            },
            None => None,
        };

        Ok(Prediction {
            labels,
            probabilities,
        })
    }

    /// Read predicted labels; sklearn exports them as int64 or string tensors
    fn extract_labels(outputs: &ort::session::SessionOutputs, output_name: &str) -> Result<Vec<Label>> {
        let output = outputs
            .get(output_name)
            .ok_or_else(|| anyhow!("Model has no output named {}", output_name))?;

        if let Ok((_, data)) = output.try_extract_tensor::<i64>() {
            return Ok(data.iter().map(|&v| Label::Int(v)).collect());
        }

        if let Ok((_, data)) = output.try_extract_tensor::<f32>() {
            return Ok(data.iter().map(|&v| Label::Float(v as f64)).collect());
        }

        if let Ok((_, data)) = output.try_extract_strings() {
            return Ok(data.into_iter().map(Label::Text).collect());
        }

        Err(anyhow!(
            "Unsupported label output type {:?} for {}",
            output.dtype(),
            output_name
        ))
    }

    /// Extract class probabilities for the first row.
    /// Handles plain tensors and the seq(map) layout produced with zipmap enabled.
    fn extract_probabilities(outputs: &ort::session::SessionOutputs, output_name: &str) -> Result<Vec<f32>> {
        let output = outputs
            .get(output_name)
            .ok_or_else(|| anyhow!("Model has no output named {}", output_name))?;

        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            let dims: Vec<i64> = shape.iter().copied().collect();
            return Ok(first_row(&dims, data));
        }

        if DynSequenceValueType::can_downcast(&output.dtype()) {
            return Self::extract_from_sequence_map(output);
        }

        Err(anyhow!("Unsupported probability output type {:?}", output.dtype()))
    }

    /// Extract probabilities from seq(map(int64, float)) format
    fn extract_from_sequence_map(output: &ort::value::DynValue) -> Result<Vec<f32>> {
        let allocator = Allocator::default();

        let sequence = output
            .downcast_ref::<DynSequenceValueType>()
            .map_err(|e| anyhow!("Failed to downcast to sequence: {}", e))?;

        let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;
        let map_value = maps.first().ok_or_else(|| anyhow!("Empty sequence"))?;

        let mut kv_pairs = map_value.try_extract_key_values::<i64, f32>()?;
        kv_pairs.sort_by_key(|(class_id, _)| *class_id);

        Ok(kv_pairs.into_iter().map(|(_, prob)| prob).collect())
    }
}

/// Slice the first row out of a `[batch, classes]` or `[classes]` tensor
fn first_row(dims: &[i64], data: &[f32]) -> Vec<f32> {
    match dims {
        [_, classes] if *classes > 0 => data.iter().take(*classes as usize).copied().collect(),
        _ => data.to_vec(),
    }
}

impl Predictor for InferenceEngine {
    fn predict(&self, row: &FeatureRow) -> Result<Prediction, ServiceError> {
        let features = row.to_f32_vec()?;
        let prediction = self.run(&features).map_err(ServiceError::Inference)?;

        debug!(
            model = %self.name,
            labels = ?prediction.labels,
            probabilities = ?prediction.probabilities,
            "Inference complete"
        );

        Ok(prediction)
    }

    fn model_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_row_batch_tensor() {
        let data = [0.2, 0.8, 0.6, 0.4];
        assert_eq!(first_row(&[2, 2], &data), vec![0.2, 0.8]);
    }

    #[test]
    fn test_first_row_flat_tensor() {
        let data = [0.3, 0.7];
        assert_eq!(first_row(&[2], &data), vec![0.3, 0.7]);
        assert_eq!(first_row(&[1, 0], &data), vec![0.3, 0.7]);
    }

    /// Runs a real skl2onnx export end to end. Needs the artifact from
    /// `models/README.md`; paths can be overridden with
    /// `HEALTH_RISK_TEST_MODEL` and `HEALTH_RISK_TEST_METADATA`.
    #[test]
    #[ignore = "requires models/rf_model.onnx"]
    fn test_predict_with_exported_forest() {
        use crate::feature_extractor::FeatureExtractor;

        let model_path = std::env::var("HEALTH_RISK_TEST_MODEL")
            .unwrap_or_else(|_| "models/rf_model.onnx".to_string());
        let metadata_path = std::env::var("HEALTH_RISK_TEST_METADATA")
            .unwrap_or_else(|_| "models/rf_model.json".to_string());

        let loader = ModelLoader::new();
        let model = loader.load_model(&model_path).unwrap();
        let metadata = loader.load_metadata(&metadata_path).unwrap();
        let engine = InferenceEngine::from_parts(model, metadata);

        let body = serde_json::json!({
            "General_Health": "Good",
            "Checkup": "Within the past year",
            "Exercise": "Yes",
            "Skin_Cancer": "No",
            "Other_Cancer": "No",
            "Depression": "No",
            "Diabetes": "No",
            "Arthritis": "No",
            "Sex": "Female",
            "Age_Category": "60-64",
            "Height_(cm)": 160,
            "Weight_(kg)": 59.0,
            "BMI": 23.1,
            "Smoking_History": "No",
            "Alcohol_Consumption": 0,
            "Fruit_Consumption": 30,
            "Green_Vegetables_Consumption": 16,
            "FriedPotato_Consumption": 12
        });
        let row = FeatureExtractor::new()
            .extract_from_body(body.to_string().as_bytes())
            .unwrap();

        let prediction = engine.predict(&row).unwrap();
        assert_eq!(prediction.labels.len(), 1);

        let probabilities = prediction.probabilities.expect("forest exports probabilities");
        if let Some(classes) = &engine.metadata().classes {
            assert_eq!(probabilities.len(), classes.len());
        }
        let total: f32 = probabilities.iter().sum();
        assert!((total - 1.0).abs() < 1e-3, "probabilities sum to {}", total);
    }
}
