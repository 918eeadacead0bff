//! Training metadata shipped alongside the ONNX model

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::schema::{self, FEATURE_COUNT};

/// Metadata exported by the training job next to the model file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Column names in training order
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    /// One importance weight per feature, in training order
    pub feature_importances: Vec<f64>,
    /// Class labels known to the classifier
    #[serde(default)]
    pub classes: Option<Vec<serde_json::Value>>,
}

impl ModelMetadata {
    /// Read and validate metadata from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open model metadata {}", path.display()))?;
        let metadata: Self = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse model metadata {}", path.display()))?;
        metadata.validate()?;
        Ok(metadata)
    }

    /// Check that the metadata lines up with the feature schema.
    pub fn validate(&self) -> Result<()> {
        if self.feature_importances.len() != FEATURE_COUNT {
            bail!(
                "Model reports {} feature importances, expected {}",
                self.feature_importances.len(),
                FEATURE_COUNT
            );
        }

        if let Some(names) = &self.feature_names {
            let expected: Vec<&str> = schema::feature_names().collect();
            if names.len() != expected.len() || names.iter().zip(&expected).any(|(a, b)| a != b) {
                bail!(
                    "Model was trained on columns {:?}, service expects {:?}",
                    names,
                    expected
                );
            }
        }

        Ok(())
    }

    /// Importances paired with feature names, in training order.
    pub fn importances(&self) -> Vec<(&'static str, f64)> {
        schema::feature_names()
            .zip(self.feature_importances.iter().copied())
            .collect()
    }

    /// Importances sorted from most to least important.
    pub fn ranked_importances(&self) -> Vec<(&'static str, f64)> {
        let mut ranked = self.importances();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}
