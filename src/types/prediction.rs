//! Prediction results and HTTP response bodies

use serde::{Deserialize, Serialize};
use std::fmt;

/// One predicted class label as emitted by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Int(v) => write!(f, "{}", v),
            Label::Float(v) => write!(f, "{}", v),
            Label::Text(v) => write!(f, "{}", v),
        }
    }
}

/// Output of one model call.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Predicted labels, one per input row.
    pub labels: Vec<Label>,
    /// Class probabilities for the first row, when the model exposes them.
    pub probabilities: Option<Vec<f32>>,
}

impl Prediction {
    pub fn from_labels(labels: Vec<Label>) -> Self {
        Self {
            labels,
            probabilities: None,
        }
    }

    pub fn with_probabilities(mut self, probabilities: Vec<f32>) -> Self {
        self.probabilities = Some(probabilities);
        self
    }
}

/// Body of a successful `POST /api/predict`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: Vec<Label>,
}

impl From<Prediction> for PredictionResponse {
    fn from(prediction: Prediction) -> Self {
        Self {
            prediction: prediction.labels,
        }
    }
}

/// Body of every failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub features: usize,
}
