//! Type definitions for the prediction service

pub mod prediction;
pub mod row;

pub use prediction::{ErrorResponse, HealthResponse, Label, Prediction, PredictionResponse};
pub use row::{FeatureRow, FeatureValue};
