//! Health Risk Prediction Service Library
//!
//! Serves a pre-trained random-forest health-risk classifier over HTTP.
//! Requests are validated against a fixed feature schema, categorical labels
//! are mapped to their trained codes, and the assembled row is scored by an
//! ONNX export of the model.

pub mod config;
pub mod error;
pub mod feature_extractor;
pub mod http;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod schema;
pub mod types;

pub use config::AppConfig;
pub use error::ServiceError;
pub use feature_extractor::FeatureExtractor;
pub use models::inference::{InferenceEngine, Predictor};
pub use types::{FeatureRow, FeatureValue, Prediction};
