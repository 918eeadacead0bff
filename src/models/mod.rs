//! ML model loading and inference components

pub mod inference;
pub mod loader;
pub mod metadata;

pub use inference::{InferenceEngine, Predictor};
pub use loader::ModelLoader;
pub use metadata::ModelMetadata;
