//! Feature extraction for health-risk model inference.
//!
//! Turns an untyped JSON request body into a [`FeatureRow`] that matches
//! the column order used when the random forest was trained.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ServiceError;
use crate::schema::{self, FeatureSpec, FEATURE_COUNT, FEATURE_SCHEMA};
use crate::types::row::{FeatureRow, FeatureValue};

/// Feature extractor that transforms request payloads into model input rows.
///
/// Categorical labels are mapped to their trained codes by exact match.
/// Values that match no label are carried through untranslated; the model
/// decides whether it can use them (numeric codes) or not.
pub struct FeatureExtractor;

impl FeatureExtractor {
    /// Create a new feature extractor.
    pub fn new() -> Self {
        Self
    }

    /// Parse a raw request body into a JSON object.
    ///
    /// Empty bodies, invalid JSON, non-object JSON and `{}` are all rejected.
    pub fn parse_payload(&self, body: &[u8]) -> Result<Map<String, Value>, ServiceError> {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) if !map.is_empty() => Ok(map),
            Ok(_) => Err(ServiceError::InvalidPayload),
            Err(e) => {
                debug!(error = %e, "Request body is not valid JSON");
                Err(ServiceError::InvalidPayload)
            }
        }
    }

    /// Validate, normalize and assemble a payload into a row.
    ///
    /// Fields not in the schema are ignored.
    pub fn extract(&self, payload: &Map<String, Value>) -> Result<FeatureRow, ServiceError> {
        let missing: Vec<&'static str> = schema::feature_names()
            .filter(|name| !payload.contains_key(*name))
            .collect();
        if !missing.is_empty() {
            return Err(ServiceError::MissingFeatures(missing));
        }

        let values = FEATURE_SCHEMA
            .iter()
            .map(|spec| Self::normalize(spec, &payload[spec.name]))
            .collect();

        // Length always matches: one value per schema entry.
        FeatureRow::new(values).ok_or(ServiceError::InvalidPayload)
    }

    /// Parse and extract in one step.
    pub fn extract_from_body(&self, body: &[u8]) -> Result<FeatureRow, ServiceError> {
        let payload = self.parse_payload(body)?;
        self.extract(&payload)
    }

    fn normalize(spec: &FeatureSpec, raw: &Value) -> FeatureValue {
        if let Value::String(label) = raw {
            if let Some(code) = spec.encode(label) {
                return FeatureValue::Number(code as f64);
            }
            if spec.is_categorical() {
                debug!(feature = spec.name, label = %label, "Unrecognized label passed through");
            }
        }
        FeatureValue::from_json(raw)
    }

    /// Get the number of features produced.
    pub fn feature_count(&self) -> usize {
        FEATURE_COUNT
    }

    /// Get feature names in training order.
    pub fn feature_names(&self) -> Vec<&'static str> {
        schema::feature_names().collect()
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}
