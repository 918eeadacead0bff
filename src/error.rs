//! Error types surfaced by the prediction endpoint.
//!
//! Each variant maps to one HTTP status and a fixed client-facing message.
//! Underlying runtime errors are kept as the error source for logging and
//! are never serialized into the response body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::types::prediction::ErrorResponse;

/// Failures of a single prediction request.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Body absent, not JSON, not an object, or an empty object.
    #[error("Invalid JSON payload")]
    InvalidPayload,

    /// Body exceeds the configured size limit.
    #[error("Payload too large")]
    PayloadTooLarge,

    /// One or more schema fields absent from the payload.
    #[error("Missing required features in the input")]
    MissingFeatures(Vec<&'static str>),

    /// A row value could not be turned into a number for the model.
    #[error("feature '{feature}' has non-numeric value {value}")]
    Conversion { feature: &'static str, value: String },

    /// The model runtime failed or returned something unreadable.
    #[error("Model inference failed")]
    Inference(#[source] anyhow::Error),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InvalidPayload | ServiceError::MissingFeatures(_) => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ServiceError::Conversion { .. } | ServiceError::Inference(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::InvalidPayload => "invalid_payload",
            ServiceError::PayloadTooLarge => "payload_too_large",
            ServiceError::MissingFeatures(_) => "missing_features",
            ServiceError::Conversion { .. } => "conversion",
            ServiceError::Inference(_) => "inference",
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ServiceError::InvalidPayload.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ServiceError::MissingFeatures(vec!["BMI"]).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::Conversion {
                feature: "Sex",
                value: "\"M\"".to_string()
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ServiceError::Inference(anyhow::anyhow!("session exploded")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(ServiceError::InvalidPayload.to_string(), "Invalid JSON payload");
        assert_eq!(
            ServiceError::MissingFeatures(vec!["BMI", "Sex"]).to_string(),
            "Missing required features in the input"
        );
        assert_eq!(
            ServiceError::Conversion {
                feature: "General_Health",
                value: "\"good\"".to_string()
            }
            .to_string(),
            "feature 'General_Health' has non-numeric value \"good\""
        );
    }

    #[test]
    fn test_inference_hides_runtime_detail() {
        let err = ServiceError::Inference(anyhow::anyhow!("ORT: invalid tensor rank"));
        assert_eq!(err.to_string(), "Model inference failed");
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("ORT: invalid tensor rank"));
    }

    #[test]
    fn test_payload_too_large() {
        let err = ServiceError::PayloadTooLarge;
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "Payload too large");
    }

    #[test]
    fn test_kinds() {
        assert!(ServiceError::InvalidPayload.is_client_error());
        assert_eq!(ServiceError::MissingFeatures(vec![]).kind(), "missing_features");
        assert!(!ServiceError::Inference(anyhow::anyhow!("x")).is_client_error());
    }
}
