//! HTTP surface: `POST /api/predict` and `GET /api/health`.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::error::ServiceError;
use crate::feature_extractor::FeatureExtractor;
use crate::metrics::ServiceMetrics;
use crate::models::Predictor;
use crate::schema::FEATURE_COUNT;
use crate::types::prediction::{HealthResponse, PredictionResponse};

/// Largest request body accepted by `POST /api/predict`.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct ApiState {
    pub predictor: Arc<dyn Predictor>,
    pub extractor: Arc<FeatureExtractor>,
    pub metrics: Arc<ServiceMetrics>,
}

impl ApiState {
    pub fn new(predictor: Arc<dyn Predictor>, metrics: Arc<ServiceMetrics>) -> Self {
        Self {
            predictor,
            extractor: Arc::new(FeatureExtractor::new()),
            metrics,
        }
    }
}

/// Build the application router.
pub fn router(state: ApiState, cors_allowed_origins: &str) -> Router {
    Router::new()
        .route("/api/predict", post(predict))
        .route("/api/health", get(health))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors_layer(cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the listener and serve until Ctrl+C.
pub async fn serve(addr: &str, app: Router) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %listener.local_addr()?, "Listening for prediction requests");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn predict(
    State(state): State<ApiState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<PredictionResponse>, ServiceError> {
    state.metrics.record_request();

    let result = body
        .map_err(body_rejection)
        .and_then(|body| run_prediction(&state, &body));

    match result {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            state.metrics.record_error(e.kind());
            if e.is_client_error() {
                warn!(kind = e.kind(), error = %e, details = ?e, "Rejected prediction request");
            } else {
                error!(kind = e.kind(), error = %e, details = ?e, "Prediction failed");
            }
            Err(e)
        }
    }
}

/// Body read failures still answer with a JSON error.
fn body_rejection(rejection: BytesRejection) -> ServiceError {
    debug!(status = %rejection.status(), reason = %rejection.body_text(), "Request body rejected");
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServiceError::PayloadTooLarge
    } else {
        ServiceError::InvalidPayload
    }
}

fn run_prediction(state: &ApiState, body: &[u8]) -> Result<PredictionResponse, ServiceError> {
    let row = state.extractor.extract_from_body(body)?;

    let start = Instant::now();
    let prediction = state.predictor.predict(&row)?;
    let elapsed = start.elapsed();

    state.metrics.record_prediction(elapsed, &prediction.labels);
    debug!(
        labels = ?prediction.labels,
        inference_us = elapsed.as_micros() as u64,
        "Prediction served"
    );

    Ok(prediction.into())
}

async fn health(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model: state.predictor.model_name().to_string(),
        features: FEATURE_COUNT,
    })
}

/// "*" (or empty) leaves CORS unrestricted: any origin, method and header.
fn cors_layer(allowed: &str) -> CorsLayer {
    let allowed = allowed.trim();
    if allowed.is_empty() || allowed == "*" {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins = allowed
        .split(',')
        .filter_map(|origin| origin.trim().parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}
