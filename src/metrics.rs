//! Request and inference statistics for the prediction service.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::info;

use crate::types::prediction::Label;

/// Metrics collector for the prediction endpoint
pub struct ServiceMetrics {
    /// Total prediction requests received
    pub requests_total: AtomicU64,
    /// Requests that produced a prediction
    pub predictions_ok: AtomicU64,
    /// Failures keyed by error kind
    errors_by_kind: RwLock<HashMap<&'static str, u64>>,
    /// Model inference times (in microseconds)
    inference_times: RwLock<Vec<u64>>,
    /// How often each label was predicted
    label_counts: RwLock<HashMap<String, u64>>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl ServiceMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            requests_total: AtomicU64::new(0),
            predictions_ok: AtomicU64::new(0),
            errors_by_kind: RwLock::new(HashMap::new()),
            inference_times: RwLock::new(Vec::with_capacity(1000)),
            label_counts: RwLock::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Record an incoming request
    pub fn record_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful prediction
    pub fn record_prediction(&self, inference_time: Duration, labels: &[Label]) {
        self.predictions_ok.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut times) = self.inference_times.write() {
            times.push(inference_time.as_micros() as u64);
            // Keep only last 10000 for memory efficiency
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }

        if let Ok(mut counts) = self.label_counts.write() {
            for label in labels {
                *counts.entry(label.to_string()).or_insert(0) += 1;
            }
        }
    }

    /// Record a failed request
    pub fn record_error(&self, kind: &'static str) {
        if let Ok(mut errors) = self.errors_by_kind.write() {
            *errors.entry(kind).or_insert(0) += 1;
        }
    }

    /// Get inference time statistics
    pub fn get_inference_stats(&self) -> InferenceStats {
        let times = match self.inference_times.read() {
            Ok(times) => times,
            Err(_) => return InferenceStats::default(),
        };
        if times.is_empty() {
            return InferenceStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort_unstable();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();
        let percentile = |p: f64| sorted[((count as f64 * p) as usize).min(count - 1)];

        InferenceStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: percentile(0.50),
            p95_us: percentile(0.95),
            p99_us: percentile(0.99),
            max_us: sorted[count - 1],
        }
    }

    /// Get current throughput (requests per second)
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.requests_total.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Get failures by error kind
    pub fn get_errors_by_kind(&self) -> HashMap<&'static str, u64> {
        self.errors_by_kind
            .read()
            .map(|errors| errors.clone())
            .unwrap_or_default()
    }

    /// Get predicted label distribution
    pub fn get_label_counts(&self) -> HashMap<String, u64> {
        self.label_counts
            .read()
            .map(|counts| counts.clone())
            .unwrap_or_default()
    }

    /// Log summary statistics
    pub fn print_summary(&self) {
        let requests = self.requests_total.load(Ordering::Relaxed);
        let ok = self.predictions_ok.load(Ordering::Relaxed);
        let success_rate = if requests > 0 {
            (ok as f64 / requests as f64) * 100.0
        } else {
            0.0
        };

        let inference = self.get_inference_stats();

        info!(
            requests,
            predictions = ok,
            success_rate = format!("{:.1}%", success_rate),
            throughput = format!("{:.2} req/s", self.get_throughput()),
            "Prediction service summary"
        );
        info!(
            samples = inference.count,
            mean_us = inference.mean_us,
            p50_us = inference.p50_us,
            p95_us = inference.p95_us,
            p99_us = inference.p99_us,
            max_us = inference.max_us,
            "Inference latency"
        );
        for (kind, count) in self.get_errors_by_kind() {
            info!(kind, count, "Request failures");
        }
        for (label, count) in self.get_label_counts() {
            info!(label = %label, count, "Predicted label");
        }
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Inference time statistics
#[derive(Debug, Default, PartialEq)]
pub struct InferenceStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Metrics reporter that logs periodic summaries
pub struct MetricsReporter {
    metrics: Arc<ServiceMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: Arc<ServiceMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs.max(1)));
        // First tick fires immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = ServiceMetrics::new();

        metrics.record_request();
        metrics.record_request();
        metrics.record_request();
        metrics.record_prediction(Duration::from_micros(100), &[Label::Int(1)]);
        metrics.record_prediction(Duration::from_micros(300), &[Label::Int(0)]);
        metrics.record_error("missing_features");

        assert_eq!(metrics.requests_total.load(Ordering::Relaxed), 3);
        assert_eq!(metrics.predictions_ok.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.get_errors_by_kind().get("missing_features"), Some(&1));
        assert_eq!(metrics.get_label_counts().get("1"), Some(&1));
    }

    #[test]
    fn test_inference_stats() {
        let metrics = ServiceMetrics::new();
        for us in [100, 200, 300, 400] {
            metrics.record_prediction(Duration::from_micros(us), &[]);
        }

        let stats = metrics.get_inference_stats();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean_us, 250);
        assert_eq!(stats.p50_us, 300);
        assert_eq!(stats.max_us, 400);
    }

    #[test]
    fn test_empty_stats() {
        let metrics = ServiceMetrics::new();
        assert_eq!(metrics.get_inference_stats(), InferenceStats::default());
    }
}
