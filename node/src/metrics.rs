//! # Prometheus Metrics
//!
//! Operational metrics for the gateway, scraped at `/metrics` on the
//! configured metrics port.
//!
//! All metrics are registered in a dedicated [`prometheus::Registry`] so they
//! do not collide with any default global registry consumers.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

use trxgate_protocol::pipeline::Verdict;

/// Holds all Prometheus metric handles for the gateway.
///
/// The handles are cheap clones of shared counters, so this can be passed
/// to request handlers freely.
#[derive(Clone)]
pub struct GatewayMetrics {
    /// Prometheus registry that owns all metrics below.
    registry: Registry,
    /// Submissions received on the submit endpoint.
    pub submissions_total: IntCounter,
    /// Submissions refused by the structural validator.
    pub structural_rejections_total: IntCounter,
    /// Pipeline outcomes, labelled by verdict.
    pub outcomes_total: IntCounterVec,
    /// Wall time of one pipeline evaluation in seconds.
    pub evaluation_latency_seconds: Histogram,
}

impl GatewayMetrics {
    /// Creates and registers all metrics. Call once at startup.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("trxgate".into()), None)?;

        let submissions_total = IntCounter::new(
            "submissions_total",
            "Total number of transaction submissions received",
        )?;
        registry.register(Box::new(submissions_total.clone()))?;

        let structural_rejections_total = IntCounter::new(
            "structural_rejections_total",
            "Submissions rejected by structural validation",
        )?;
        registry.register(Box::new(structural_rejections_total.clone()))?;

        let outcomes_total = IntCounterVec::new(
            Opts::new("outcomes_total", "Pipeline outcomes by result"),
            &["result"],
        )?;
        registry.register(Box::new(outcomes_total.clone()))?;

        let evaluation_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "evaluation_latency_seconds",
                "Transaction pipeline evaluation latency in seconds",
            )
            .buckets(vec![
                0.0001, 0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
            ]),
        )?;
        registry.register(Box::new(evaluation_latency_seconds.clone()))?;

        Ok(Self {
            registry,
            submissions_total,
            structural_rejections_total,
            outcomes_total,
            evaluation_latency_seconds,
        })
    }

    /// Count one pipeline outcome.
    pub fn record_verdict(&self, verdict: Verdict) {
        self.outcomes_total
            .with_label_values(&[verdict.label()])
            .inc();
    }

    /// Encodes all registered metrics into the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Shared metrics state passed to axum handlers.
pub type SharedMetrics = Arc<GatewayMetrics>;

/// Axum handler that renders `/metrics` in Prometheus text format.
pub async fn metrics_handler(
    axum::extract::State(metrics): axum::extract::State<SharedMetrics>,
) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}
