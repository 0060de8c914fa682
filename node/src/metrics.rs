//! # Prometheus Metrics
//!
//! Ledger and gateway counters, registered in a dedicated
//! [`prometheus::Registry`] with the `medledger` prefix and exposed at
//! `/metrics` on the optional metrics listener.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Registry, TextEncoder};

/// All metric handles for the node. Handles are cheap to clone.
#[derive(Clone)]
pub struct NodeMetrics {
    registry: Registry,
    /// Blocks accepted into the ledger.
    pub blocks_appended_total: IntCounter,
    /// Candidate blocks dropped by validation.
    pub blocks_rejected_total: IntCounter,
    /// POST bodies that could not be read or decoded.
    pub request_body_errors_total: IntCounter,
    /// Number of blocks in the ledger, genesis included.
    pub ledger_height: IntGauge,
    /// Time spent building, validating and appending a block.
    pub append_latency_seconds: Histogram,
}

impl NodeMetrics {
    /// Create and register all metrics. Call once at startup.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("medledger".into()), None)?;

        let blocks_appended_total = IntCounter::new(
            "blocks_appended_total",
            "Total number of blocks appended to the ledger",
        )?;
        registry.register(Box::new(blocks_appended_total.clone()))?;

        let blocks_rejected_total = IntCounter::new(
            "blocks_rejected_total",
            "Total number of candidate blocks rejected by validation",
        )?;
        registry.register(Box::new(blocks_rejected_total.clone()))?;

        let request_body_errors_total = IntCounter::new(
            "request_body_errors_total",
            "Total number of write requests with an unreadable body",
        )?;
        registry.register(Box::new(request_body_errors_total.clone()))?;

        let ledger_height = IntGauge::new(
            "ledger_height",
            "Number of blocks in the ledger, genesis included",
        )?;
        registry.register(Box::new(ledger_height.clone()))?;

        let append_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "append_latency_seconds",
                "Time to build, validate and append one block",
            )
            .buckets(vec![
                0.000_01, 0.000_05, 0.000_1, 0.000_5, 0.001, 0.005, 0.01, 0.05, 0.1,
            ]),
        )?;
        registry.register(Box::new(append_latency_seconds.clone()))?;

        Ok(Self {
            registry,
            blocks_appended_total,
            blocks_rejected_total,
            request_body_errors_total,
            ledger_height,
            append_latency_seconds,
        })
    }

    /// Encode all registered metrics in the Prometheus text format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Shared metrics handle stored in the axum state.
pub type SharedMetrics = Arc<NodeMetrics>;

/// `GET /metrics`: Prometheus text exposition.
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
