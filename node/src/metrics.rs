//! # Prometheus Metrics
//!
//! Operational metrics for the receipt node. Scraped by Prometheus at the
//! `/metrics` HTTP endpoint on the configured metrics port.
//!
//! All metrics are registered in a dedicated [`prometheus::Registry`] with
//! the `scoop` prefix so they do not collide with any default global
//! registry consumers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::core::Collector;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, Registry, TextEncoder};
use std::sync::Arc;

/// Holds all Prometheus metric handles for the node.
///
/// Clone-friendly (prometheus handles are reference counted) so it can be
/// shared across request handlers.
#[derive(Clone)]
pub struct NodeMetrics {
    /// Prometheus registry that owns all metrics below.
    registry: Registry,
    /// Receipts successfully written.
    pub receipts_created_total: IntCounter,
    /// Completed sales range sums.
    pub sales_queries_total: IntCounter,
    /// Receipt listing pages returned to callers.
    pub receipt_pages_served_total: IntCounter,
    /// Requests that failed inside the store (not caller mistakes).
    pub store_errors_total: IntCounter,
    /// Handler latency in seconds, across all ledger endpoints.
    pub request_latency_seconds: Histogram,
}

fn register<C>(registry: &Registry, collector: C) -> prometheus::Result<C>
where
    C: Collector + Clone + 'static,
{
    registry.register(Box::new(collector.clone()))?;
    Ok(collector)
}

impl NodeMetrics {
    /// Creates and registers all metrics. Call once at startup.
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new_custom(Some("scoop".into()), None)?;

        let receipts_created_total = register(
            &registry,
            IntCounter::new("receipts_created_total", "Total number of receipts written")?,
        )?;
        let sales_queries_total = register(
            &registry,
            IntCounter::new(
                "sales_queries_total",
                "Total number of completed sales range sums",
            )?,
        )?;
        let receipt_pages_served_total = register(
            &registry,
            IntCounter::new(
                "receipt_pages_served_total",
                "Total number of receipt listing pages served",
            )?,
        )?;
        let store_errors_total = register(
            &registry,
            IntCounter::new(
                "store_errors_total",
                "Total number of requests that failed inside the receipt store",
            )?,
        )?;
        let request_latency_seconds = register(
            &registry,
            Histogram::with_opts(
                HistogramOpts::new(
                    "request_latency_seconds",
                    "Ledger request handling latency in seconds",
                )
                .buckets(vec![
                    0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
                ]),
            )?,
        )?;

        Ok(Self {
            registry,
            receipts_created_total,
            sales_queries_total,
            receipt_pages_served_total,
            store_errors_total,
            request_latency_seconds,
        })
    }

    /// Encodes all registered metrics into the Prometheus text exposition format.
    pub fn encode(&self) -> prometheus::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Shared metrics state passed to axum handlers.
pub type SharedMetrics = Arc<NodeMetrics>;

/// Axum handler that renders `/metrics` in Prometheus text format.
///
/// Returns HTTP 500 if encoding fails.
pub async fn metrics_handler(State(metrics): State<SharedMetrics>) -> impl IntoResponse {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_carry_scoop_prefix() {
        let metrics = NodeMetrics::new().unwrap();
        metrics.receipts_created_total.inc();
        metrics.request_latency_seconds.observe(0.002);

        let text = metrics.encode().unwrap();
        assert!(text.contains("scoop_receipts_created_total 1"));
        assert!(text.contains("scoop_request_latency_seconds_count 1"));
        assert!(text.contains("scoop_store_errors_total 0"));
    }

    #[test]
    fn registries_are_independent() {
        let a = NodeMetrics::new().unwrap();
        let b = NodeMetrics::new().unwrap();
        a.sales_queries_total.inc_by(3);
        assert_eq!(a.sales_queries_total.get(), 3);
        assert_eq!(b.sales_queries_total.get(), 0);
    }
}
