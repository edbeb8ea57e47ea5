//! Prometheus metrics collection for spind.
//!
//! Tracks command throughput and latency, routing rejections, and gateway
//! client counts. Exposed on a dedicated HTTP endpoint for scraping.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

/// Commands dispatched, by name.
pub static COMMAND_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();

/// Command latency from dispatch to completion, by name.
pub static COMMAND_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Operation failures, by command and error kind.
pub static COMMAND_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

/// Requests rejected during routing, by reason.
pub static DISPATCH_REJECTED: OnceLock<IntCounterVec> = OnceLock::new();

/// Currently connected gateway clients.
pub static GATEWAY_CLIENTS: OnceLock<IntGauge> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Must be called once at startup before any metrics are recorded.
pub fn init() {
    let r = registry();

    // Helper macro to register metric
    macro_rules! register {
        ($metric:ident, $init:expr) => {
            let m = $init.expect(concat!(stringify!($metric), " creation failed"));
            if let Err(e) = r.register(Box::new(m.clone())) {
                tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
            }
            let _ = $metric.set(m);
        };
    }

    register!(
        COMMAND_COUNTER,
        IntCounterVec::new(
            Opts::new("spind_command_total", "Commands dispatched by name"),
            &["command"]
        )
    );
    register!(
        COMMAND_LATENCY,
        HistogramVec::new(
            HistogramOpts::new("spind_command_duration_seconds", "Command latency by name")
                .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["command"]
        )
    );
    register!(
        COMMAND_ERRORS,
        IntCounterVec::new(
            Opts::new("spind_command_errors_total", "Operation failures by command and error"),
            &["command", "error"]
        )
    );
    register!(
        DISPATCH_REJECTED,
        IntCounterVec::new(
            Opts::new("spind_dispatch_rejected_total", "Routing rejections by reason"),
            &["reason"]
        )
    );
    register!(
        GATEWAY_CLIENTS,
        IntGauge::new("spind_gateway_clients", "Currently connected gateway clients")
    );
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Helper functions for metric updates
// ============================================================================

/// Record a dispatched command with its completion latency.
#[inline]
pub fn record_command(command: &str, duration_secs: f64) {
    if let Some(c) = COMMAND_COUNTER.get() {
        c.with_label_values(&[command]).inc();
    }
    if let Some(h) = COMMAND_LATENCY.get() {
        h.with_label_values(&[command]).observe(duration_secs);
    }
}

/// Record an operation failure.
#[inline]
pub fn record_command_error(command: &str, error: &str) {
    if let Some(c) = COMMAND_ERRORS.get() {
        c.with_label_values(&[command, error]).inc();
    }
}

/// Record a routing-stage rejection.
#[inline]
pub fn record_rejection(reason: &str) {
    if let Some(c) = DISPATCH_REJECTED.get() {
        c.with_label_values(&[reason]).inc();
    }
}

/// Track gateway client connects/disconnects.
#[inline]
pub fn gateway_client_connected() {
    if let Some(g) = GATEWAY_CLIENTS.get() {
        g.inc();
    }
}

#[inline]
pub fn gateway_client_disconnected() {
    if let Some(g) = GATEWAY_CLIENTS.get() {
        g.dec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_lifecycle() {
        init();

        record_command("status", 0.001);
        record_rejection("not_found");

        let output = gather_metrics();
        assert!(output.contains("spind_command_total"));
        assert!(output.contains("spind_dispatch_rejected_total"));
    }
}
