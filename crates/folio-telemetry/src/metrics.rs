//! Prometheus metrics for report exports.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `folio_exports_total` | Counter | `format`, `outcome` | Export attempts |
//! | `folio_export_duration_seconds` | Histogram | `format` | Export latency |
//! | `folio_export_size_bytes` | Histogram | `format` | Rendered document size |
//! | `folio_requests_total` | Counter | `route`, `status` | HTTP responses |
//! | `folio_in_flight_requests` | Gauge | - | Requests being processed |
//!
//! Recording without an installed recorder is a no-op.

use crate::error::TelemetryError;
use crate::TelemetryResult;
use folio_core::ExportType;
use ::metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::OnceLock;
use std::time::Duration;

/// Export attempt counter.
pub const EXPORTS_TOTAL: &str = "folio_exports_total";
/// Export latency histogram.
pub const EXPORT_DURATION_SECONDS: &str = "folio_export_duration_seconds";
/// Rendered document size histogram.
pub const EXPORT_SIZE_BYTES: &str = "folio_export_size_bytes";
/// HTTP response counter.
pub const REQUESTS_TOTAL: &str = "folio_requests_total";
/// In-flight request gauge.
pub const IN_FLIGHT_REQUESTS: &str = "folio_in_flight_requests";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsConfig {
    /// Whether a recorder is installed at all.
    pub enabled: bool,

    /// Dedicated Prometheus listener address. When `None` the rendered
    /// metrics are only available through [`render_metrics`].
    pub listen_addr: Option<String>,

    /// Histogram buckets for export duration, in seconds.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: None,
            duration_buckets: default_duration_buckets(),
        }
    }
}

/// Buckets from 5ms to 30s. Large PDF exports sit at the upper end.
#[must_use]
pub fn default_duration_buckets() -> Vec<f64> {
    vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
}

/// Outcome label for an export attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The document was rendered and written.
    Success,
    /// The export failed at any stage.
    Failure,
}

impl ExportOutcome {
    /// Label value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

/// Installs the Prometheus recorder.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidAddress` for an unparsable listener
/// address and `TelemetryError::MetricsInit` if the recorder cannot be
/// installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let builder = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(EXPORT_DURATION_SECONDS.to_string()),
            &config.duration_buckets,
        )
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    if let Some(addr) = &config.listen_addr {
        let addr: SocketAddr = addr
            .parse()
            .map_err(|e| TelemetryError::InvalidAddress(format!("{addr}: {e}")))?;
        builder
            .with_http_listener(addr)
            .install()
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    } else {
        let handle = builder
            .install_recorder()
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
        let _ = METRICS_HANDLE.set(handle);
    }

    register_metric_descriptions();
    Ok(())
}

/// Renders metrics in Prometheus text format.
///
/// Returns `None` unless a recorder without a dedicated listener was
/// installed.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

fn register_metric_descriptions() {
    describe_counter!(EXPORTS_TOTAL, "Report export attempts by format and outcome");
    describe_histogram!(EXPORT_DURATION_SECONDS, "Report export duration in seconds");
    describe_histogram!(EXPORT_SIZE_BYTES, "Rendered report size in bytes");
    describe_counter!(REQUESTS_TOTAL, "HTTP responses by route and status");
    describe_gauge!(IN_FLIGHT_REQUESTS, "HTTP requests currently being processed");
}

/// Records one export attempt.
///
/// The size histogram is only observed for successful exports.
pub fn record_export(
    export_type: ExportType,
    outcome: ExportOutcome,
    duration: Duration,
    size_bytes: usize,
) {
    let format = export_type.as_str();

    counter!(EXPORTS_TOTAL, "format" => format, "outcome" => outcome.as_str()).increment(1);
    histogram!(EXPORT_DURATION_SECONDS, "format" => format).record(duration.as_secs_f64());

    if outcome == ExportOutcome::Success {
        histogram!(EXPORT_SIZE_BYTES, "format" => format).record(size_bytes as f64);
    }
}

/// Records one HTTP response.
pub fn record_request(route: &str, status_code: u16) {
    counter!(
        REQUESTS_TOTAL,
        "route" => route.to_string(),
        "status" => status_code.to_string()
    )
    .increment(1);
}

/// Guard that keeps the in-flight gauge raised while alive.
#[derive(Debug)]
pub struct InFlightGuard {
    _private: (),
}

impl InFlightGuard {
    /// Increments the in-flight gauge.
    #[must_use]
    pub fn new() -> Self {
        gauge!(IN_FLIGHT_REQUESTS).increment(1.0);
        Self { _private: () }
    }
}

impl Default for InFlightGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!(IN_FLIGHT_REQUESTS).decrement(1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MetricsConfig::default();
        assert!(!config.enabled);
        assert!(config.listen_addr.is_none());
        assert_eq!(config.duration_buckets.len(), 12);
    }

    #[test]
    fn test_disabled_metrics_install_nothing() {
        assert!(init_metrics(&MetricsConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_listen_addr() {
        let config = MetricsConfig {
            enabled: true,
            listen_addr: Some("not-an-address".to_string()),
            ..MetricsConfig::default()
        };

        let err = init_metrics(&config).unwrap_err();
        assert!(matches!(err, TelemetryError::InvalidAddress(_)));
        assert!(err.to_string().contains("not-an-address"));
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(ExportOutcome::Success.as_str(), "success");
        assert_eq!(ExportOutcome::Failure.as_str(), "failure");
    }

    #[test]
    fn test_record_functions_dont_panic() {
        record_export(
            ExportType::Pdf,
            ExportOutcome::Success,
            Duration::from_millis(12),
            2048,
        );
        record_export(ExportType::Xls, ExportOutcome::Failure, Duration::ZERO, 0);
        record_request("POST /reports/{format}", 200);

        let guard = InFlightGuard::new();
        drop(guard);
    }
}
