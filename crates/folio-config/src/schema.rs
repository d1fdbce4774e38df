//! Configuration schema types.
//!
//! Every section rejects unknown fields and fills missing ones with
//! defaults.

use folio_render::{Orientation, RenderOptions, DEFAULT_FONT_SIZE, DEFAULT_TITLE};
use serde::{Deserialize, Serialize};

/// Server configuration section.
///
/// # Example
///
/// ```
/// use folio_config::ServerConfig;
///
/// let config = ServerConfig {
///     http_addr: "127.0.0.1:8080".to_string(),
///     ..Default::default()
/// };
/// assert_eq!(config.max_body_bytes, 1024 * 1024);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// HTTP server bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_http_addr")]
    pub http_addr: String,

    /// Graceful shutdown timeout in seconds.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Request timeout in milliseconds, covering body read and export.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    /// Largest accepted request body, in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            request_timeout_ms: default_request_timeout(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_http_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_request_timeout() -> u64 {
    30_000
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

/// Report endpoint configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ReportsConfig {
    /// Path prefix of the export routes.
    #[serde(default = "default_base_path")]
    pub base_path: String,

    /// Title for reports submitted without one.
    #[serde(default = "default_title")]
    pub default_title: String,

    /// PDF page orientation unless a report overrides it.
    #[serde(default)]
    pub default_orientation: Orientation,

    /// PDF body font size unless a report overrides it.
    #[serde(default = "default_font_size")]
    pub default_font_size: u16,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            default_title: default_title(),
            default_orientation: Orientation::default(),
            default_font_size: default_font_size(),
        }
    }
}

impl ReportsConfig {
    /// Renderer defaults described by this section.
    #[must_use]
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            default_title: self.default_title.clone(),
            orientation: self.default_orientation,
            font_size: self.default_font_size,
        }
    }
}

fn default_base_path() -> String {
    "/reports".to_string()
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn default_font_size() -> u16 {
    DEFAULT_FONT_SIZE
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level or filter directives.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include ANSI color codes in pretty output.
    #[serde(default)]
    pub ansi_enabled: bool,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            ansi_enabled: false,
            include_location: false,
        }
    }
}

impl From<&LoggingConfig> for folio_telemetry::LogConfig {
    fn from(config: &LoggingConfig) -> Self {
        let pretty = config.format == LogFormat::Pretty;
        Self {
            enabled: config.enabled,
            level: config.level.clone(),
            json_format: !pretty,
            span_events: pretty,
            file_line_info: config.include_location,
            include_target: true,
            ansi: config.ansi_enabled,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Install the Prometheus recorder.
    #[serde(default)]
    pub enabled: bool,

    /// Dedicated Prometheus listener. Without one, metrics are served by the
    /// HTTP server at `/metrics`.
    #[serde(default)]
    pub addr: Option<String>,

    /// Histogram bucket boundaries for export duration.
    #[serde(default = "folio_telemetry::metrics::default_duration_buckets")]
    pub histogram_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            addr: None,
            histogram_buckets: folio_telemetry::metrics::default_duration_buckets(),
        }
    }
}

impl From<&MetricsConfig> for folio_telemetry::MetricsConfig {
    fn from(config: &MetricsConfig) -> Self {
        Self {
            enabled: config.enabled,
            listen_addr: config.addr.clone(),
            duration_buckets: config.histogram_buckets.clone(),
        }
    }
}

/// Telemetry configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfigSection {
    /// Service name for telemetry identification.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Deployment environment (e.g., "development", "production").
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Metrics configuration.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Default for TelemetryConfigSection {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            environment: default_environment(),
            logging: LoggingConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl TelemetryConfigSection {
    /// Telemetry setup described by this section.
    #[must_use]
    pub fn telemetry_config(&self) -> folio_telemetry::TelemetryConfig {
        folio_telemetry::TelemetryConfig::builder()
            .service_name(self.service_name.clone())
            .logging((&self.logging).into())
            .metrics((&self.metrics).into())
            .build()
    }
}

fn default_service_name() -> String {
    "folio".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_true() -> bool {
    true
}
