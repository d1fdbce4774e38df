//! Observability for the Folio report service.
//!
//! - **Logging**: structured output through `tracing-subscriber`, JSON in
//!   production and pretty in development
//! - **Metrics**: export and request metrics through the `metrics` facade,
//!   exposed in Prometheus format
//!
//! # Example
//!
//! ```rust,ignore
//! use folio_telemetry::{init_telemetry, LogConfig, TelemetryConfig};
//!
//! let config = TelemetryConfig::builder()
//!     .service_name("folio")
//!     .logging(LogConfig::development())
//!     .metrics_enabled(true)
//!     .build();
//!
//! init_telemetry(&config)?;
//! ```

#![doc(html_root_url = "https://docs.rs/folio-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use crate::error::TelemetryError;
pub use crate::logging::{init_logging, LogConfig};
pub use crate::metrics::{init_metrics, render_metrics, ExportOutcome, InFlightGuard, MetricsConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Configuration for all telemetry subsystems.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryConfig {
    /// Service name, attached to the startup log line.
    pub service_name: String,

    /// Logging configuration.
    pub logging: LogConfig,

    /// Metrics configuration.
    pub metrics: MetricsConfig,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "folio".to_string(),
            logging: LogConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl TelemetryConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> TelemetryConfigBuilder {
        TelemetryConfigBuilder::default()
    }
}

/// Builder for [`TelemetryConfig`].
#[derive(Debug, Default)]
pub struct TelemetryConfigBuilder {
    service_name: Option<String>,
    logging: Option<LogConfig>,
    metrics: Option<MetricsConfig>,
}

impl TelemetryConfigBuilder {
    /// Sets the service name.
    #[must_use]
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    /// Sets the logging configuration.
    #[must_use]
    pub fn logging(mut self, config: LogConfig) -> Self {
        self.logging = Some(config);
        self
    }

    /// Sets the metrics configuration.
    #[must_use]
    pub fn metrics(mut self, config: MetricsConfig) -> Self {
        self.metrics = Some(config);
        self
    }

    /// Enables or disables the metrics recorder.
    #[must_use]
    pub fn metrics_enabled(mut self, enabled: bool) -> Self {
        let config = self.metrics.take().unwrap_or_default();
        self.metrics = Some(MetricsConfig { enabled, ..config });
        self
    }

    /// Serves metrics on a dedicated listener.
    #[must_use]
    pub fn metrics_addr(mut self, addr: impl Into<String>) -> Self {
        let config = self.metrics.take().unwrap_or_default();
        self.metrics = Some(MetricsConfig {
            enabled: true,
            listen_addr: Some(addr.into()),
            ..config
        });
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> TelemetryConfig {
        let defaults = TelemetryConfig::default();
        TelemetryConfig {
            service_name: self.service_name.unwrap_or(defaults.service_name),
            logging: self.logging.unwrap_or(defaults.logging),
            metrics: self.metrics.unwrap_or(defaults.metrics),
        }
    }
}

/// Initializes logging, then metrics.
///
/// # Errors
///
/// Returns `TelemetryError` if either subsystem fails to initialize.
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryResult<()> {
    init_logging(&config.logging)?;
    init_metrics(&config.metrics)?;

    tracing::info!(
        service = %config.service_name,
        metrics = config.metrics.enabled,
        "telemetry initialized"
    );
    Ok(())
}
