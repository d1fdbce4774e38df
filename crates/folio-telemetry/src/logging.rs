//! Structured logging.
//!
//! One `tracing-subscriber` formatting layer is installed on the global
//! registry: JSON lines for log shippers or multi-line pretty output for a
//! terminal. Records are filtered by an [`EnvFilter`] parsed from
//! [`LogConfig::level`], so per-crate directives such as
//! `folio_server=debug,info` work.
//!
//! # Example
//!
//! ```rust,ignore
//! use folio_telemetry::logging::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//! tracing::info!(format = "pdf", rows = 2, "export completed");
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use tracing::Subscriber;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Install a subscriber at all.
    pub enabled: bool,

    /// Filter directives (e.g., "info", "folio_server=debug,info").
    pub level: String,

    /// JSON lines instead of pretty output.
    pub json_format: bool,

    /// Emit an event when a span opens and closes.
    pub span_events: bool,

    /// Source file and line of each event.
    pub file_line_info: bool,

    /// Module path of each event.
    pub include_target: bool,

    /// ANSI colors in pretty output. JSON output never has them.
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl LogConfig {
    /// Pretty, colored debug output with span events and source locations.
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            json_format: false,
            span_events: true,
            file_line_info: true,
            ansi: true,
            ..Self::production()
        }
    }

    /// JSON lines at info level.
    #[must_use]
    pub fn production() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: true,
            span_events: false,
            file_line_info: false,
            include_target: true,
            ansi: false,
        }
    }

    fn span_events(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }
}

/// Initializes the global logging subscriber.
///
/// Does nothing when logging is disabled.
///
/// # Errors
///
/// Returns `TelemetryError::LoggingInit` if the level is not a valid filter
/// or a global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = create_env_filter(&config.level)?;

    tracing_subscriber::registry()
        .with(format_layer(config).with_filter(filter))
        .try_init()
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}

fn format_layer<S>(config: &LogConfig) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    let layer = tracing_subscriber::fmt::layer()
        .with_span_events(config.span_events())
        .with_file(config.file_line_info)
        .with_line_number(config.file_line_info)
        .with_target(config.include_target);

    if config.json_format {
        layer.json().with_ansi(false).boxed()
    } else {
        layer.pretty().with_ansi(config.ansi).boxed()
    }
}

/// Parses filter directives into an [`EnvFilter`].
///
/// # Errors
///
/// Returns `TelemetryError::LoggingInit` naming the rejected directives.
pub fn create_env_filter(filter: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(filter)
        .map_err(|e| TelemetryError::LoggingInit(format!("invalid log level '{filter}': {e}")))
}

/// Logs a request start event.
#[macro_export]
macro_rules! log_request_start {
    ($request_id:expr, $method:expr, $path:expr) => {
        tracing::debug!(
            request_id = %$request_id,
            http.method = %$method,
            http.path = %$path,
            "request started"
        );
    };
}

/// Logs a request completion event.
#[macro_export]
macro_rules! log_request_complete {
    ($request_id:expr, $route:expr, $status:expr, $duration_ms:expr) => {
        tracing::info!(
            request_id = %$request_id,
            route = %$route,
            http.status_code = $status,
            duration_ms = $duration_ms,
            "request completed"
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_production() {
        let config = LogConfig::default();
        assert_eq!(config, LogConfig::production());
        assert!(config.json_format);
        assert!(!config.ansi);
        assert_eq!(config.span_events(), FmtSpan::NONE);
    }

    #[test]
    fn test_development_overrides() {
        let config = LogConfig::development();
        assert!(config.enabled);
        assert!(config.include_target);
        assert!(!config.json_format);
        assert_eq!(config.level, "debug");
        assert_eq!(config.span_events(), FmtSpan::NEW | FmtSpan::CLOSE);
    }

    #[test]
    fn test_env_filter_directives() {
        assert!(create_env_filter("warn").is_ok());
        assert!(create_env_filter("folio_server=debug,info").is_ok());

        let err = create_env_filter("folio_server=loud").unwrap_err();
        assert!(err.to_string().contains("folio_server=loud"));
    }

    #[test]
    fn test_disabled_logging_installs_nothing() {
        let config = LogConfig {
            enabled: false,
            level: "not a filter =".to_string(),
            ..LogConfig::default()
        };

        assert!(init_logging(&config).is_ok());
    }
}
