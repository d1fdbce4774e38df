//! Typed configuration for the Folio report service.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! http_addr = "0.0.0.0:8080"
//! shutdown_timeout_secs = 30
//! request_timeout_ms = 30000
//! max_body_bytes = 1048576
//!
//! [reports]
//! base_path = "/reports"
//! default_title = "Report"
//! default_orientation = "portrait"
//! default_font_size = 10
//!
//! [telemetry]
//! service_name = "folio"
//! environment = "production"
//!
//! [telemetry.logging]
//! level = "info"
//! format = "json"
//!
//! [telemetry.metrics]
//! enabled = true
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden with `PREFIX__SECTION__KEY` variables, e.g.
//! `FOLIO__SERVER__HTTP_ADDR=0.0.0.0:9000` or
//! `FOLIO__TELEMETRY__LOGGING__LEVEL=debug`.

#![doc(html_root_url = "https://docs.rs/folio-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{FolioConfig, FolioConfigBuilder};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{
    LogFormat, LoggingConfig, MetricsConfig, ReportsConfig, ServerConfig, TelemetryConfigSection,
};
