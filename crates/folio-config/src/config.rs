//! Main configuration types.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::{ConfigError, LogFormat, ReportsConfig, ServerConfig, TelemetryConfigSection};
use folio_render::{MAX_FONT_SIZE, MIN_FONT_SIZE};

/// Complete Folio service configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use folio_config::FolioConfig;
///
/// let config = FolioConfig::default();
/// assert_eq!(config.reports.base_path, "/reports");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct FolioConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Report endpoint configuration.
    #[serde(default)]
    pub reports: ReportsConfig,

    /// Telemetry configuration (logging, metrics).
    #[serde(default)]
    pub telemetry: TelemetryConfigSection,
}

impl FolioConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> FolioConfigBuilder {
        FolioConfigBuilder::default()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.http_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::invalid_value(
                "server.http_addr",
                format!("invalid socket address: {}", self.server.http_addr),
            ));
        }

        if self.server.request_timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "server.request_timeout_ms",
                "must be greater than zero",
            ));
        }

        if self.server.max_body_bytes == 0 {
            return Err(ConfigError::invalid_value(
                "server.max_body_bytes",
                "must be greater than zero",
            ));
        }

        let base = &self.reports.base_path;
        if !base.starts_with('/') || (base.len() > 1 && base.ends_with('/')) || base.contains('{')
        {
            return Err(ConfigError::invalid_value(
                "reports.base_path",
                format!("must start with '/', have no trailing '/' and no parameters: {base}"),
            ));
        }

        if !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&self.reports.default_font_size) {
            return Err(ConfigError::invalid_value(
                "reports.default_font_size",
                format!("must be between {MIN_FONT_SIZE} and {MAX_FONT_SIZE}"),
            ));
        }

        if self.reports.default_title.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "reports.default_title",
                "must not be blank",
            ));
        }

        if self.telemetry.logging.enabled {
            folio_telemetry::logging::create_env_filter(&self.telemetry.logging.level)
                .map_err(|e| ConfigError::invalid_value("telemetry.logging.level", e.to_string()))?;
        }

        let metrics = &self.telemetry.metrics;
        if metrics.enabled {
            if let Some(addr) = &metrics.addr {
                if addr.parse::<SocketAddr>().is_err() {
                    return Err(ConfigError::invalid_value(
                        "telemetry.metrics.addr",
                        format!("invalid socket address: {addr}"),
                    ));
                }
            }
            if metrics.histogram_buckets.is_empty() {
                return Err(ConfigError::invalid_value(
                    "telemetry.metrics.histogram_buckets",
                    "must not be empty",
                ));
            }
        }

        Ok(())
    }

    /// Development preset: pretty debug logs and metrics served in-process.
    ///
    /// ```
    /// use folio_config::FolioConfig;
    ///
    /// let config = FolioConfig::development();
    /// assert_eq!(config.telemetry.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.server.http_addr = "127.0.0.1:8080".to_string();

        config.telemetry.environment = "development".to_string();
        config.telemetry.logging.level = "debug".to_string();
        config.telemetry.logging.format = LogFormat::Pretty;
        config.telemetry.logging.ansi_enabled = true;
        config.telemetry.logging.include_location = true;
        config.telemetry.metrics.enabled = true;

        config
    }

    /// Production preset: JSON info logs and metrics enabled.
    ///
    /// ```
    /// use folio_config::{FolioConfig, LogFormat};
    ///
    /// let config = FolioConfig::production();
    /// assert_eq!(config.telemetry.logging.format, LogFormat::Json);
    /// ```
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.telemetry.environment = "production".to_string();
        config.telemetry.logging.level = "info".to_string();
        config.telemetry.logging.format = LogFormat::Json;
        config.telemetry.logging.ansi_enabled = false;
        config.telemetry.metrics.enabled = true;

        config
    }
}

/// Builder for [`FolioConfig`].
#[derive(Debug, Default)]
pub struct FolioConfigBuilder {
    server: Option<ServerConfig>,
    reports: Option<ReportsConfig>,
    telemetry: Option<TelemetryConfigSection>,
}

impl FolioConfigBuilder {
    /// Set the server configuration.
    #[must_use]
    pub fn server(mut self, server: ServerConfig) -> Self {
        self.server = Some(server);
        self
    }

    /// Set the report endpoint configuration.
    #[must_use]
    pub fn reports(mut self, reports: ReportsConfig) -> Self {
        self.reports = Some(reports);
        self
    }

    /// Set the telemetry configuration.
    #[must_use]
    pub fn telemetry(mut self, telemetry: TelemetryConfigSection) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Build the configuration. Unset sections use their defaults.
    #[must_use]
    pub fn build(self) -> FolioConfig {
        FolioConfig {
            server: self.server.unwrap_or_default(),
            reports: self.reports.unwrap_or_default(),
            telemetry: self.telemetry.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<FolioConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MetricsConfig;

    #[test]
    fn test_default_config_is_valid() {
        let config = FolioConfig::default();
        assert_eq!(config.server.http_addr, "0.0.0.0:8080");
        assert_eq!(config.telemetry.service_name, "folio");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_sections() {
        let config = FolioConfig::builder()
            .server(ServerConfig {
                http_addr: "127.0.0.1:3000".to_string(),
                ..Default::default()
            })
            .reports(ReportsConfig {
                base_path: "/exports".to_string(),
                ..Default::default()
            })
            .build();

        assert_eq!(config.server.http_addr, "127.0.0.1:3000");
        assert_eq!(config.reports.base_path, "/exports");
        assert_eq!(config.telemetry, TelemetryConfigSection::default());
    }

    #[test]
    fn test_validate_invalid_server_addr() {
        let result = FolioConfig::builder()
            .server(ServerConfig {
                http_addr: "not-an-address".to_string(),
                ..Default::default()
            })
            .build_validated();

        assert!(result.unwrap_err().to_string().contains("http_addr"));
    }

    #[test]
    fn test_validate_base_path() {
        for bad in ["reports", "/reports/", "/reports/{format}"] {
            let config = FolioConfig::builder()
                .reports(ReportsConfig {
                    base_path: bad.to_string(),
                    ..Default::default()
                })
                .build();
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("base_path"), "{bad}");
        }
    }

    #[test]
    fn test_validate_font_size_range() {
        let config = FolioConfig::builder()
            .reports(ReportsConfig {
                default_font_size: 40,
                ..Default::default()
            })
            .build();

        assert!(config.validate().unwrap_err().to_string().contains("font_size"));
    }

    #[test]
    fn test_validate_zero_body_limit() {
        let config = FolioConfig::builder()
            .server(ServerConfig {
                max_body_bytes: 0,
                ..Default::default()
            })
            .build();

        assert!(config.validate().unwrap_err().to_string().contains("max_body_bytes"));
    }

    #[test]
    fn test_validate_metrics_addr_only_when_enabled() {
        let mut config = FolioConfig::builder()
            .telemetry(TelemetryConfigSection {
                metrics: MetricsConfig {
                    enabled: false,
                    addr: Some("invalid".to_string()),
                    ..Default::default()
                },
                ..Default::default()
            })
            .build();
        assert!(config.validate().is_ok());

        config.telemetry.metrics.enabled = true;
        assert!(config.validate().unwrap_err().to_string().contains("metrics.addr"));
    }

    #[test]
    fn test_presets() {
        let dev = FolioConfig::development();
        assert_eq!(dev.telemetry.logging.format, LogFormat::Pretty);
        assert!(dev.telemetry.logging.ansi_enabled);
        assert!(dev.validate().is_ok());

        let prod = FolioConfig::production();
        assert_eq!(prod.telemetry.environment, "production");
        assert!(prod.telemetry.metrics.enabled);
        assert!(prod.validate().is_ok());
    }

    #[test]
    fn test_toml_round_trip_keeps_sections() {
        let toml_str = toml::to_string_pretty(&FolioConfig::default()).unwrap();
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[reports]"));

        let parsed: FolioConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, FolioConfig::default());
    }

    #[test]
    fn test_unknown_section_rejected() {
        let result: Result<FolioConfig, _> = toml::from_str("[authorization]\nenabled = true\n");
        assert!(result.is_err());
    }
}
