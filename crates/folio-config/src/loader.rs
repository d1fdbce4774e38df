//! Layered configuration loading.
//!
//! Layers apply in order, later ones overriding earlier ones:
//! 1. Defaults or a preset
//! 2. Configuration files or strings (TOML or JSON)
//! 3. Environment variables (`PREFIX__SECTION__KEY`)

use std::env;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::{ConfigError, FolioConfig, LogFormat};

/// Configuration loader.
///
/// # Example
///
/// ```no_run
/// use folio_config::ConfigLoader;
///
/// # fn main() -> Result<(), folio_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_optional_file("folio.toml")?
///     .with_env_prefix("FOLIO")
///     .load()?;
///
/// println!("listening on {}", config.server.http_addr);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: FolioConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a loader starting from default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: FolioConfig::default(),
            env_prefix: None,
        }
    }

    /// Reset to default values.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = FolioConfig::default();
        self
    }

    /// Start from the development preset.
    ///
    /// ```
    /// use folio_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(config.telemetry.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = FolioConfig::development();
        self
    }

    /// Start from the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = FolioConfig::production();
        self
    }

    /// Overlay a configuration file. The format follows the extension,
    /// `.toml` or `.json`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, unreadable, malformed or
    /// contains unknown fields.
    pub fn with_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .ok_or_else(|| {
                ConfigError::validation_error(format!(
                    "unsupported configuration file format: {}",
                    path.display()
                ))
            })?;

        self.with_string(&content, &format)
    }

    /// Overlay a configuration file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Overlay configuration from a string in `format` ("toml" or "json").
    ///
    /// Only the keys present in `content` change; everything else keeps its
    /// current value.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails or unknown fields are present.
    ///
    /// ```
    /// use folio_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("[reports]\nbase_path = \"/exports\"", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.reports.base_path, "/exports");
    /// assert_eq!(config.server.http_addr, "0.0.0.0:8080");
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        // Parsing into the typed config first reports unknown fields with
        // their location.
        let overlay: Value = match format.to_lowercase().as_str() {
            "toml" => {
                toml::from_str::<FolioConfig>(content)?;
                toml::from_str(content)?
            }
            "json" => {
                serde_json::from_str::<FolioConfig>(content)?;
                serde_json::from_str(content)?
            }
            _ => {
                return Err(ConfigError::validation_error(format!(
                    "unsupported configuration format: {format}"
                )))
            }
        };

        let mut merged = serde_json::to_value(&self.config)?;
        merge_values(&mut merged, overlay);
        self.config = serde_json::from_value(merged)?;
        Ok(self)
    }

    /// Set the environment variable prefix for overrides.
    ///
    /// With prefix `FOLIO`, `FOLIO__SERVER__HTTP_ADDR=0.0.0.0:9000` sets
    /// `server.http_addr`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load variables from a `.env` file if one exists.
    #[must_use]
    pub fn with_dotenv(self) -> Self {
        // A missing .env file is not an error.
        let _ = dotenvy::dotenv();
        self
    }

    /// Apply environment overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override cannot be parsed or validation
    /// fails.
    pub fn load(mut self) -> Result<FolioConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Return the configuration without environment overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> FolioConfig {
        self.config
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let marker = format!("{prefix}__");
        let mut vars: Vec<(String, String)> =
            env::vars().filter(|(k, _)| k.starts_with(&marker)).collect();
        vars.sort();

        for (key, value) in vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let key_without_prefix = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;

        let parts: Vec<&str> = key_without_prefix.split("__").collect();
        let config = &mut self.config;

        match parts.as_slice() {
            ["SERVER", "HTTP_ADDR"] => config.server.http_addr = value.to_string(),
            ["SERVER", "SHUTDOWN_TIMEOUT_SECS"] => {
                config.server.shutdown_timeout_secs = parse_number(key, value)?;
            }
            ["SERVER", "REQUEST_TIMEOUT_MS"] => {
                config.server.request_timeout_ms = parse_number(key, value)?;
            }
            ["SERVER", "MAX_BODY_BYTES"] => {
                config.server.max_body_bytes = parse_number(key, value)?;
            }

            ["REPORTS", "BASE_PATH"] => config.reports.base_path = value.to_string(),
            ["REPORTS", "DEFAULT_TITLE"] => config.reports.default_title = value.to_string(),
            ["REPORTS", "DEFAULT_ORIENTATION"] => {
                config.reports.default_orientation = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected 'portrait' or 'landscape'"))?;
            }
            ["REPORTS", "DEFAULT_FONT_SIZE"] => {
                config.reports.default_font_size = parse_number(key, value)?;
            }

            ["TELEMETRY", "SERVICE_NAME"] => config.telemetry.service_name = value.to_string(),
            ["TELEMETRY", "ENVIRONMENT"] => config.telemetry.environment = value.to_string(),

            ["TELEMETRY", "LOGGING", "ENABLED"] => {
                config.telemetry.logging.enabled = parse_flag(key, value)?;
            }
            ["TELEMETRY", "LOGGING", "LEVEL"] => config.telemetry.logging.level = value.to_string(),
            ["TELEMETRY", "LOGGING", "FORMAT"] => {
                config.telemetry.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => return Err(ConfigError::env_parse_error(key, "expected 'json' or 'pretty'")),
                };
            }
            ["TELEMETRY", "LOGGING", "ANSI_ENABLED"] => {
                config.telemetry.logging.ansi_enabled = parse_flag(key, value)?;
            }
            ["TELEMETRY", "LOGGING", "INCLUDE_LOCATION"] => {
                config.telemetry.logging.include_location = parse_flag(key, value)?;
            }

            ["TELEMETRY", "METRICS", "ENABLED"] => {
                config.telemetry.metrics.enabled = parse_flag(key, value)?;
            }
            ["TELEMETRY", "METRICS", "ADDR"] => {
                config.telemetry.metrics.addr = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }

            // Unknown keys are left for other consumers of the prefix.
            _ => {}
        }

        Ok(())
    }
}

fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

fn parse_number<N: std::str::FromStr>(key: &str, value: &str) -> Result<N, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    parse_bool(value).ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_render::Orientation;
    use std::io::Write;

    #[test]
    fn test_loader_defaults() {
        let config = ConfigLoader::new().with_defaults().load().unwrap();
        assert_eq!(config, FolioConfig::default());
    }

    #[test]
    fn test_loader_presets() {
        let config = ConfigLoader::new().with_development().load().unwrap();
        assert_eq!(config.telemetry.logging.format, LogFormat::Pretty);

        let config = ConfigLoader::new().with_production().load().unwrap();
        assert_eq!(config.telemetry.environment, "production");
    }

    #[test]
    fn test_string_overlay_keeps_preset_values() {
        let config = ConfigLoader::new()
            .with_development()
            .with_string("[server]\nmax_body_bytes = 2048\n", "toml")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.server.max_body_bytes, 2048);
        assert_eq!(config.server.http_addr, "127.0.0.1:8080");
        assert_eq!(config.telemetry.logging.level, "debug");
    }

    #[test]
    fn test_string_json() {
        let json = r#"{"reports": {"default_orientation": "landscape", "default_font_size": 8}}"#;
        let config = ConfigLoader::new()
            .with_string(json, "json")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.reports.default_orientation, Orientation::Landscape);
        assert_eq!(config.reports.default_font_size, 8);
    }

    #[test]
    fn test_string_unknown_field_rejected() {
        let result = ConfigLoader::new().with_string("[reports]\ncolour = \"red\"\n", "toml");
        assert!(matches!(result, Err(ConfigError::TomlError(_))));
    }

    #[test]
    fn test_string_unsupported_format() {
        let result = ConfigLoader::new().with_string("a: b", "yaml");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_with_file_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\nhttp_addr = \"127.0.0.1:9000\"\n\n[telemetry.logging]\nlevel = \"warn\""
        )
        .unwrap();

        let config = ConfigLoader::new()
            .with_file(file.path())
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.server.http_addr, "127.0.0.1:9000");
        assert_eq!(config.telemetry.logging.level, "warn");
    }

    #[test]
    fn test_with_file_not_found() {
        let result = ConfigLoader::new().with_file("/nonexistent/folio.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_with_file_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        let result = ConfigLoader::new().with_file(file.path());
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_with_optional_file_missing() {
        let config = ConfigLoader::new()
            .with_optional_file("/nonexistent/folio.toml")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config, FolioConfig::default());
    }

    #[test]
    fn test_load_validates() {
        let result = ConfigLoader::new()
            .with_string("[reports]\nbase_path = \"exports\"\n", "toml")
            .unwrap()
            .load();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_apply_env_var_sections() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__SERVER__HTTP_ADDR", "192.168.1.1:9000", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__SERVER__MAX_BODY_BYTES", "512", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__REPORTS__DEFAULT_ORIENTATION", "Landscape", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__TELEMETRY__LOGGING__FORMAT", "pretty", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__TELEMETRY__METRICS__ENABLED", "yes", "TEST")
            .unwrap();

        let config = loader.load_unvalidated();
        assert_eq!(config.server.http_addr, "192.168.1.1:9000");
        assert_eq!(config.server.max_body_bytes, 512);
        assert_eq!(config.reports.default_orientation, Orientation::Landscape);
        assert_eq!(config.telemetry.logging.format, LogFormat::Pretty);
        assert!(config.telemetry.metrics.enabled);
    }

    #[test]
    fn test_apply_env_var_invalid_values() {
        let mut loader = ConfigLoader::new();
        assert!(loader
            .apply_env_var("TEST__SERVER__REQUEST_TIMEOUT_MS", "soon", "TEST")
            .is_err());
        assert!(loader
            .apply_env_var("TEST__REPORTS__DEFAULT_ORIENTATION", "sideways", "TEST")
            .is_err());
        assert!(loader
            .apply_env_var("TEST__TELEMETRY__LOGGING__ENABLED", "maybe", "TEST")
            .is_err());
    }

    #[test]
    fn test_apply_env_var_ignores_unknown_keys() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__SOMETHING__ELSE", "value", "TEST")
            .unwrap();
        assert_eq!(loader.load_unvalidated(), FolioConfig::default());
    }

    #[test]
    fn test_merge_values_is_deep() {
        let mut base = serde_json::json!({"a": {"x": 1, "y": 2}, "b": 3});
        merge_values(&mut base, serde_json::json!({"a": {"y": 5}}));
        assert_eq!(base, serde_json::json!({"a": {"x": 1, "y": 5}, "b": 3}));
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("on"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
