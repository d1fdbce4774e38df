//! Server configuration types.
//!
//! # Example
//!
//! ```rust
//! use folio_server::ServerConfig;
//! use std::time::Duration;
//!
//! let config = ServerConfig::builder()
//!     .http_addr("127.0.0.1:3000")
//!     .request_timeout(Duration::from_secs(10))
//!     .build();
//!
//! assert_eq!(config.http_addr(), "127.0.0.1:3000");
//! assert_eq!(config.base_path(), "/reports");
//! ```

use std::net::SocketAddr;
use std::time::Duration;

/// Default HTTP bind address.
pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8080";

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default largest accepted request body.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Default path prefix of the export routes.
pub const DEFAULT_BASE_PATH: &str = "/reports";

/// Server configuration.
///
/// Use [`ServerConfig::builder()`] to construct instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    http_addr: String,
    shutdown_timeout: Duration,
    request_timeout: Duration,
    max_body_bytes: usize,
    base_path: String,
    service_name: String,
}

impl ServerConfig {
    /// Creates a new server configuration builder.
    #[must_use]
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Returns the HTTP bind address.
    #[must_use]
    pub fn http_addr(&self) -> &str {
        &self.http_addr
    }

    /// Parses and returns the HTTP address as a `SocketAddr`.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be parsed.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.http_addr.parse()
    }

    /// How long shutdown waits for open connections to finish.
    #[must_use]
    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }

    /// Deadline for reading the body and for producing the export.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Largest accepted request body, in bytes.
    #[must_use]
    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    /// Path prefix of the export routes.
    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Service name reported by the health endpoint.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug, Clone)]
pub struct ServerConfigBuilder {
    http_addr: String,
    shutdown_timeout: Duration,
    request_timeout: Duration,
    max_body_bytes: usize,
    base_path: String,
    service_name: String,
}

impl Default for ServerConfigBuilder {
    fn default() -> Self {
        Self {
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            shutdown_timeout: Duration::from_secs(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            base_path: DEFAULT_BASE_PATH.to_string(),
            service_name: "folio".to_string(),
        }
    }
}

impl ServerConfigBuilder {
    /// Sets the HTTP bind address.
    #[must_use]
    pub fn http_addr(mut self, addr: impl Into<String>) -> Self {
        self.http_addr = addr.into();
        self
    }

    /// Sets the graceful shutdown timeout.
    #[must_use]
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the body size limit.
    #[must_use]
    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    /// Sets the path prefix of the export routes.
    ///
    /// A trailing `/` is dropped.
    #[must_use]
    pub fn base_path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        let trimmed = path.trim_end_matches('/');
        self.base_path = if trimmed.is_empty() {
            String::new()
        } else {
            trimmed.to_string()
        };
        self
    }

    /// Sets the service name.
    #[must_use]
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> ServerConfig {
        ServerConfig {
            http_addr: self.http_addr,
            shutdown_timeout: self.shutdown_timeout,
            request_timeout: self.request_timeout,
            max_body_bytes: self.max_body_bytes,
            base_path: self.base_path,
            service_name: self.service_name,
        }
    }
}
