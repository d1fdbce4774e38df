//! # Folio Server
//!
//! HTTP server hosting the report export endpoints.
//!
//! - HTTP/1.1 via Hyper
//! - `POST /reports/{format}` and `POST /reports/{format}/alternative`
//! - `GET /health`, `GET /ready` and `GET /metrics`
//! - Request IDs, body limits and timeouts
//! - Graceful shutdown on SIGTERM or SIGINT
//!
//! ## Example
//!
//! ```rust,ignore
//! use folio_server::{Server, ServerConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = Server::builder(Arc::new(service))
//!         .config(ServerConfig::builder().http_addr("0.0.0.0:8080").build())
//!         .build()?;
//!
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/folio-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod health;
mod resource;
pub mod router;
mod server;
pub mod shutdown;

pub use config::{ServerConfig, ServerConfigBuilder};
pub use error::{ServerError, ServerResult};
pub use health::{HealthCheck, HealthStatus, ReadinessCheck, ReadinessStatus};
pub use resource::{ReportsResource, ALTERNATIVE_SUFFIX};
pub use server::{Server, ServerBuilder};
pub use shutdown::ShutdownSignal;
