//! HTTP server.
//!
//! [`Server`] owns the router, the report resource and the health probes.
//! [`Server::serve`] runs the HTTP/1.1 accept loop until the shutdown signal
//! fires; [`Server::dispatch`] handles one buffered request and is what the
//! connection handler calls once the body is read.
//!
//! Every response carries an `x-request-id` header. A valid UUID supplied by
//! the caller is echoed back; otherwise a new one is generated.

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::health::{HealthCheck, ReadinessCheck};
use crate::resource::ReportsResource;
use crate::router::{Lookup, Router};
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

use bytes::Bytes;
use folio_core::{ErrorCategory, ReportsError, ReportsService, RequestId, REQUEST_ID_HEADER};
use folio_extract::response::{ErrorResponse, JsonResponse};
use folio_extract::ExtractionContext;
use folio_telemetry::metrics::record_request;
use folio_telemetry::{render_metrics, InFlightGuard};
use http::request::Parts;
use http::{header, HeaderValue, Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::{TcpListener, TcpStream};

const UNMATCHED_ROUTE: &str = "unmatched";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Health,
    Ready,
    Metrics,
    Export,
}

/// Why a request body could not be read.
#[derive(Debug)]
enum BodyError {
    TooLarge(usize),
    Timeout,
    Read(String),
}

impl BodyError {
    fn into_error_response(self) -> ErrorResponse {
        match self {
            Self::TooLarge(limit) => ErrorResponse::new(
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorCategory::Validation,
                "PAYLOAD_TOO_LARGE",
                format!("request body exceeds {limit} bytes"),
            ),
            Self::Timeout => ErrorResponse::new(
                StatusCode::REQUEST_TIMEOUT,
                ErrorCategory::Timeout,
                "REQUEST_TIMEOUT",
                "request body was not received in time",
            ),
            Self::Read(message) => ErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ErrorCategory::Validation,
                "BODY_READ_ERROR",
                message,
            ),
        }
    }
}

/// The report export HTTP server.
///
/// # Example
///
/// ```rust,ignore
/// use folio_server::{Server, ServerConfig};
///
/// let server = Server::builder(service)
///     .config(ServerConfig::builder().http_addr("127.0.0.1:8080").build())
///     .build()?;
///
/// server.run().await?;
/// ```
pub struct Server {
    config: ServerConfig,
    router: Router<Endpoint>,
    reports: ReportsResource,
    health: HealthCheck,
    readiness: ReadinessCheck,
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .field("routes", &self.router.route_count())
            .field("reports", &self.reports)
            .finish_non_exhaustive()
    }
}

impl Server {
    /// Creates a builder for a server exporting through `service`.
    #[must_use]
    pub fn builder(service: Arc<dyn ReportsService>) -> ServerBuilder {
        ServerBuilder {
            config: ServerConfig::default(),
            service,
            readiness: ReadinessCheck::new(),
        }
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the readiness probe.
    #[must_use]
    pub fn readiness(&self) -> &ReadinessCheck {
        &self.readiness
    }

    /// Binds the configured address and serves until SIGTERM or SIGINT.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or cannot be bound.
    pub async fn run(self) -> ServerResult<()> {
        self.run_with_shutdown(ShutdownSignal::with_os_signals())
            .await
    }

    /// Binds the configured address and serves until `shutdown` fires.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or cannot be bound.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> ServerResult<()> {
        let addr = self
            .config
            .socket_addr()
            .map_err(|source| ServerError::InvalidAddress {
                addr: self.config.http_addr().to_string(),
                source,
            })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        self.serve(listener, shutdown).await
    }

    /// Serves connections from `listener` until `shutdown` fires, then waits
    /// up to the shutdown timeout for open connections to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener address cannot be read.
    pub async fn serve(self, listener: TcpListener, shutdown: ShutdownSignal) -> ServerResult<()> {
        let local_addr = listener.local_addr().map_err(ServerError::Listener)?;
        tracing::info!(
            addr = %local_addr,
            routes = self.router.route_count(),
            "server listening"
        );

        let shutdown_timeout = self.config.shutdown_timeout();
        let readiness = self.readiness.clone();
        let server = Arc::new(self);
        let tracker = ConnectionTracker::new();
        let mut stop = shutdown.recv();

        loop {
            tokio::select! {
                () = &mut stop => {
                    tracing::info!("shutdown signal received, no longer accepting connections");
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let server = Arc::clone(&server);
                        let shutdown = shutdown.clone();
                        let token = tracker.acquire();
                        tokio::spawn(async move {
                            server.handle_connection(stream, peer, shutdown).await;
                            drop(token);
                        });
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to accept connection");
                    }
                }
            }
        }

        readiness.set_ready(false);
        drop(listener);

        if tokio::time::timeout(shutdown_timeout, tracker.wait_for_drain())
            .await
            .is_err()
        {
            tracing::warn!(
                open_connections = tracker.active_connections(),
                "shutdown timeout elapsed with open connections"
            );
        }

        tracing::info!("server stopped");
        Ok(())
    }

    async fn handle_connection(
        self: Arc<Self>,
        stream: TcpStream,
        peer: SocketAddr,
        shutdown: ShutdownSignal,
    ) {
        let io = TokioIo::new(stream);
        let server = Arc::clone(&self);
        let service = service_fn(move |request: Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { Ok::<_, Infallible>(server.handle(request).await.map(Full::new)) }
        });

        let conn = http1::Builder::new().serve_connection(io, service);
        tokio::pin!(conn);

        tokio::select! {
            result = conn.as_mut() => {
                if let Err(e) = result {
                    tracing::debug!(peer = %peer, error = %e, "connection error");
                }
            }
            () = shutdown.recv() => {
                conn.as_mut().graceful_shutdown();
                if let Err(e) = conn.await {
                    tracing::debug!(peer = %peer, error = %e, "connection error during shutdown");
                }
            }
        }
    }

    async fn handle(&self, request: Request<Incoming>) -> Response<Bytes> {
        let (parts, body) = request.into_parts();
        let limit = self.config.max_body_bytes();

        let collected =
            tokio::time::timeout(self.config.request_timeout(), Limited::new(body, limit).collect())
                .await;

        let body = match collected {
            Ok(Ok(collected)) => Ok(collected.to_bytes()),
            Ok(Err(e)) if e.downcast_ref::<LengthLimitError>().is_some() => {
                Err(BodyError::TooLarge(limit))
            }
            Ok(Err(e)) => Err(BodyError::Read(e.to_string())),
            Err(_) => Err(BodyError::Timeout),
        };

        self.process(parts, body).await
    }

    /// Handles one request whose body is already buffered.
    ///
    /// The body limit and the export timeout still apply.
    pub async fn dispatch(&self, request: Request<Bytes>) -> Response<Bytes> {
        let (parts, body) = request.into_parts();
        self.process(parts, Ok(body)).await
    }

    async fn process(&self, parts: Parts, body: Result<Bytes, BodyError>) -> Response<Bytes> {
        let request_id = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(RequestId::parse)
            .unwrap_or_default();

        let _in_flight = InFlightGuard::new();
        let started = Instant::now();
        folio_telemetry::log_request_start!(request_id, parts.method, parts.uri.path());

        let (route, mut response) = match body {
            Ok(body) => self.route(parts, body, request_id).await,
            Err(err) => {
                tracing::warn!(request_id = %request_id, error = ?err, "failed to read request body");
                let response = err
                    .into_error_response()
                    .with_request_id(request_id.to_string())
                    .into_response();
                (UNMATCHED_ROUTE.to_string(), response)
            }
        };

        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }

        let status = response.status().as_u16();
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        record_request(&route, status);
        folio_telemetry::log_request_complete!(request_id, route, status, duration_ms);

        response
    }

    async fn route(
        &self,
        parts: Parts,
        body: Bytes,
        request_id: RequestId,
    ) -> (String, Response<Bytes>) {
        match self.router.lookup(&parts.method, parts.uri.path()) {
            Lookup::Found(found) => {
                let route = format!("{} {}", parts.method, found.pattern);
                let response = match found.handler {
                    Endpoint::Health => JsonResponse::new(self.health.status()).into_response(),
                    Endpoint::Ready => {
                        let status = self.readiness.status();
                        let code = if status.ready {
                            StatusCode::OK
                        } else {
                            StatusCode::SERVICE_UNAVAILABLE
                        };
                        JsonResponse::new(status).with_status(code).into_response()
                    }
                    Endpoint::Metrics => metrics_response(request_id),
                    Endpoint::Export => {
                        let ctx = ExtractionContext::from_parts(parts, body, found.params);
                        self.export(&ctx, request_id).await
                    }
                };
                (route, response)
            }
            Lookup::MethodNotAllowed(allowed) => {
                let allow = allowed
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                let mut response = ErrorResponse::new(
                    StatusCode::METHOD_NOT_ALLOWED,
                    ErrorCategory::Validation,
                    "METHOD_NOT_ALLOWED",
                    format!("{} is not allowed on {}", parts.method, parts.uri.path()),
                )
                .with_request_id(request_id.to_string())
                .into_response();
                if let Ok(value) = HeaderValue::from_str(&allow) {
                    response.headers_mut().insert(header::ALLOW, value);
                }
                (UNMATCHED_ROUTE.to_string(), response)
            }
            Lookup::NotFound => {
                let err = ReportsError::not_found(format!("no route for {}", parts.uri.path()));
                let response = ErrorResponse::from_reports_error(&err)
                    .with_request_id(request_id.to_string())
                    .into_response();
                (UNMATCHED_ROUTE.to_string(), response)
            }
        }
    }

    async fn export(&self, ctx: &ExtractionContext, request_id: RequestId) -> Response<Bytes> {
        let timeout = self.config.request_timeout();
        match tokio::time::timeout(timeout, self.reports.export(ctx, request_id)).await {
            Ok(response) => response,
            Err(_) => {
                tracing::warn!(
                    request_id = %request_id,
                    timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                    "export timed out"
                );
                let err = ReportsError::timeout(format!(
                    "export did not finish within {}ms",
                    timeout.as_millis()
                ));
                ErrorResponse::from_reports_error(&err)
                    .with_request_id(request_id.to_string())
                    .into_response()
            }
        }
    }
}

fn metrics_response(request_id: RequestId) -> Response<Bytes> {
    match render_metrics() {
        Some(text) => {
            let mut response = Response::new(Bytes::from(text));
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; version=0.0.4"),
            );
            response
        }
        None => ErrorResponse::from_reports_error(&ReportsError::not_found(
            "metrics are not served by this process",
        ))
        .with_request_id(request_id.to_string())
        .into_response(),
    }
}

/// Builder for [`Server`].
pub struct ServerBuilder {
    config: ServerConfig,
    service: Arc<dyn ReportsService>,
    readiness: ReadinessCheck,
}

impl std::fmt::Debug for ServerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerBuilder")
            .field("config", &self.config)
            .field("readiness", &self.readiness)
            .finish_non_exhaustive()
    }
}

impl ServerBuilder {
    /// Sets the server configuration.
    #[must_use]
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds a named readiness check reported by `/ready`.
    #[must_use]
    pub fn readiness_check<F>(mut self, name: impl Into<String>, check: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.readiness = self.readiness.add_check(name, check);
        self
    }

    /// Builds the server and registers its routes.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::InvalidRoute` if the base path produces an
    /// invalid or conflicting route.
    pub fn build(self) -> ServerResult<Server> {
        let reports = ReportsResource::new(
            self.service,
            self.config.base_path(),
            self.config.max_body_bytes(),
        );

        let mut router = Router::new();
        router.add_route(Method::GET, "/health", Endpoint::Health)?;
        router.add_route(Method::GET, "/ready", Endpoint::Ready)?;
        router.add_route(Method::GET, "/metrics", Endpoint::Metrics)?;
        for (method, pattern) in reports.routes() {
            router.add_route(method, pattern, Endpoint::Export)?;
        }

        Ok(Server {
            health: HealthCheck::new(self.config.service_name(), env!("CARGO_PKG_VERSION")),
            config: self.config,
            router,
            reports,
            readiness: self.readiness,
        })
    }
}
