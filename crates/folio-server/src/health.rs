//! Liveness and readiness probes.
//!
//! `GET /health` reports that the process is up. `GET /ready` reports whether
//! it should receive traffic; the server flips it to not ready when shutdown
//! starts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Body of the `/health` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    /// Always `"healthy"` while the process serves requests.
    pub status: String,
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
    /// Seconds since the server was built.
    pub uptime_seconds: u64,
}

impl HealthStatus {
    fn healthy(service: &str, version: &str, uptime: Duration) -> Self {
        Self {
            status: "healthy".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            uptime_seconds: uptime.as_secs(),
        }
    }

    /// Returns `true` when the status is healthy.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Liveness probe.
///
/// ```rust
/// use folio_server::HealthCheck;
///
/// let health = HealthCheck::new("folio", "0.1.0");
/// let status = health.status();
/// assert!(status.is_healthy());
/// assert_eq!(status.service, "folio");
/// ```
#[derive(Debug, Clone)]
pub struct HealthCheck {
    service: String,
    version: String,
    start_time: Instant,
}

impl HealthCheck {
    /// Creates a probe; uptime counts from now.
    #[must_use]
    pub fn new(service: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            version: version.into(),
            start_time: Instant::now(),
        }
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> HealthStatus {
        HealthStatus::healthy(&self.service, &self.version, self.start_time.elapsed())
    }
}

/// Body of the `/ready` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReadinessStatus {
    /// Whether the service should receive traffic.
    pub ready: bool,
    /// Result of each named check.
    pub checks: BTreeMap<String, bool>,
}

type ReadinessCheckFn = Arc<dyn Fn() -> bool + Send + Sync>;

/// Readiness probe: ready while not shutting down and every check passes.
///
/// ```rust
/// use folio_server::ReadinessCheck;
///
/// let readiness = ReadinessCheck::new().add_check("repository", || true);
/// assert!(readiness.is_ready());
///
/// readiness.set_ready(false);
/// assert!(!readiness.is_ready());
/// ```
#[derive(Clone)]
pub struct ReadinessCheck {
    checks: Vec<(String, ReadinessCheckFn)>,
    ready_override: Arc<AtomicBool>,
}

impl std::fmt::Debug for ReadinessCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadinessCheck")
            .field("checks", &self.checks.iter().map(|(n, _)| n).collect::<Vec<_>>())
            .field("ready_override", &self.ready_override)
            .finish()
    }
}

impl ReadinessCheck {
    /// Creates a probe with no checks, initially ready.
    #[must_use]
    pub fn new() -> Self {
        Self {
            checks: Vec::new(),
            ready_override: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Adds a named check.
    #[must_use]
    pub fn add_check<F>(mut self, name: impl Into<String>, check: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.checks.push((name.into(), Arc::new(check)));
        self
    }

    /// Overrides readiness regardless of the checks. Shared by clones.
    pub fn set_ready(&self, ready: bool) {
        self.ready_override.store(ready, Ordering::SeqCst);
    }

    /// Returns `true` when ready.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready_override.load(Ordering::SeqCst) && self.checks.iter().all(|(_, check)| check())
    }

    /// Runs every check and reports the results.
    #[must_use]
    pub fn status(&self) -> ReadinessStatus {
        let checks: BTreeMap<String, bool> = self
            .checks
            .iter()
            .map(|(name, check)| (name.clone(), check()))
            .collect();
        let ready = self.ready_override.load(Ordering::SeqCst) && checks.values().all(|&v| v);

        ReadinessStatus { ready, checks }
    }
}

impl Default for ReadinessCheck {
    fn default() -> Self {
        Self::new()
    }
}
