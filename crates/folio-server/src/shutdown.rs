//! Graceful shutdown.
//!
//! [`ShutdownSignal`] is shared by the accept loop and every connection task.
//! Once triggered, the accept loop stops and open connections finish their
//! current request before closing. [`ConnectionTracker`] lets the server wait
//! for them, bounded by the shutdown timeout.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::{watch, Notify};

/// A cloneable signal to trigger and await shutdown.
///
/// # Example
///
/// ```rust
/// use folio_server::ShutdownSignal;
///
/// let shutdown = ShutdownSignal::new();
/// let observer = shutdown.clone();
///
/// shutdown.trigger();
/// assert!(observer.is_shutdown());
/// ```
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    triggered: Arc<AtomicBool>,
    sender: Arc<watch::Sender<bool>>,
}

impl ShutdownSignal {
    /// Creates an untriggered signal.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            triggered: Arc::new(AtomicBool::new(false)),
            sender: Arc::new(sender),
        }
    }

    /// Triggers shutdown. Repeated calls have no further effect.
    pub fn trigger(&self) {
        if self
            .triggered
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            self.sender.send_replace(true);
        }
    }

    /// Returns `true` once shutdown has been triggered.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Returns a future that completes when shutdown is triggered, or
    /// immediately if it already was.
    pub fn recv(&self) -> ShutdownReceiver {
        let mut receiver = self.sender.subscribe();
        ShutdownReceiver {
            triggered: Arc::clone(&self.triggered),
            wait: Box::pin(async move {
                // The sender lives as long as any signal clone; if it is gone
                // nothing can trigger shutdown any more.
                if receiver.wait_for(|triggered| *triggered).await.is_err() {
                    std::future::pending::<()>().await;
                }
            }),
        }
    }

    /// Creates a signal triggered by SIGTERM or SIGINT (Ctrl+C elsewhere).
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn with_os_signals() -> Self {
        let signal = Self::new();
        let trigger = signal.clone();

        tokio::spawn(async move {
            wait_for_os_signal().await;
            trigger.trigger();
        });

        signal
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Future returned by [`ShutdownSignal::recv`].
pub struct ShutdownReceiver {
    triggered: Arc<AtomicBool>,
    wait: Pin<Box<dyn Future<Output = ()> + Send>>,
}

impl std::fmt::Debug for ShutdownReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownReceiver")
            .field("triggered", &self.triggered)
            .finish_non_exhaustive()
    }
}

impl Future for ShutdownReceiver {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.triggered.load(Ordering::SeqCst) {
            return Poll::Ready(());
        }

        self.wait.as_mut().poll(cx)
    }
}

async fn wait_for_os_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {
                        tracing::info!("received SIGTERM, starting graceful shutdown");
                    }
                    _ = sigint.recv() => {
                        tracing::info!("received SIGINT, starting graceful shutdown");
                    }
                }
            }
            (Err(e), _) | (_, Err(e)) => {
                tracing::error!(error = %e, "failed to register signal handlers");
                std::future::pending::<()>().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        tracing::info!("received Ctrl+C, starting graceful shutdown");
    }
}

/// Counts open connections so shutdown can wait for them.
///
/// # Example
///
/// ```rust
/// use folio_server::shutdown::ConnectionTracker;
///
/// let tracker = ConnectionTracker::new();
/// let token = tracker.acquire();
/// assert_eq!(tracker.active_connections(), 1);
///
/// drop(token);
/// assert_eq!(tracker.active_connections(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct ConnectionTracker {
    active: Arc<AtomicUsize>,
    notify: Arc<Notify>,
}

impl ConnectionTracker {
    /// Creates a tracker with no open connections.
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: Arc::new(AtomicUsize::new(0)),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Registers a connection until the returned token is dropped.
    #[must_use]
    pub fn acquire(&self) -> ConnectionToken {
        self.active.fetch_add(1, Ordering::SeqCst);
        ConnectionToken {
            active: Arc::clone(&self.active),
            notify: Arc::clone(&self.notify),
        }
    }

    /// Number of open connections.
    #[must_use]
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Completes once every token has been dropped.
    pub async fn wait_for_drain(&self) {
        loop {
            // Register interest before checking, or a drop in between is lost.
            let notified = self.notify.notified();
            if self.active.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }
}

impl Default for ConnectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Marks one open connection.
#[derive(Debug)]
pub struct ConnectionToken {
    active: Arc<AtomicUsize>,
    notify: Arc<Notify>,
}

impl Drop for ConnectionToken {
    fn drop(&mut self) {
        if self.active.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.notify.notify_waiters();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_trigger_is_idempotent() {
        let signal = ShutdownSignal::new();
        assert!(!signal.is_shutdown());

        signal.trigger();
        signal.trigger();
        assert!(signal.is_shutdown());
    }

    #[test]
    fn test_clones_share_state() {
        let signal = ShutdownSignal::default();
        let clone = signal.clone();
        clone.trigger();
        assert!(signal.is_shutdown());
    }

    #[tokio::test]
    async fn test_recv_completes_when_triggered() {
        let signal = ShutdownSignal::new();
        let trigger = signal.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.trigger();
        });

        tokio::time::timeout(Duration::from_secs(1), signal.recv())
            .await
            .expect("recv should complete");
    }

    #[tokio::test]
    async fn test_recv_after_trigger_is_immediate() {
        let signal = ShutdownSignal::new();
        signal.trigger();

        tokio::time::timeout(Duration::from_millis(10), signal.recv())
            .await
            .expect("recv should complete immediately");
    }

    #[tokio::test]
    async fn test_wait_for_drain_without_connections() {
        let tracker = ConnectionTracker::new();
        tokio::time::timeout(Duration::from_millis(10), tracker.wait_for_drain())
            .await
            .expect("no connections to wait for");
    }

    #[tokio::test]
    async fn test_wait_for_drain_after_tokens_drop() {
        let tracker = ConnectionTracker::new();
        let first = tracker.acquire();
        let second = tracker.acquire();
        assert_eq!(tracker.active_connections(), 2);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            drop(first);
            tokio::time::sleep(Duration::from_millis(10)).await;
            drop(second);
        });

        tokio::time::timeout(Duration::from_secs(1), tracker.wait_for_drain())
            .await
            .expect("drain should complete");
        assert_eq!(tracker.active_connections(), 0);
    }

    #[test]
    fn test_block_on_recv() {
        let signal = ShutdownSignal::new();
        signal.trigger();
        tokio_test::block_on(signal.recv());
    }
}
