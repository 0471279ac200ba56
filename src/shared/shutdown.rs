//! Graceful shutdown handling
//!
//! One signal is shared by the HTTP server and every background task
//! (labor monitor, notification sockets). It latches: a task that starts
//! waiting after the trigger returns immediately.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct ShutdownSignal {
    state: Arc<watch::Sender<bool>>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (state, _) = watch::channel(false);
        Self {
            state: Arc::new(state),
        }
    }

    pub fn is_triggered(&self) -> bool {
        *self.state.borrow()
    }

    pub fn trigger(&self) {
        let first = self.state.send_if_modified(|triggered| !std::mem::replace(triggered, true));
        if first {
            info!("🛑 Shutdown signal triggered");
        }
    }

    pub async fn wait(&self) {
        let mut rx = self.state.subscribe();
        // Err only when the sender is dropped, and `self` holds it
        let _ = rx.wait_for(|triggered| *triggered).await;
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve on SIGTERM or SIGINT (Ctrl+C elsewhere), then trigger `shutdown`.
pub async fn listen_for_shutdown_signals(shutdown: ShutdownSignal) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(term), Ok(int)) => (term, int),
                (Err(e), _) | (_, Err(e)) => {
                    error!("Failed to install signal handlers: {}", e);
                    return;
                }
            };

        let name = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        info!("📡 Received {}", name);
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            return;
        }
        info!("📡 Received Ctrl+C");
    }

    shutdown.trigger();
}

/// Owns the process-wide signal and the grace period given to cleanup
pub struct ShutdownCoordinator {
    signal: ShutdownSignal,
    timeout: Duration,
}

impl ShutdownCoordinator {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            signal: ShutdownSignal::new(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn signal(&self) -> ShutdownSignal {
        self.signal.clone()
    }

    pub fn start_signal_listener(&self) {
        tokio::spawn(listen_for_shutdown_signals(self.signal.clone()));
    }

    /// Wait for shutdown, then give `cleanup` the grace period to finish.
    /// Returns `false` when it timed out.
    pub async fn shutdown_with_cleanup<F, Fut>(&self, cleanup: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = ()>,
    {
        self.signal.wait().await;
        info!("⏳ Graceful shutdown (timeout: {}s)...", self.timeout.as_secs());

        if tokio::time::timeout(self.timeout, cleanup()).await.is_ok() {
            info!("✅ Graceful shutdown completed");
            true
        } else {
            warn!("⚠️ Graceful shutdown timed out after {}s", self.timeout.as_secs());
            false
        }
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new(30)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn waiter_wakes_on_trigger() {
        let signal = ShutdownSignal::new();
        let waiter = {
            let signal = signal.clone();
            tokio::spawn(async move { signal.wait().await })
        };
        signal.trigger();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter must wake")
            .unwrap();
        assert!(signal.is_triggered());
    }

    #[tokio::test]
    async fn late_waiter_sees_previous_trigger() {
        let signal = ShutdownSignal::new();
        signal.trigger();
        signal.trigger();
        tokio::time::timeout(Duration::from_secs(1), signal.wait())
            .await
            .expect("already triggered signal must resolve immediately");
    }

    #[tokio::test]
    async fn cleanup_timeout_is_reported() {
        let coordinator = ShutdownCoordinator::new(0);
        coordinator.signal().trigger();
        let finished = coordinator
            .shutdown_with_cleanup(|| tokio::time::sleep(Duration::from_secs(5)))
            .await;
        assert!(!finished);
    }
}
