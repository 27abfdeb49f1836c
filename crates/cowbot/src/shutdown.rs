//! Shutdown coordination.
//!
//! A dedicated task waits for SIGINT or SIGTERM and fires the process-wide
//! [`ShutdownSignal`]. The main flow blocks on that signal instead of on any
//! channel-specific call, then tears everything down in order.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Single-fire, idempotent termination event.
///
/// Cloning yields another handle to the same event. Firing is lock-free and
/// safe from any task; observers may wait on it any number of times.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    token: CancellationToken,
    fired: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the signal. Returns `true` only for the call that actually fired
    /// it; every later call is a no-op.
    pub fn fire(&self) -> bool {
        if self.fired.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.token.cancel();
        true
    }

    pub fn is_fired(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolve once the signal has fired (immediately if it already has).
    pub async fn fired(&self) {
        self.token.cancelled().await
    }
}

/// The external request that triggered shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationRequest {
    /// SIGINT (Ctrl+C).
    Interrupt,
    /// SIGTERM.
    Terminate,
}

/// Owns the task that turns OS termination requests into a [`ShutdownSignal`].
pub struct ShutdownCoordinator {
    task: JoinHandle<Option<TerminationRequest>>,
}

impl ShutdownCoordinator {
    /// Register for SIGINT and SIGTERM, then start waiting in the background.
    ///
    /// Registration happens before this returns, so a signal delivered right
    /// afterwards is never lost to the default disposition.
    #[cfg(unix)]
    pub fn spawn(signal: ShutdownSignal) -> std::io::Result<Self> {
        use tokio::signal::unix::{signal as os_signal, SignalKind};

        let mut sigint = os_signal(SignalKind::interrupt())?;
        let mut sigterm = os_signal(SignalKind::terminate())?;
        debug!("SIGINT/SIGTERM handlers registered");

        Ok(Self::spawn_with(signal, async move {
            tokio::select! {
                _ = sigint.recv() => TerminationRequest::Interrupt,
                _ = sigterm.recv() => TerminationRequest::Terminate,
            }
        }))
    }

    #[cfg(not(unix))]
    pub fn spawn(signal: ShutdownSignal) -> std::io::Result<Self> {
        Ok(Self::spawn_with(signal, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
            TerminationRequest::Interrupt
        }))
    }

    /// Start the coordinator with an arbitrary source of termination requests.
    ///
    /// The task also ends, without firing, if the signal is fired elsewhere
    /// first (e.g. a startup failure after the coordinator was spawned).
    pub fn spawn_with<F>(signal: ShutdownSignal, request: F) -> Self
    where
        F: Future<Output = TerminationRequest> + Send + 'static,
    {
        let task = tokio::spawn(async move {
            tokio::select! {
                req = request => {
                    if signal.fire() {
                        info!(request = ?req, "termination requested, shutting down");
                    } else {
                        debug!(request = ?req, "termination requested while already shutting down");
                    }
                    Some(req)
                }
                _ = signal.fired() => None,
            }
        });
        Self { task }
    }

    /// Wait for the coordinator task to finish.
    ///
    /// Returns the request that caused shutdown, or `None` if the signal was
    /// fired by someone else.
    pub async fn join(self) -> Option<TerminationRequest> {
        match self.task.await {
            Ok(req) => req,
            Err(e) => {
                warn!(error = %e, "shutdown coordinator task failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn fire_is_single_shot() {
        let signal = ShutdownSignal::new();
        assert!(!signal.is_fired());
        assert!(signal.fire());
        assert!(!signal.fire());
        assert!(signal.is_fired());
    }

    #[test]
    fn clones_share_state() {
        let a = ShutdownSignal::new();
        let b = a.clone();
        assert!(b.fire());
        assert!(a.is_fired());
        assert!(!a.fire());
    }

    #[tokio::test]
    async fn concurrent_fires_succeed_exactly_once() {
        let signal = ShutdownSignal::new();
        let mut tasks = Vec::new();
        for _ in 0..32 {
            let s = signal.clone();
            tasks.push(tokio::spawn(async move { s.fire() }));
        }
        let mut winners = 0;
        for t in tasks {
            if t.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn observers_wake_after_fire() {
        let signal = ShutdownSignal::new();
        let waiter = {
            let s = signal.clone();
            tokio::spawn(async move { s.fired().await })
        };
        signal.fire();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        // already fired: resolves immediately
        tokio::time::timeout(Duration::from_millis(50), signal.fired())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn coordinator_fires_on_request() {
        let signal = ShutdownSignal::new();
        let (tx, rx) = tokio::sync::oneshot::channel::<TerminationRequest>();
        let coordinator = ShutdownCoordinator::spawn_with(signal.clone(), async move {
            rx.await.unwrap_or(TerminationRequest::Interrupt)
        });

        assert!(!signal.is_fired());
        tx.send(TerminationRequest::Terminate).unwrap();
        signal.fired().await;
        assert_eq!(coordinator.join().await, Some(TerminationRequest::Terminate));
    }

    #[tokio::test]
    async fn coordinator_ends_when_fired_elsewhere() {
        let signal = ShutdownSignal::new();
        let coordinator =
            ShutdownCoordinator::spawn_with(signal.clone(), std::future::pending());

        signal.fire();
        let joined = tokio::time::timeout(Duration::from_secs(1), coordinator.join())
            .await
            .unwrap();
        assert_eq!(joined, None);
    }
}
