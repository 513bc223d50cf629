//! Cancellation and Shutdown Coordination
//!
//! Provides the single-raise cancellation signal shared by every worker of a
//! pipeline run, and a process-level coordinator that raises a signal when the
//! operating system asks the process to stop.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

struct SignalState {
    tx: broadcast::Sender<()>,
    raised: AtomicBool,
}

/// Cooperative, single-raise cancellation signal
///
/// Clones share the same state: raising any clone wakes every task awaiting
/// [`CancellationSignal::cancelled`] on any other clone. Once raised the signal
/// stays raised for its whole lifetime.
#[derive(Clone)]
pub struct CancellationSignal {
    state: Arc<SignalState>,
}

impl Default for CancellationSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancellationSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationSignal")
            .field("raised", &self.is_raised())
            .finish()
    }
}

impl CancellationSignal {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(1);
        Self {
            state: Arc::new(SignalState {
                tx,
                raised: AtomicBool::new(false),
            }),
        }
    }

    /// Raise the signal. Returns false if it had already been raised.
    pub fn raise(&self) -> bool {
        // Release pairs with the Acquire in is_raised() so a waiter that
        // subscribed too late still observes the flag
        if self.state.raised.swap(true, Ordering::AcqRel) {
            return false;
        }
        let _ = self.state.tx.send(());
        true
    }

    pub fn is_raised(&self) -> bool {
        self.state.raised.load(Ordering::Acquire)
    }

    /// Wait until the signal is raised
    ///
    /// Completes immediately if the signal was raised before the call.
    pub async fn cancelled(&self) {
        // Subscribe before checking the flag, otherwise a raise between the
        // check and the subscription would be missed
        let mut rx = self.state.tx.subscribe();
        if self.is_raised() {
            return;
        }
        // Only raise() ever sends, and the sender lives as long as `self`, so
        // any outcome here (value or lag) means the signal was raised
        let _ = rx.recv().await;
    }

    /// Sleep for `delay` unless the signal is raised first
    ///
    /// Returns `true` when the full delay elapsed and `false` when the sleep
    /// was cut short by cancellation. A zero delay still yields to the
    /// scheduler so tight worker loops stay cooperative.
    pub async fn sleep(&self, delay: Duration) -> bool {
        if self.is_raised() {
            return false;
        }
        if delay.is_zero() {
            tokio::task::yield_now().await;
            return !self.is_raised();
        }
        tokio::select! {
            biased;
            _ = self.cancelled() => false,
            _ = tokio::time::sleep(delay) => true,
        }
    }
}

/// Coordinates graceful shutdown of the whole process
pub struct ShutdownCoordinator {
    signal: CancellationSignal,
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownCoordinator {
    /// Create a new shutdown coordinator
    pub fn new() -> Self {
        Self {
            signal: CancellationSignal::new(),
        }
    }

    /// Handle to the process-level signal
    pub fn signal(&self) -> CancellationSignal {
        self.signal.clone()
    }

    /// Trigger shutdown
    pub fn trigger_shutdown(&self) {
        self.signal.raise();
    }

    /// Check if shutdown has been requested
    pub fn is_shutdown_requested(&self) -> bool {
        self.signal.is_raised()
    }

    /// Guard execution of a future with shutdown coordination
    ///
    /// Installs OS signal handlers and hands the closure a signal that is
    /// raised on the first SIGINT/SIGTERM/SIGHUP/SIGQUIT (or Ctrl-C). A second
    /// signal forces an immediate exit.
    pub async fn guard<F, Fut, R, E>(future_fn: F) -> Result<R, E>
    where
        F: FnOnce(CancellationSignal) -> Fut,
        Fut: std::future::Future<Output = Result<R, E>>,
    {
        let coordinator = Self::new();
        setup_signal_handlers(coordinator.signal());
        future_fn(coordinator.signal()).await
    }
}

/// Set up signal handlers for graceful shutdown
fn setup_signal_handlers(signal: CancellationSignal) {
    let signal_count = Arc::new(AtomicUsize::new(0));

    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }

        use tokio::signal::unix::{signal as unix_signal, SignalKind};
        let kinds = [
            SignalKind::interrupt(),
            SignalKind::terminate(),
            SignalKind::hangup(),
            SignalKind::quit(),
        ];

        for kind in kinds {
            let signal = signal.clone();
            let sig_ctr = signal_count.clone();

            tokio::spawn(async move {
                if let Ok(mut sig) = unix_signal(kind) {
                    while sig.recv().await.is_some() {
                        on_os_signal(&signal, &sig_ctr);
                    }
                }
            });
        }
    }

    #[cfg(not(unix))]
    {
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                on_os_signal(&signal, &signal_count);
            }
        });
    }
}

fn on_os_signal(signal: &CancellationSignal, counter: &AtomicUsize) {
    let prev = counter.fetch_add(1, Ordering::AcqRel);
    if prev >= 1 {
        log::warn!("Second shutdown signal received; exiting");
        std::process::exit(130);
    }
    log::info!("Shutdown signal received; stopping");
    signal.raise();
}
