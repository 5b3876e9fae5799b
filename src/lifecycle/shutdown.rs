//! Shutdown coordination and process teardown.

use std::sync::Arc;

use tokio::sync::watch;

/// Coordinator for graceful shutdown.
///
/// The signal is latched: a task that subscribes after `trigger` still sees
/// it, so a stop requested mid-startup is never lost.
#[derive(Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Trigger the shutdown signal. Idempotent.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Number of tasks still holding a receiver.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving half handed to long-running tasks.
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Resolve once shutdown has been triggered, immediately if it already
    /// was. Also resolves if every `Shutdown` handle is gone.
    pub async fn recv(&mut self) {
        let _ = self.rx.wait_for(|stopped| *stopped).await;
    }

    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }
}

/// Emits the final diagnostic line when the process ends.
///
/// Created first thing in `main`. `finish` is the normal path; `Drop` covers
/// unwinding. Never blocks and never changes the exit status.
pub struct Teardown {
    finished: bool,
}

impl Teardown {
    pub fn new() -> Self {
        Self { finished: false }
    }

    pub fn finish(mut self, exit_code: i32) {
        self.finished = true;
        if exit_code == 0 {
            tracing::info!(exit_code, "Process exiting");
        } else {
            tracing::error!(exit_code, "Process exiting after fatal error");
        }
    }
}

impl Default for Teardown {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Teardown {
    fn drop(&mut self) {
        if !self.finished {
            tracing::error!("Process exiting without completing teardown");
        }
    }
}
