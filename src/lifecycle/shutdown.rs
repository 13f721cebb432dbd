//! Shutdown coordination for the proxy.
//!
//! The stop request is latched: once triggered it stays triggered, so a
//! server that starts listening after the trigger still stops immediately.

use std::sync::Arc;

use tokio::sync::watch;

/// Handle that requests a graceful stop.
///
/// Cloned into the signal handler and into tests; every clone drives the
/// same latch.
#[derive(Clone)]
pub struct Shutdown {
    stopped: Arc<watch::Sender<bool>>,
}

/// One listener's view of a [`Shutdown`] handle.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    stopped: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (stopped, _) = watch::channel(false);
        Self {
            stopped: Arc::new(stopped),
        }
    }

    /// A listener for the server to wait on.
    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            stopped: self.stopped.subscribe(),
        }
    }

    /// Request a stop. Further calls have no effect.
    pub fn trigger(&self) {
        self.stopped.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.stopped.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal {
    /// Resolve once a stop has been requested.
    ///
    /// Also resolves if every [`Shutdown`] handle is dropped, since nothing
    /// could trigger it any more.
    pub async fn stopped(mut self) {
        let _ = self.stopped.wait_for(|stopped| *stopped).await;
    }
}
