// SPDX-License-Identifier: MIT OR Apache-2.0
//! Cooperative cancellation.
//!
//! Workflows check the token between platform calls: once cancelled, no
//! new call is issued, in-flight calls are awaited normally (the server
//! stays consistent), and the partial state file is written for
//! `--continue`.

use tokio::sync::watch;

/// Grace period given to in-flight work after cancellation.
pub const CANCEL_GRACE: std::time::Duration = std::time::Duration::from_secs(5);

/// Cloneable cancellation token.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

/// The signalling half of a [`CancelToken`].
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Signal cancellation to every token clone.
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Create a token and its signalling handle.
#[must_use]
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

impl CancelToken {
    /// A token that can never fire (for non-interactive callers).
    #[must_use]
    pub fn never() -> Self {
        let (tx, rx) = watch::channel(false);
        // Keep the sender alive forever so the channel never closes.
        std::mem::forget(tx);
        Self { rx }
    }

    /// Whether cancellation has been signalled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Token wired to Ctrl-C.
    #[must_use]
    pub fn from_ctrl_c() -> Self {
        let (handle, token) = cancel_pair();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!(target: "vq.orchestrator", "cancellation requested (ctrl-c)");
                handle.cancel();
            }
        });
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn token_observes_cancellation() {
        let (handle, token) = cancel_pair();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        handle.cancel();
        assert!(clone.is_cancelled());
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn never_token_stays_quiet() {
        let token = CancelToken::never();
        assert!(!token.is_cancelled());
    }
}
