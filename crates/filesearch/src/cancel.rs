//! Cooperative stop signal for running engines.
//!
//! ## Sparse Checking
//!
//! Directory walks touch many entries; `ensure_running_sparse()` only reads
//! the token every `CANCEL_CHECK_INTERVAL` entries.

use tokio_util::sync::CancellationToken;

/// How often long-running loops should check whether the engine was stopped.
/// Using a power of 2 allows efficient modulo via bitwise AND.
pub const CANCEL_CHECK_INTERVAL: usize = 0x100; // 256

/// A stop token shared between an engine and its worker thread.
#[derive(Clone, Debug, Default)]
pub struct StopToken {
    inner: CancellationToken,
}

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the worker to stop. Idempotent.
    pub fn stop(&self) {
        self.inner.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.is_cancelled()
    }

    /// Returns `Some(())` while running, `None` once stopped.
    /// This enables use with the `?` operator for early returns.
    #[inline]
    pub fn ensure_running(&self) -> Option<()> {
        if self.inner.is_cancelled() {
            None
        } else {
            Some(())
        }
    }

    /// Sparse variant of [`StopToken::ensure_running`].
    #[inline]
    pub fn ensure_running_sparse(&self, counter: usize) -> Option<()> {
        if counter & (CANCEL_CHECK_INTERVAL - 1) == 0 {
            self.ensure_running()
        } else {
            Some(())
        }
    }
}
