//! Process keep-alive accounting.
//!
//! Outstanding work takes a hold; the process may exit once no holds remain
//! and nothing has touched the service for the inactivity timeout.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Activity {
    holds: usize,
    touches: u64,
}

#[derive(Debug, Clone)]
pub struct KeepAlive {
    state: Arc<watch::Sender<Activity>>,
}

impl Default for KeepAlive {
    fn default() -> Self {
        Self::new()
    }
}

impl KeepAlive {
    pub fn new() -> Self {
        let (state, _) = watch::channel(Activity::default());
        Self {
            state: Arc::new(state),
        }
    }

    /// Takes a hold that is released when the guard is dropped.
    pub fn hold(&self) -> KeepAliveGuard {
        self.state.send_modify(|activity| activity.holds += 1);
        KeepAliveGuard {
            state: Arc::clone(&self.state),
        }
    }

    /// Restarts the inactivity window.
    pub fn touch(&self) {
        self.state
            .send_modify(|activity| activity.touches = activity.touches.wrapping_add(1));
    }

    pub fn holds(&self) -> usize {
        self.state.borrow().holds
    }

    /// Resolves once there have been no holds and no touches for `timeout`.
    pub async fn idle(&self, timeout: Duration) {
        let mut activity = self.state.subscribe();
        loop {
            if activity.wait_for(|activity| activity.holds == 0).await.is_err() {
                return;
            }
            match tokio::time::timeout(timeout, activity.changed()).await {
                Err(_) => return,
                Ok(Err(_)) => return,
                Ok(Ok(())) => continue,
            }
        }
    }
}

pub struct KeepAliveGuard {
    state: Arc<watch::Sender<Activity>>,
}

impl std::fmt::Debug for KeepAliveGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeepAliveGuard").finish_non_exhaustive()
    }
}

impl Drop for KeepAliveGuard {
    fn drop(&mut self) {
        self.state.send_modify(|activity| {
            activity.holds = activity.holds.saturating_sub(1);
            activity.touches = activity.touches.wrapping_add(1);
        });
    }
}
