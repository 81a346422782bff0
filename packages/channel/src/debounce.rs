//! Cancellable scheduled tasks.
//!
//! Replaces fire-and-forget timers with an owned handle: cancelling
//! prevents a *scheduled* dispatch from firing, but cannot recall a
//! request already sent to the worker.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

pub struct DebouncedTask {
    handle: JoinHandle<()>,
}

impl DebouncedTask {
    /// Run `task` after `delay`, unless cancelled first.
    pub fn schedule<F, Fut>(delay: Duration, task: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task().await;
        });
        Self { handle }
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
