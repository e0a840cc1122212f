//! Cancellable deferred actions
//!
//! A [`ScheduledTask`] runs a future after a delay on the tokio runtime and
//! aborts it when cancelled or dropped, so replacing or discarding a handle
//! is enough to make sure a stale timer never fires.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Handle to an action scheduled with [`ScheduledTask::after`]
#[derive(Debug)]
pub struct ScheduledTask {
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Run `action` once `delay` has elapsed
    ///
    /// Must be called from within a tokio runtime.
    pub fn after<F>(delay: Duration, action: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action.await;
        });
        Self { handle }
    }

    /// Abort the action if it has not run yet
    pub fn cancel(self) {
        // Drop aborts
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn flag() -> (Arc<AtomicBool>, impl Future<Output = ()> + Send + 'static) {
        let fired = Arc::new(AtomicBool::new(false));
        let setter = fired.clone();
        (fired, async move { setter.store(true, Ordering::SeqCst) })
    }

    #[tokio::test(start_paused = true)]
    async fn runs_after_delay() {
        let (fired, action) = flag();
        let task = ScheduledTask::after(Duration::from_secs(10), action);

        tokio::time::sleep(Duration::from_millis(9_999)).await;
        assert!(!fired.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(fired.load(Ordering::SeqCst));
        assert!(task.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_task_never_runs() {
        let (fired, action) = flag();
        let task = ScheduledTask::after(Duration::from_secs(10), action);

        task.cancel();
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn replacing_a_task_drops_the_old_one() {
        let (first, action) = flag();
        let mut slot = Some(ScheduledTask::after(Duration::from_secs(10), action));

        tokio::time::sleep(Duration::from_secs(5)).await;
        let (second, action) = flag();
        let replaced = slot.replace(ScheduledTask::after(Duration::from_secs(10), action));
        drop(replaced);

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(!first.load(Ordering::SeqCst));
        assert!(!second.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(second.load(Ordering::SeqCst));
        drop(slot);
    }
}
