//! Handle for the cancellable background refresh task.

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Handle to a spawned background task that honors cooperative shutdown.
///
/// `stop()` signals the task and waits for it to finish its current
/// iteration; dropping the handle sends a best-effort stop signal and
/// aborts the task if it has not finished.
pub struct TaskHandle {
    inner: Option<JoinHandle<()>>,
    stop_tx: Option<oneshot::Sender<()>>,
}

impl TaskHandle {
    /// Wrap a spawned task together with its stop channel.
    #[must_use]
    pub const fn new(inner: JoinHandle<()>, stop_tx: oneshot::Sender<()>) -> Self {
        Self {
            inner: Some(inner),
            stop_tx: Some(stop_tx),
        }
    }

    /// Request a graceful stop and wait for the task to complete.
    ///
    /// The task observes the signal at its next sleep boundary; an
    /// in-flight fetch runs to completion or timeout first.
    pub async fn stop(mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.inner.take() {
            let _ = handle.await;
        }
    }

    /// True once the underlying task has completed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.inner.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.inner.take()
            && !handle.is_finished()
        {
            handle.abort();
        }
    }
}
