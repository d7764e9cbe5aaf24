//! Serial executor for completion callbacks.

use crate::error::{SyncError, SyncResult};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::debug;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs callbacks one at a time, in submission order, on a dedicated task.
///
/// Callers hand results back to application code through this queue so
/// that every callback observes the same execution context.
#[derive(Debug, Clone)]
pub struct CompletionQueue {
    sender: mpsc::UnboundedSender<Job>,
}

impl CompletionQueue {
    /// Starts the queue on the given runtime.
    pub fn start(handle: &Handle) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();
        handle.spawn(async move {
            while let Some(job) = receiver.recv().await {
                job();
            }
            debug!("completion queue stopped");
        });
        Self { sender }
    }

    /// Starts the queue on the current runtime.
    pub fn start_current() -> SyncResult<Self> {
        let handle = Handle::try_current().map_err(|e| SyncError::Background(e.to_string()))?;
        Ok(Self::start(&handle))
    }

    /// Submits a callback.
    pub fn post<F>(&self, job: F) -> SyncResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.sender
            .send(Box::new(job))
            .map_err(|_| SyncError::CompletionClosed)
    }

    /// Returns true while the executing task is alive.
    pub fn is_running(&self) -> bool {
        !self.sender.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn callbacks_run_in_submission_order() {
        let queue = CompletionQueue::start_current().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for i in 0..10 {
            let seen = Arc::clone(&seen);
            queue.post(move || seen.lock().push(i)).unwrap();
        }
        let (done_tx, done_rx) = oneshot::channel();
        queue
            .post(move || {
                let _ = done_tx.send(());
            })
            .unwrap();
        done_rx.await.unwrap();

        assert_eq!(*seen.lock(), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn start_outside_runtime_fails() {
        assert!(matches!(
            CompletionQueue::start_current(),
            Err(SyncError::Background(_))
        ));
    }

    #[test]
    fn post_after_runtime_shutdown_fails() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let queue = CompletionQueue::start(runtime.handle());
        drop(runtime);
        assert!(!queue.is_running());
        assert_eq!(queue.post(|| {}), Err(SyncError::CompletionClosed));
    }
}
