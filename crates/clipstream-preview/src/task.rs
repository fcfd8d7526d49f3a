//! Cancellable handle for spawned background work.

use std::future::Future;

use tokio::task::JoinHandle;

/// Owns a spawned task. Cancelling or dropping the handle aborts the task.
#[derive(Debug)]
pub struct ScheduledTask {
    handle: Option<JoinHandle<()>>,
}

impl ScheduledTask {
    /// Spawn `future` on the current runtime.
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            handle: Some(tokio::spawn(future)),
        }
    }

    /// Abort the task. Safe to call more than once.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn ticking(counter: Arc<AtomicUsize>) -> ScheduledTask {
        ScheduledTask::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_millis(10)).await;
                counter.fetch_add(1, Ordering::SeqCst);
            }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_task() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut task = ticking(counter.clone());

        tokio::time::sleep(Duration::from_millis(55)).await;
        assert!(task.is_active());
        task.cancel();
        task.cancel();
        assert!(!task.is_active());

        let seen = counter.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(counter.load(Ordering::SeqCst), seen);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_task() {
        let counter = Arc::new(AtomicUsize::new(0));
        let task = ticking(counter.clone());
        tokio::time::sleep(Duration::from_millis(35)).await;
        drop(task);

        let seen = counter.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(counter.load(Ordering::SeqCst), seen);
    }
}
