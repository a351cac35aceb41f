// src/controller/debounce.rs

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Runs the most recently scheduled task after a quiet period.
/// Scheduling again before the period elapses cancels the earlier task.
#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: Mutex::new(None),
        }
    }

    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    pub fn schedule<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let quiet = self.quiet;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            task.await;
        });

        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = pending.replace(handle) {
            previous.abort();
        }
    }

    pub fn cancel(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = pending.take() {
            previous.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        let pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn burst_collapses_to_last_task() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let fired = Arc::new(AtomicUsize::new(0));
        let last = Arc::new(AtomicUsize::new(0));

        for n in 1..=3 {
            let fired = fired.clone();
            let last = last.clone();
            debouncer.schedule(async move {
                fired.fetch_add(1, Ordering::SeqCst);
                last.store(n, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(last.load(Ordering::SeqCst), 3);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_the_task() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        debouncer.schedule(async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        debouncer.cancel();

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
