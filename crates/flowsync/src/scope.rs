//! Cancellable task groups owned by a presenter.

use std::future::Future;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// A group of background tasks whose results flow back to the owner.
///
/// Dropping the scope, or calling [`TaskScope::cancel`], aborts every task still
/// running in it. Other scopes are unaffected.
pub struct TaskScope<T> {
    tasks: JoinSet<()>,
    sender: mpsc::UnboundedSender<T>,
    receiver: mpsc::UnboundedReceiver<T>,
}

impl<T: Send + 'static> TaskScope<T> {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            tasks: JoinSet::new(),
            sender,
            receiver,
        }
    }

    /// Runs `future` in the background and delivers its output to [`TaskScope::next`].
    pub fn spawn<F>(&mut self, future: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        let sender = self.sender.clone();
        self.tasks.spawn(async move {
            let _ = sender.send(future.await);
        });
    }

    /// Next delivered result. `None` once every task has finished and all results
    /// were taken.
    pub async fn next(&mut self) -> Option<T> {
        loop {
            if let Ok(value) = self.receiver.try_recv() {
                return Some(value);
            }
            if self.tasks.is_empty() {
                return None;
            }
            tokio::select! {
                value = self.receiver.recv() => return value,
                joined = self.tasks.join_next() => {
                    if let Some(Err(e)) = joined {
                        if e.is_panic() {
                            tracing::error!(error = %e, "Scoped task panicked");
                        }
                    }
                }
            }
        }
    }

    /// Aborts every running task. Results already delivered stay readable.
    pub fn cancel(&mut self) {
        self.tasks.abort_all();
    }

    /// Number of tasks not yet joined.
    pub fn active(&self) -> usize {
        self.tasks.len()
    }
}

impl<T: Send + 'static> Default for TaskScope<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    /// Sets the flag when the owning future is dropped.
    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    fn never_finishing(flag: Arc<AtomicBool>) -> impl Future<Output = u32> + Send + 'static {
        let guard = DropFlag(flag);
        async move {
            let _guard = guard;
            std::future::pending::<()>().await;
            0
        }
    }

    async fn wait_for(flag: &AtomicBool) -> bool {
        for _ in 0..100 {
            if flag.load(Ordering::SeqCst) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        false
    }

    #[tokio::test]
    async fn test_results_are_delivered() {
        let mut scope = TaskScope::new();
        scope.spawn(async { 1 });
        scope.spawn(async { 2 });

        let mut results = vec![scope.next().await.unwrap(), scope.next().await.unwrap()];
        results.sort();
        assert_eq!(results, vec![1, 2]);
        assert_eq!(scope.next().await, None);
    }

    #[tokio::test]
    async fn test_empty_scope_yields_none() {
        let mut scope: TaskScope<()> = TaskScope::new();
        assert_eq!(scope.next().await, None);
    }

    #[tokio::test]
    async fn test_drop_aborts_tasks_but_not_siblings() {
        let dropped = Arc::new(AtomicBool::new(false));
        let mut doomed = TaskScope::new();
        doomed.spawn(never_finishing(dropped.clone()));

        let mut sibling = TaskScope::new();
        sibling.spawn(async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            7
        });

        drop(doomed);

        assert!(wait_for(&dropped).await);
        assert_eq!(sibling.next().await, Some(7));
    }

    #[tokio::test]
    async fn test_cancel_aborts_running_tasks() {
        let dropped = Arc::new(AtomicBool::new(false));
        let mut scope = TaskScope::new();
        scope.spawn(never_finishing(dropped.clone()));
        assert_eq!(scope.active(), 1);

        scope.cancel();

        assert!(wait_for(&dropped).await);
        assert_eq!(scope.next().await, None);
    }
}
