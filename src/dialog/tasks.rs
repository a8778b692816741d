use std::future::Future;
use tokio::task::JoinHandle;
use tracing::debug;

/// Background work owned by a dialog. Everything spawned here is aborted
/// together when the group is disposed, and nothing new starts afterwards.
#[derive(Default)]
pub struct TaskGroup {
    handles: Vec<JoinHandle<()>>,
    disposed: bool,
}

impl TaskGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.disposed {
            debug!("Task group already disposed, dropping task");
            return;
        }
        self.handles.retain(|handle| !handle.is_finished());
        self.handles.push(tokio::spawn(task));
    }

    pub fn dispose(&mut self) {
        self.disposed = true;
        for handle in self.handles.drain(..) {
            handle.abort();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Tasks that have not finished yet
    pub fn active(&self) -> usize {
        self.handles.iter().filter(|handle| !handle.is_finished()).count()
    }
}

impl Drop for TaskGroup {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_dispose_aborts_pending_tasks() {
        let (tx, rx) = oneshot::channel::<()>();
        let ran = Arc::new(AtomicBool::new(false));

        let mut group = TaskGroup::new();
        let flag = Arc::clone(&ran);
        group.spawn(async move {
            let _ = rx.await;
            flag.store(true, Ordering::SeqCst);
        });
        assert_eq!(group.active(), 1);

        group.dispose();
        let _ = tx.send(());
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        assert!(!ran.load(Ordering::SeqCst));
        assert!(group.is_disposed());
    }

    #[tokio::test]
    async fn test_spawn_after_dispose_is_ignored() {
        let ran = Arc::new(AtomicBool::new(false));
        let mut group = TaskGroup::new();
        group.dispose();

        let flag = Arc::clone(&ran);
        group.spawn(async move { flag.store(true, Ordering::SeqCst) });
        tokio::task::yield_now().await;

        assert_eq!(group.active(), 0);
        assert!(!ran.load(Ordering::SeqCst));
    }
}
