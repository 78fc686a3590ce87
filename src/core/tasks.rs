use std::sync::{
    atomic::{
        AtomicBool,
        Ordering,
    },
    Arc,
};

use tokio::task::JoinHandle;

/// Shared flag a background task checks before publishing its result.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Owner of a spawned task. Dropping the handle cancels and aborts the task.
pub struct TaskHandle {
    cancel_token: CancelToken,
    join_handle: Option<JoinHandle<()>>,
}

impl TaskHandle {
    pub fn new(cancel_token: CancelToken, join_handle: JoinHandle<()>) -> Self {
        Self { cancel_token, join_handle: Some(join_handle) }
    }

    pub fn cancel(&self) {
        self.cancel_token.cancel();
        if let Some(handle) = &self.join_handle {
            handle.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.join_handle.as_ref().map(|h| h.is_finished()).unwrap_or(true)
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn dropping_handle_cancels_task() {
        let token = CancelToken::new();
        let observed = token.clone();
        let join = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
        });

        let handle = TaskHandle::new(token, join);
        assert!(!observed.is_cancelled());
        drop(handle);
        assert!(observed.is_cancelled());
    }
}
