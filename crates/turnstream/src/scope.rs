//! Scoped task spawning with cancellation and guaranteed cleanup.
//!
//! A [`Scope`] owns every background activity started within it: spawned
//! tasks race against the scope's cancellation token, the first fault or
//! panic cancels all siblings, and registered cleanups run in reverse
//! registration order when the scope ends, however it ends.
//!
//! # Example
//!
//! ```rust,no_run
//! use turnstream::scope::Scope;
//!
//! # async fn demo() -> Result<(), turnstream::scope::ScopeError> {
//! let mut scope = Scope::new();
//! scope.defer(|| println!("released"));
//! scope.spawn(async {
//!     // background work, cancelled when the scope ends
//!     Ok(())
//! });
//! scope.join().await
//! # }
//! ```

use thiserror::Error;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Boxed error returned by a spawned task.
pub type TaskError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why a scope completed unsuccessfully.
#[derive(Debug, Error)]
pub enum ScopeError {
    /// A child task returned an error. Siblings were cancelled before this
    /// was reported.
    #[error("task failed: {0}")]
    Failed(#[source] TaskError),

    /// A child task panicked.
    #[error("task panicked: {0}")]
    Panicked(String),
}

/// A lifetime boundary for background work.
///
/// Children cannot outlive the scope: [`Scope::join`] waits for every child,
/// and dropping a scope cancels and aborts whatever still runs. Cancellation
/// is cooperative through the scope's [`CancellationToken`] and is never
/// reported as an error.
pub struct Scope {
    cancel: CancellationToken,
    children: JoinSet<Result<(), TaskError>>,
    cleanups: Vec<Box<dyn FnOnce() + Send>>,
}

impl Scope {
    /// Creates a root scope.
    pub fn new() -> Self {
        Self::with_token(CancellationToken::new())
    }

    fn with_token(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            children: JoinSet::new(),
            cleanups: Vec::new(),
        }
    }

    /// Creates a nested scope whose token is cancelled when this scope's is.
    ///
    /// The child scope is joined (or dropped) by its creator, so its
    /// cleanups run before the parent's own exit completes.
    pub fn child(&self) -> Self {
        Self::with_token(self.cancel.child_token())
    }

    /// A handle to this scope's cancellation token.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancels every child of this scope (and of nested scopes).
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Spawns a child task.
    ///
    /// The task races against the scope's token; once the scope is
    /// cancelled the task resolves cleanly at its next suspension point.
    pub fn spawn<F>(&mut self, fut: F)
    where
        F: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        let token = self.cancel.clone();
        self.children.spawn(async move {
            tokio::select! {
                biased;
                () = token.cancelled() => Ok(()),
                out = fut => out,
            }
        });
    }

    /// Registers a cleanup to run when the scope ends.
    ///
    /// Cleanups run exactly once, in reverse registration order, whether the
    /// scope joins cleanly, faults, or is dropped.
    pub fn defer(&mut self, cleanup: impl FnOnce() + Send + 'static) {
        self.cleanups.push(Box::new(cleanup));
    }

    /// Waits for every child, then runs cleanups.
    ///
    /// The first child fault or panic cancels all siblings; `join` still
    /// waits for them to finish before running cleanups and reporting that
    /// first failure.
    pub async fn join(mut self) -> Result<(), ScopeError> {
        let mut first_failure = None;
        while let Some(joined) = self.children.join_next().await {
            let failure = match joined {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => ScopeError::Failed(err),
                Err(join_err) if join_err.is_panic() => ScopeError::Panicked(join_err.to_string()),
                // Aborted tasks only occur on drop, never during join.
                Err(_) => continue,
            };
            if first_failure.is_none() {
                self.cancel.cancel();
                first_failure = Some(failure);
            }
        }
        self.run_cleanups();
        match first_failure {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }

    fn run_cleanups(&mut self) {
        while let Some(cleanup) = self.cleanups.pop() {
            cleanup();
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.run_cleanups();
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("children", &self.children.len())
            .field("cleanups", &self.cleanups.len())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_join_waits_for_children() {
        let counter = Arc::new(AtomicU32::new(0));
        let mut scope = Scope::new();
        for _ in 0..3 {
            let counter = Arc::clone(&counter);
            scope.spawn(async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        }
        scope.join().await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_cleanups_run_in_reverse_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut scope = Scope::new();
        for i in 1..=3 {
            let order = Arc::clone(&order);
            scope.defer(move || order.lock().unwrap().push(i));
        }
        scope.join().await.unwrap();
        assert_eq!(*order.lock().unwrap(), vec![3, 2, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fault_cancels_siblings() {
        let started = tokio::time::Instant::now();
        let mut scope = Scope::new();
        scope.spawn(async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Err("task fault".into())
        });
        // Would run for an hour if the sibling's fault did not cancel it.
        scope.spawn(async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        });

        let err = scope.join().await.unwrap_err();
        assert!(matches!(err, ScopeError::Failed(_)));
        assert!(started.elapsed() < Duration::from_secs(3600));
    }

    #[tokio::test]
    async fn test_cleanups_run_on_fault() {
        let ran = Arc::new(AtomicU32::new(0));
        let flag = Arc::clone(&ran);
        let mut scope = Scope::new();
        scope.defer(move || {
            flag.fetch_add(1, Ordering::SeqCst);
        });
        scope.spawn(async { Err("task fault".into()) });

        assert!(scope.join().await.is_err());
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_panic_reported_and_siblings_cancelled() {
        let mut scope = Scope::new();
        scope.spawn(async {
            if true {
                panic!("child panic");
            }
            Ok(())
        });
        scope.spawn(async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        });

        let err = scope.join().await.unwrap_err();
        assert!(matches!(err, ScopeError::Panicked(_)));
    }

    #[tokio::test]
    async fn test_external_cancel_is_not_an_error() {
        let mut scope = Scope::new();
        scope.spawn(async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        });
        scope.cancel();
        scope.join().await.unwrap();
    }

    #[tokio::test]
    async fn test_drop_runs_cleanups_once() {
        let ran = Arc::new(AtomicU32::new(0));
        let flag = Arc::clone(&ran);
        {
            let mut scope = Scope::new();
            scope.defer(move || {
                flag.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_child_token_follows_parent() {
        let parent = Scope::new();
        let child = parent.child();
        let child_token = child.cancel_token();
        assert!(!child_token.is_cancelled());
        parent.cancel();
        assert!(child_token.is_cancelled());
    }

    #[tokio::test]
    async fn test_spawn_after_cancel_does_not_run() {
        let ran = Arc::new(AtomicU32::new(0));
        let flag = Arc::clone(&ran);
        let mut scope = Scope::new();
        scope.cancel();
        scope.spawn(async move {
            flag.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        scope.join().await.unwrap();
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }
}
