//! Caller-supplied cancellation and deadline for a single operation.
//!
//! A `Context` is cheap to clone and carries no state of its own beyond a
//! cancellation signal and an optional deadline. `Context::run` races an
//! in-flight future against both; the losing future is dropped, which
//! aborts whatever request it was driving.

use std::future::{pending, Future};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{sleep_until, Instant};

use crate::error::TransportError;

#[derive(Debug, Clone, Default)]
pub struct Context {
    cancel: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

/// Cancels every `Context` derived from the one it was created with.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    sender: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_cancel() -> (Self, CancelHandle) {
        let (sender, receiver) = watch::channel(false);
        let ctx = Self {
            cancel: Some(receiver),
            deadline: None,
        };
        (
            ctx,
            CancelHandle {
                sender: Arc::new(sender),
            },
        )
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            cancel: None,
            deadline: Some(deadline),
        }
    }

    /// Derive a context that keeps this one's cancellation signal and expires
    /// after `timeout` or at the parent's deadline, whichever comes first.
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        Self {
            cancel: self.cancel.clone(),
            deadline: Some(self.deadline.map_or(deadline, |parent| parent.min(deadline))),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Why this context is done, or `None` while it is still live.
    pub fn err(&self) -> Option<TransportError> {
        if self.cancel.as_ref().is_some_and(|rx| *rx.borrow()) {
            return Some(TransportError::Cancelled);
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Some(TransportError::DeadlineExceeded);
        }
        None
    }

    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Resolve once the context is cancelled or its deadline passes.
    pub async fn done(&self) -> TransportError {
        let receiver = self.cancel.clone();
        let cancelled = async move {
            if let Some(mut receiver) = receiver {
                // A dropped handle can never cancel, so fall through to pending.
                if receiver.wait_for(|cancelled| *cancelled).await.is_ok() {
                    return;
                }
            }
            pending::<()>().await
        };
        let deadline = self.deadline;
        let expired = async move {
            match deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancelled => TransportError::Cancelled,
            _ = expired => TransportError::DeadlineExceeded,
        }
    }

    /// Drive `operation` unless the context finishes first.
    pub async fn run<T, F>(&self, operation: F) -> Result<T, TransportError>
    where
        F: Future<Output = Result<T, TransportError>>,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }
        tokio::select! {
            biased;
            err = self.done() => {
                log::trace!("context finished before the request completed: {err}");
                Err(err)
            }
            result = operation => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn slow_ok() -> Result<u8, TransportError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(1)
    }

    #[tokio::test]
    async fn background_runs_to_completion() {
        let ctx = Context::background();
        assert!(!ctx.is_done());
        let value = ctx.run(async { Ok::<_, TransportError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn already_cancelled_context_never_polls_operation() {
        let (ctx, handle) = Context::with_cancel();
        handle.cancel();
        let mut polled = false;
        let result = ctx
            .run(async {
                polled = true;
                Ok::<_, TransportError>(())
            })
            .await;
        assert_eq!(result, Err(TransportError::Cancelled));
        assert!(!polled);
    }

    #[tokio::test]
    async fn cancel_aborts_in_flight_operation() {
        let (ctx, handle) = Context::with_cancel();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.cancel();
        });
        assert_eq!(ctx.run(slow_ok()).await, Err(TransportError::Cancelled));
        assert_eq!(ctx.err(), Some(TransportError::Cancelled));
    }

    #[tokio::test]
    async fn timeout_reports_deadline_exceeded() {
        let ctx = Context::with_timeout(Duration::from_millis(20));
        assert_eq!(ctx.run(slow_ok()).await, Err(TransportError::DeadlineExceeded));
        assert!(ctx.is_done());
    }

    #[tokio::test]
    async fn dropped_handle_does_not_cancel() {
        let (ctx, handle) = Context::with_cancel();
        drop(handle);
        let value = ctx.run(async { Ok::<_, TransportError>(3) }).await.unwrap();
        assert_eq!(value, 3);
    }

    #[tokio::test]
    async fn child_inherits_parent_cancellation() {
        let (parent, handle) = Context::with_cancel();
        let child = parent.child_with_timeout(Duration::from_secs(60));
        handle.cancel();
        assert_eq!(child.err(), Some(TransportError::Cancelled));
    }

    #[test]
    fn child_keeps_earlier_parent_deadline() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        rt.block_on(async {
            let parent = Context::with_timeout(Duration::from_millis(10));
            let child = parent.child_with_timeout(Duration::from_secs(60));
            assert_eq!(child.deadline(), parent.deadline());
        });
    }
}
