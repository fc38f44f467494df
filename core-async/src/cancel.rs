//! Cooperative cancellation.
//!
//! Long-running audio jobs poll a [`CancellationToken`] between block
//! reads/writes. Cancellation therefore takes effect within one block of work,
//! never mid-write.
//!
//! The token is cheap to clone; every clone observes the same cancellation
//! state. Child tokens are cancelled with their parent but can also be
//! cancelled independently.
//!
//! ```rust
//! use core_async::cancel::CancellationToken;
//!
//! let parent = CancellationToken::new();
//! let child = parent.child_token();
//!
//! parent.cancel();
//! assert!(child.is_cancelled());
//! ```

pub use tokio_util::sync::{CancellationToken, DropGuard, WaitForCancellationFuture};

/// Returns a token that is never cancelled unless the caller cancels it.
///
/// Convenience for synchronous callers of the engine that do not need
/// cancellation.
pub fn never() -> CancellationToken {
    CancellationToken::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_observes_cancel() {
        let token = never();
        let clone = token.clone();
        assert!(!clone.is_cancelled());

        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_child_cancel_does_not_affect_parent() {
        let parent = CancellationToken::new();
        let child = parent.child_token();

        child.cancel();
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_future_resolves() {
        let token = CancellationToken::new();
        let waiter = token.clone();

        let handle = tokio::spawn(async move {
            waiter.cancelled().await;
            "cancelled"
        });

        token.cancel();
        assert_eq!(handle.await.unwrap(), "cancelled");
    }
}
