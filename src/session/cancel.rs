use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::foundation::error::{ReelError, ReelResult};

/// Shared flag used to abort an in-flight render session.
///
/// Clones observe the same flag. The renderer checks it once per frame and the mixer once per
/// chunk, so cancellation takes effect within one frame interval.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    parent: Option<Box<CancelToken>>,
}

impl CancelToken {
    /// Create a token in the "not cancelled" state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Token that is cancelled when either it or `self` is cancelled.
    ///
    /// Cancelling the child does not affect `self`.
    pub fn child(&self) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            parent: Some(Box::new(self.clone())),
        }
    }

    /// Return `true` once [`CancelToken::cancel`] has been called on any clone (or on the
    /// parent of a child token).
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
            || self.parent.as_ref().is_some_and(|p| p.is_cancelled())
    }

    /// Return [`ReelError::Cancelled`] if cancellation was requested.
    pub fn check(&self) -> ReelResult<()> {
        if self.is_cancelled() {
            Err(ReelError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/cancel.rs"]
mod tests;
