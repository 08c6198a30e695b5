//! Cooperative cancellation sampled at each recursion entry (spec.md §4.7,
//! §5's "a dedicated error kind with no partial state leakage").

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cheaply-cloned flag; [`Self::cancel`] is visible to every clone and to
/// every worker thread holding one.
#[derive(Debug, Clone)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// A fresh, not-yet-cancelled token.
    pub fn new() -> Self {
        CancellationToken(Arc::new(AtomicBool::new(true)))
    }

    /// Whether work guarded by this token should continue.
    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Signal every holder to stop at its next recursion entry.
    pub fn cancel(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_alive_and_stays_cancelled() {
        let token = CancellationToken::new();
        assert!(token.is_alive());
        let clone = token.clone();
        clone.cancel();
        assert!(!token.is_alive());
    }
}
