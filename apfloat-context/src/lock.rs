//! The shared-memory lock (spec.md §5): guards any allocation or access to a
//! memory buffer larger than `memoryTreshold`.

use std::sync::{Arc, Mutex, MutexGuard};

/// A clonable handle to the process-wide large-allocation lock.
///
/// Cloning a [`SharedMemoryLock`] shares the same underlying mutex (it is an
/// `Arc`), matching the way `fuel_vm::pool::VmPool` clones share one
/// `Arc<Mutex<_>>` pool rather than each getting an independent lock.
#[derive(Debug, Clone)]
pub struct SharedMemoryLock(Arc<Mutex<()>>);

impl SharedMemoryLock {
    /// Allocate a fresh, uncontended lock.
    pub fn new() -> Self {
        SharedMemoryLock(Arc::new(Mutex::new(())))
    }

    /// Acquire the lock for the duration of a large allocation or access.
    ///
    /// Poison recovery mirrors `fuel_vm::pool::VmPool::take_raw`: a poisoned
    /// lock means a prior holder panicked mid-allocation, which cannot leave
    /// this unit value in an inconsistent state, so we recover rather than
    /// propagate the poison.
    pub fn acquire(&self) -> MutexGuard<'_, ()> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for SharedMemoryLock {
    fn default() -> Self {
        SharedMemoryLock::new()
    }
}
