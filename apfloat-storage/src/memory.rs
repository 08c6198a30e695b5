//! The in-memory storage backend (spec.md §4.2).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::access::{AccessMode, ArrayAccess};
use crate::element::StorageElement;
use crate::error::StorageError;
use crate::range_tracker::RangeTracker;
use crate::Storage;

/// Contiguous in-memory backing for a [`Storage`]. `get_array` hands back a
/// buffer that aliases this array's contents by copy-in/copy-out; since the
/// whole array already lives in process memory, "closing" the window is
/// cheap enough that the spec's "no-op close" is realized as a plain memcpy
/// writeback rather than true pointer aliasing, which Rust's borrow rules
/// would not let us hand out across an arbitrary caller-held window anyway.
pub struct MemoryStorage<T: StorageElement> {
    data: Arc<Mutex<Vec<T>>>,
    writes: Arc<RangeTracker>,
    finalized: AtomicBool,
}

impl<T: StorageElement> MemoryStorage<T> {
    /// Allocate a zero-filled in-memory storage of `len` elements.
    pub fn new(len: usize) -> Self {
        MemoryStorage {
            data: Arc::new(Mutex::new(vec![T::default(); len])),
            writes: Arc::new(RangeTracker::default()),
            finalized: AtomicBool::new(false),
        }
    }

    /// Snapshot the full contents (used by migration and testing).
    pub fn to_vec(&self) -> Vec<T> {
        self.data.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

impl<T: StorageElement> Storage<T> for MemoryStorage<T> {
    fn len(&self) -> usize {
        self.data.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    fn set_size(&self, new_len: usize) -> Result<(), StorageError> {
        if self.finalized.swap(true, Ordering::AcqRel) {
            return Err(StorageError::AlreadyFinalized);
        }
        let mut data = self.data.lock().unwrap_or_else(|p| p.into_inner());
        data.resize(new_len, T::default());
        Ok(())
    }

    fn get_array(
        &self,
        mode: AccessMode,
        offset: usize,
        length: usize,
    ) -> Result<ArrayAccess<T>, StorageError> {
        self.finalized.store(true, Ordering::Release);
        let len = self.len();
        if offset.checked_add(length).map(|end| end > len).unwrap_or(true) {
            return Err(StorageError::OutOfBounds { offset, length, len });
        }
        let range = offset..offset + length;
        if mode.writes() && !self.writes.try_register(range.clone()) {
            return Err(StorageError::WriteConflict { offset, length });
        }

        let buffer = if mode.reads() {
            let data = self.data.lock().unwrap_or_else(|p| p.into_inner());
            data[range.clone()].to_vec()
        } else {
            vec![T::default(); length]
        };

        let data = Arc::clone(&self.data);
        let writes = Arc::clone(&self.writes);
        let should_write = mode.writes();
        let range_for_close = range.clone();
        let release = move |buf: &[T]| {
            if should_write {
                let mut data = data.lock().unwrap_or_else(|p| p.into_inner());
                data[range_for_close.clone()].copy_from_slice(buf);
            }
            writes.unregister(&range_for_close);
        };

        Ok(ArrayAccess::new(buffer, mode, offset, Box::new(release)))
    }

    fn is_memory_backed(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_round_trips() {
        let storage = MemoryStorage::<u32>::new(16);
        {
            let mut window = storage.get_array(AccessMode::Write, 4, 4).unwrap();
            window.as_mut_slice().copy_from_slice(&[1, 2, 3, 4]);
        }
        let window = storage.get_array(AccessMode::Read, 4, 4).unwrap();
        assert_eq!(window.as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn overlapping_write_windows_rejected() {
        let storage = MemoryStorage::<u32>::new(16);
        let _first = storage.get_array(AccessMode::Write, 0, 8).unwrap();
        let second = storage.get_array(AccessMode::Write, 4, 4);
        assert!(matches!(second, Err(StorageError::WriteConflict { .. })));
    }

    #[test]
    fn dropping_write_window_releases_range() {
        let storage = MemoryStorage::<u32>::new(16);
        {
            let _first = storage.get_array(AccessMode::Write, 0, 8).unwrap();
        }
        let second = storage.get_array(AccessMode::Write, 4, 4);
        assert!(second.is_ok());
    }

    #[test]
    fn out_of_bounds_rejected() {
        let storage = MemoryStorage::<u32>::new(4);
        assert!(matches!(
            storage.get_array(AccessMode::Read, 2, 4),
            Err(StorageError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn set_size_only_once() {
        let storage = MemoryStorage::<u32>::new(4);
        assert!(storage.set_size(8).is_ok());
        assert_eq!(storage.len(), 8);
        assert!(matches!(storage.set_size(16), Err(StorageError::AlreadyFinalized)));
    }
}
