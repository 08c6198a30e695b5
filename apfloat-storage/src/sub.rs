//! Subsequence views over a [`Storage`] (spec.md §3).

use crate::access::{AccessMode, ArrayAccess};
use crate::element::StorageElement;
use crate::error::StorageError;
use crate::{Storage, StorageHandle};

/// A window `[base, base + len)` onto a parent storage. Holds a clone of the
/// parent's handle, so the parent stays alive for as long as any subsequence
/// of it does, no matter which one is dropped first.
pub struct SubStorage<T: StorageElement> {
    parent: StorageHandle<T>,
    base: usize,
    len: usize,
}

impl<T: StorageElement> SubStorage<T> {
    /// Create a subsequence of `parent` covering `[base, base + len)`.
    /// `base + len` must not exceed the parent's current length.
    pub fn new(parent: StorageHandle<T>, base: usize, len: usize) -> Result<Self, StorageError> {
        let parent_len = parent.len();
        if base.checked_add(len).map(|end| end > parent_len).unwrap_or(true) {
            return Err(StorageError::OutOfBounds {
                offset: base,
                length: len,
                len: parent_len,
            });
        }
        Ok(SubStorage { parent, base, len })
    }

    /// The offset of this subsequence within its parent.
    pub fn base(&self) -> usize {
        self.base
    }
}

impl<T: StorageElement> Storage<T> for SubStorage<T> {
    fn len(&self) -> usize {
        self.len
    }

    fn set_size(&self, _new_len: usize) -> Result<(), StorageError> {
        Err(StorageError::AlreadyFinalized)
    }

    fn get_array(
        &self,
        mode: AccessMode,
        offset: usize,
        length: usize,
    ) -> Result<ArrayAccess<T>, StorageError> {
        if offset.checked_add(length).map(|end| end > self.len).unwrap_or(true) {
            return Err(StorageError::OutOfBounds {
                offset,
                length,
                len: self.len,
            });
        }
        self.parent.get_array(mode, self.base + offset, length)
    }

    fn is_memory_backed(&self) -> bool {
        self.parent.is_memory_backed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStorage;
    use std::sync::Arc;

    #[test]
    fn subsequence_reads_parent_range() {
        let parent: StorageHandle<u32> = Arc::new(MemoryStorage::<u32>::new(16));
        {
            let mut window = parent.get_array(AccessMode::Write, 0, 16).unwrap();
            for (i, v) in window.as_mut_slice().iter_mut().enumerate() {
                *v = i as u32;
            }
        }
        let sub = SubStorage::new(Arc::clone(&parent), 4, 8).unwrap();
        let window = sub.get_array(AccessMode::Read, 0, 8).unwrap();
        assert_eq!(window.as_slice(), &[4, 5, 6, 7, 8, 9, 10, 11]);
    }

    #[test]
    fn out_of_range_subsequence_rejected() {
        let parent: StorageHandle<u32> = Arc::new(MemoryStorage::<u32>::new(8));
        assert!(matches!(
            SubStorage::new(parent, 4, 8),
            Err(StorageError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn writes_through_subsequence_are_visible_in_parent() {
        let parent: StorageHandle<u32> = Arc::new(MemoryStorage::<u32>::new(8));
        let sub = SubStorage::new(Arc::clone(&parent), 2, 4).unwrap();
        {
            let mut window = sub.get_array(AccessMode::Write, 0, 4).unwrap();
            window.as_mut_slice().copy_from_slice(&[9, 9, 9, 9]);
        }
        let window = parent.get_array(AccessMode::Read, 2, 4).unwrap();
        assert_eq!(window.as_slice(), &[9, 9, 9, 9]);
    }
}
