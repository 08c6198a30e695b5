//! Forward and reverse iteration over a [`crate::Storage`] (spec.md §4.2,
//! scenario 6: reverse-order read-back of a disk-backed mantissa).

use crate::access::AccessMode;
use crate::element::StorageElement;
use crate::error::StorageError;
use crate::StorageHandle;

/// Walks a [`crate::Storage`] `burst` elements at a time, re-filling an
/// internal buffer from the backing storage as it's exhausted. Going
/// forward this is a plain windowed read; going backward the burst windows
/// are opened back-to-front so the underlying storage never has to support
/// negative strides.
pub struct StorageIterator<T: StorageElement> {
    storage: StorageHandle<T>,
    burst: usize,
    reverse: bool,
    next_window_start: usize,
    buffer: Vec<T>,
    buffer_pos: usize,
    end: usize,
}

impl<T: StorageElement> StorageIterator<T> {
    /// Build a forward iterator over `storage`, reading `burst` elements at
    /// a time.
    pub fn forward(storage: StorageHandle<T>, burst: usize) -> Self {
        let end = storage.len();
        StorageIterator {
            storage,
            burst: burst.max(1),
            reverse: false,
            next_window_start: 0,
            buffer: Vec::new(),
            buffer_pos: 0,
            end,
        }
    }

    /// Build a reverse iterator over `storage`, yielding its last element
    /// first, reading `burst` elements at a time.
    pub fn reverse(storage: StorageHandle<T>, burst: usize) -> Self {
        let end = storage.len();
        StorageIterator {
            storage,
            burst: burst.max(1),
            reverse: true,
            next_window_start: end,
            buffer: Vec::new(),
            buffer_pos: 0,
            end,
        }
    }

    fn refill(&mut self) -> Result<bool, StorageError> {
        if !self.reverse {
            if self.next_window_start >= self.end {
                return Ok(false);
            }
            let length = self.burst.min(self.end - self.next_window_start);
            let window = self
                .storage
                .get_array(AccessMode::Read, self.next_window_start, length)?;
            self.buffer = window.as_slice().to_vec();
            self.next_window_start += length;
            self.buffer_pos = 0;
        } else {
            if self.next_window_start == 0 {
                return Ok(false);
            }
            let length = self.burst.min(self.next_window_start);
            let offset = self.next_window_start - length;
            let window = self.storage.get_array(AccessMode::Read, offset, length)?;
            self.buffer = window.as_slice().to_vec();
            self.next_window_start = offset;
            self.buffer_pos = self.buffer.len();
        }
        Ok(true)
    }
}

impl<T: StorageElement> Iterator for StorageIterator<T> {
    type Item = Result<T, StorageError>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.reverse {
            if self.buffer_pos >= self.buffer.len() {
                match self.refill() {
                    Ok(true) => {}
                    Ok(false) => return None,
                    Err(error) => return Some(Err(error)),
                }
            }
            let value = self.buffer[self.buffer_pos];
            self.buffer_pos += 1;
            Some(Ok(value))
        } else {
            if self.buffer_pos == 0 {
                match self.refill() {
                    Ok(true) => {}
                    Ok(false) => return None,
                    Err(error) => return Some(Err(error)),
                }
            }
            self.buffer_pos -= 1;
            Some(Ok(self.buffer[self.buffer_pos]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStorage;
    use std::sync::Arc;

    fn populated(len: usize) -> StorageHandle<u32> {
        let storage: StorageHandle<u32> = Arc::new(MemoryStorage::<u32>::new(len));
        {
            let mut window = storage.get_array(AccessMode::Write, 0, len).unwrap();
            for (i, v) in window.as_mut_slice().iter_mut().enumerate() {
                *v = i as u32;
            }
        }
        storage
    }

    #[test]
    fn forward_iteration_yields_in_order() {
        let storage = populated(10);
        let values: Vec<u32> = StorageIterator::forward(storage, 3)
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(values, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn reverse_iteration_yields_in_reverse_order() {
        let storage = populated(10);
        let values: Vec<u32> = StorageIterator::reverse(storage, 3)
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(values, (0..10).rev().collect::<Vec<_>>());
    }

    #[test]
    fn burst_larger_than_storage_still_terminates() {
        let storage = populated(4);
        let values: Vec<u32> = StorageIterator::forward(storage, 64)
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(values, vec![0, 1, 2, 3]);
    }

    #[test]
    fn empty_storage_yields_nothing() {
        let storage = populated(0);
        assert_eq!(StorageIterator::forward(storage, 4).count(), 0);
    }
}
