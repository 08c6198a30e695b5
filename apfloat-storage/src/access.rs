//! Scoped array-access windows (spec.md §3, §5).

use crate::element::StorageElement;

/// The access mode a window was opened with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Only reads are permitted; no writeback occurs on close.
    Read,
    /// Only writes are expected; the window is not pre-populated from
    /// storage (callers must fill every element before close).
    Write,
    /// Both reads and writes are permitted; writeback occurs on close.
    ReadWrite,
}

impl AccessMode {
    /// Whether this mode pre-populates its buffer from the backing storage.
    pub const fn reads(self) -> bool {
        matches!(self, AccessMode::Read | AccessMode::ReadWrite)
    }

    /// Whether this mode flushes its buffer back to the backing storage on
    /// close.
    pub const fn writes(self) -> bool {
        matches!(self, AccessMode::Write | AccessMode::ReadWrite)
    }
}

/// A scoped window into a [`crate::Storage`], covering `[offset, offset +
/// length)`. Dropping the window releases it; if it was opened for writing,
/// `Drop` flushes the buffered contents back to storage first.
///
/// This realizes the "sum type carrying a pointer to either a memory region
/// or a block buffer, plus a writeback hook" the REDESIGN FLAGS call for:
/// both backends hand back the same `ArrayAccess<T>`, differing only in what
/// closure they install as the writeback hook.
pub struct ArrayAccess<T: StorageElement> {
    buffer: Vec<T>,
    mode: AccessMode,
    offset: usize,
    release: Option<Box<dyn FnMut(&[T]) + Send>>,
}

impl<T: StorageElement> ArrayAccess<T> {
    pub(crate) fn new(
        buffer: Vec<T>,
        mode: AccessMode,
        offset: usize,
        release: Box<dyn FnMut(&[T]) + Send>,
    ) -> Self {
        ArrayAccess {
            buffer,
            mode,
            offset,
            release: Some(release),
        }
    }

    /// The window's starting offset within its storage.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The window's length, in elements.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the window covers zero elements.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Borrow the window's contents.
    pub fn as_slice(&self) -> &[T] {
        &self.buffer
    }

    /// Mutably borrow the window's contents. Only meaningful for `Write`/
    /// `ReadWrite` windows; mutations to a `Read` window are never flushed.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.buffer
    }

    /// The mode this window was opened with.
    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// Explicitly release the window, flushing it if it was opened for
    /// writing. Equivalent to letting it drop, spelled out for call sites
    /// that want the flush to happen at a precise point rather than at
    /// scope exit.
    pub fn close(mut self) {
        self.flush_and_release();
    }

    fn flush_and_release(&mut self) {
        if let Some(mut release) = self.release.take() {
            // The closure itself knows (from its captured mode) whether to
            // actually flush `buffer` back to storage; it is always invoked
            // so that write-range bookkeeping is unregistered on every exit
            // path, including panics unwinding through this `Drop`.
            release(&self.buffer);
        }
    }
}

impl<T: StorageElement> Drop for ArrayAccess<T> {
    fn drop(&mut self) {
        self.flush_and_release();
    }
}
