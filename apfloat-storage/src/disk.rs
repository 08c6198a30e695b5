//! The disk-backed storage backend (spec.md §4.2).

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use apfloat_context::Context;

use crate::access::{AccessMode, ArrayAccess};
use crate::element::StorageElement;
use crate::error::StorageError;
use crate::range_tracker::RangeTracker;
use crate::Storage;

/// A temporary file backing a [`Storage`]. The file is named by the
/// context's [`apfloat_context::FilenameGenerator`] and deleted when the
/// last handle to this storage is dropped.
pub struct DiskStorage<T: StorageElement> {
    path: PathBuf,
    file: Arc<Mutex<File>>,
    len: AtomicUsize,
    writes: Arc<RangeTracker>,
    finalized: AtomicBool,
    block_size_elems: usize,
    _marker: PhantomData<T>,
}

impl<T: StorageElement> DiskStorage<T> {
    /// Create a new disk-backed storage of `len` elements, named by `ctx`'s
    /// filename generator, windowed by `ctx`'s block size.
    pub fn new(ctx: &Context, len: usize) -> Result<Self, StorageError> {
        let name = ctx.filename_generator().next();
        let path = PathBuf::from(name);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        let byte_len = (len as u64)
            .checked_mul(T::SIZE as u64)
            .ok_or(StorageError::Overflow {
                requested: len as u64,
                max: u64::MAX / T::SIZE as u64,
            })?;
        file.set_len(byte_len)?;
        tracing::debug!(path = %path.display(), elements = len, "allocated disk-backed storage");
        let block_size_elems = (ctx.block_size() as usize / T::SIZE).max(1);
        Ok(DiskStorage {
            path,
            file: Arc::new(Mutex::new(file)),
            len: AtomicUsize::new(len),
            writes: Arc::new(RangeTracker::default()),
            finalized: AtomicBool::new(false),
            block_size_elems,
            _marker: PhantomData,
        })
    }

    /// Read the full contents into memory (used by migration and testing;
    /// not part of the scoped-window contract).
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        let window = self.get_array(AccessMode::Read, 0, self.len())?;
        Ok(window.as_slice().to_vec())
    }

    fn read_chunked(&self, offset: usize, length: usize) -> std::io::Result<Vec<T>> {
        let mut file = self.file.lock().unwrap_or_else(|p| p.into_inner());
        file.seek(SeekFrom::Start((offset * T::SIZE) as u64))?;
        let mut out = Vec::with_capacity(length);
        let mut remaining = length;
        let mut byte_buf = vec![0u8; self.block_size_elems.min(length.max(1)) * T::SIZE];
        while remaining > 0 {
            let this_chunk = remaining.min(self.block_size_elems);
            let slice = &mut byte_buf[..this_chunk * T::SIZE];
            file.read_exact(slice)?;
            for chunk in slice.chunks_exact(T::SIZE) {
                out.push(T::from_le_bytes_slice(chunk));
            }
            remaining -= this_chunk;
        }
        Ok(out)
    }

}

impl<T: StorageElement> Storage<T> for DiskStorage<T> {
    fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    fn set_size(&self, new_len: usize) -> Result<(), StorageError> {
        if self.finalized.swap(true, Ordering::AcqRel) {
            return Err(StorageError::AlreadyFinalized);
        }
        let byte_len = (new_len as u64)
            .checked_mul(T::SIZE as u64)
            .ok_or(StorageError::Overflow {
                requested: new_len as u64,
                max: u64::MAX / T::SIZE as u64,
            })?;
        self.file
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .set_len(byte_len)?;
        self.len.store(new_len, Ordering::Release);
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
            self.read_chunked(offset, length)?
        } else {
            vec![T::default(); length]
        };

        let file = Arc::clone(&self.file);
        let writes = Arc::clone(&self.writes);
        let block_size_elems = self.block_size_elems;
        let should_write = mode.writes();
        let range_for_close = range.clone();
        let release = move |buf: &[T]| {
            if should_write {
                let write = || -> std::io::Result<()> {
                    let mut file = file.lock().unwrap_or_else(|p| p.into_inner());
                    file.seek(SeekFrom::Start((range_for_close.start * T::SIZE) as u64))?;
                    for block in buf.chunks(block_size_elems) {
                        let mut byte_buf = Vec::with_capacity(block.len() * T::SIZE);
                        for &elem in block {
                            byte_buf.extend_from_slice(&elem.to_le_bytes_vec());
                        }
                        file.write_all(&byte_buf)?;
                    }
                    Ok(())
                };
                if let Err(error) = write() {
                    tracing::warn!(%error, "failed to flush disk-backed array access");
                }
            }
            writes.unregister(&range_for_close);
        };

        Ok(ArrayAccess::new(buffer, mode, offset, Box::new(release)))
    }

    fn is_memory_backed(&self) -> bool {
        false
    }
}

impl<T: StorageElement> Drop for DiskStorage<T> {
    fn drop(&mut self) {
        if let Err(error) = std::fs::remove_file(&self.path) {
            if error.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), %error, "failed to delete temporary storage file");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_context(dir: &std::path::Path) -> Context {
        Context::builder()
            .with_filename_generator(format!("{}/apf", dir.display()), 0, ".tmp")
            .with_block_size(64)
            .build()
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = test_context(dir.path());
        let storage = DiskStorage::<u32>::new(&ctx, 16).unwrap();
        {
            let mut window = storage.get_array(AccessMode::Write, 4, 4).unwrap();
            window.as_mut_slice().copy_from_slice(&[1, 2, 3, 4]);
        }
        let window = storage.get_array(AccessMode::Read, 4, 4).unwrap();
        assert_eq!(window.as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn large_window_spans_multiple_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = test_context(dir.path());
        let storage = DiskStorage::<u32>::new(&ctx, 256).unwrap();
        let values: Vec<u32> = (0..256).collect();
        {
            let mut window = storage.get_array(AccessMode::Write, 0, 256).unwrap();
            window.as_mut_slice().copy_from_slice(&values);
        }
        let window = storage.get_array(AccessMode::Read, 0, 256).unwrap();
        assert_eq!(window.as_slice(), values.as_slice());
    }

    #[test]
    fn file_deleted_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = test_context(dir.path());
        let storage = DiskStorage::<u32>::new(&ctx, 4).unwrap();
        let path = storage.path.clone();
        assert!(path.exists());
        drop(storage);
        assert!(!path.exists());
    }
}
