//! Backend selection between [`memory::MemoryStorage`] and
//! [`disk::DiskStorage`] (spec.md §3, §4.2).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use apfloat_context::Context;

use crate::access::AccessMode;
use crate::disk::DiskStorage;
use crate::element::StorageElement;
use crate::error::StorageError;
use crate::memory::MemoryStorage;
use crate::{Storage, StorageHandle};

/// Creates storages sized against a [`Context`]'s `memory_threshold`, and
/// caches disk-backed storages keyed by a caller-chosen tag so repeated
/// requests for e.g. a convolution's twiddle table reuse the same file
/// instead of re-allocating it.
pub struct StorageFactory {
    ctx: Context,
    cache: Mutex<HashMap<String, Arc<dyn std::any::Any + Send + Sync>>>,
}

impl StorageFactory {
    /// Build a factory bound to `ctx`'s thresholds.
    pub fn new(ctx: Context) -> Self {
        StorageFactory {
            ctx,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Allocate a new storage of `len` elements: memory-backed if `len *
    /// size_of::<T>()` is below the context's `memory_threshold`, disk-backed
    /// otherwise.
    pub fn create<T: StorageElement>(&self, len: usize) -> Result<StorageHandle<T>, StorageError> {
        let bytes = len.saturating_mul(T::SIZE) as u64;
        if bytes < self.ctx.memory_threshold() {
            Ok(Arc::new(MemoryStorage::<T>::new(len)))
        } else {
            Ok(Arc::new(DiskStorage::<T>::new(&self.ctx, len)?))
        }
    }

    /// Like [`Self::create`], but always memory-backed regardless of
    /// threshold. Used for small fixed-size scratch buffers (twiddle
    /// factors, CRT residue tables) that are always worth keeping resident.
    pub fn create_memory<T: StorageElement>(&self, len: usize) -> StorageHandle<T> {
        Arc::new(MemoryStorage::<T>::new(len))
    }

    /// Fetch (or lazily build) a cached memory-backed storage under `key`.
    /// Subsequent calls with the same `key` and element type return the
    /// same handle; a call with the same `key` but a different element
    /// type is a caller bug and panics.
    pub fn cached<T: StorageElement>(
        &self,
        key: &str,
        len: usize,
    ) -> StorageHandle<T> {
        let mut cache = self.cache.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(existing) = cache.get(key) {
            return existing
                .clone()
                .downcast::<StorageHandle<T>>()
                .unwrap_or_else(|_| panic!("storage cache key `{key}` reused with a different element type"))
                .as_ref()
                .clone();
        }
        let handle: StorageHandle<T> = self.create_memory(len);
        cache.insert(key.to_string(), Arc::new(handle.clone()) as Arc<dyn std::any::Any + Send + Sync>);
        handle
    }

    /// Copy a storage's contents into a new backend of the opposite kind
    /// (memory -> disk or disk -> memory), e.g. when a running sum outgrows
    /// the in-memory threshold mid-computation.
    pub fn migrate<T: StorageElement>(
        &self,
        source: &StorageHandle<T>,
    ) -> Result<StorageHandle<T>, StorageError> {
        let len = source.len();
        let destination: StorageHandle<T> = if source.is_memory_backed() {
            Arc::new(DiskStorage::<T>::new(&self.ctx, len)?)
        } else {
            Arc::new(MemoryStorage::<T>::new(len))
        };
        let read = source.get_array(AccessMode::Read, 0, len)?;
        let mut write = destination.get_array(AccessMode::Write, 0, len)?;
        write.as_mut_slice().copy_from_slice(read.as_slice());
        Ok(destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_requests_are_memory_backed() {
        let ctx = Context::builder().with_memory_threshold(1 << 20).build();
        let factory = StorageFactory::new(ctx);
        let storage: StorageHandle<u32> = factory.create(16).unwrap();
        assert!(storage.is_memory_backed());
    }

    #[test]
    fn large_requests_are_disk_backed() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Context::builder()
            .with_memory_threshold(64)
            .with_filename_generator(format!("{}/apf", dir.path().display()), 0, ".tmp")
            .build();
        let factory = StorageFactory::new(ctx);
        let storage: StorageHandle<u32> = factory.create(256).unwrap();
        assert!(!storage.is_memory_backed());
    }

    #[test]
    fn migrate_preserves_contents() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Context::builder()
            .with_memory_threshold(1 << 20)
            .with_filename_generator(format!("{}/apf", dir.path().display()), 0, ".tmp")
            .build();
        let factory = StorageFactory::new(ctx);
        let source: StorageHandle<u32> = factory.create(8).unwrap();
        {
            let mut w = source.get_array(AccessMode::Write, 0, 8).unwrap();
            w.as_mut_slice().copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        }
        let migrated = factory.migrate(&source).unwrap();
        let read = migrated.get_array(AccessMode::Read, 0, 8).unwrap();
        assert_eq!(read.as_slice(), &[1, 2, 3, 4, 5, 6, 7, 8]);
    }
}
