//! The six-step NTT's cache-blocked transpose stage (spec.md §4.3).

use std::sync::atomic::Ordering;

use crate::access::AccessMode;
use crate::element::StorageElement;
use crate::error::StorageError;
use crate::StorageHandle;

/// A `rows x cols` row-major view over a [`crate::Storage`], with an
/// in-place transpose to `cols x rows`.
///
/// [`crate::ArrayAccess`] windows are contiguous ranges, so a transpose can't
/// be expressed as a sequence of small strided storage writes; instead the
/// whole array is read once, permuted tile-by-tile so each tile's working
/// set fits in L1/L2 cache, and written back once. The cache blocking is
/// what the six-step algorithm actually buys here -- CPU cache locality
/// during the permutation -- not avoidance of the read/write backend, which
/// the memory/disk split already governs.
pub struct TransposedView<T: StorageElement> {
    inner: StorageHandle<T>,
    rows: usize,
    cols: usize,
}

impl<T: StorageElement> TransposedView<T> {
    /// View `inner` as a `rows x cols` row-major array. Fails if
    /// `rows * cols` doesn't match the storage's current length.
    pub fn new(inner: StorageHandle<T>, rows: usize, cols: usize) -> Result<Self, StorageError> {
        let expected = rows.checked_mul(cols).ok_or_else(|| {
            StorageError::InvalidGeometry(format!("rows ({rows}) * cols ({cols}) overflows"))
        })?;
        if expected != inner.len() {
            return Err(StorageError::InvalidGeometry(format!(
                "rows ({rows}) * cols ({cols}) != storage length ({})",
                inner.len()
            )));
        }
        Ok(TransposedView { inner, rows, cols })
    }

    /// Row count before transposition.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Column count before transposition.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Rewrite the backing storage from row-major `rows x cols` to row-major
    /// `cols x rows`, processed in `block x block` tiles. `block` is
    /// typically derived from [`apfloat_context::Context::cache_l1_size`].
    pub fn transpose_in_place(&self, block: usize) -> Result<(), StorageError> {
        let block = block.max(1);
        let total = self.rows * self.cols;
        let mut out = vec![T::default(); total];

        {
            let window = self.inner.get_array(AccessMode::Read, 0, total)?;
            let src = window.as_slice();
            let mut row0 = 0;
            while row0 < self.rows {
                let row1 = (row0 + block).min(self.rows);
                let mut col0 = 0;
                while col0 < self.cols {
                    let col1 = (col0 + block).min(self.cols);
                    for r in row0..row1 {
                        let src_row = &src[r * self.cols..(r + 1) * self.cols];
                        for c in col0..col1 {
                            out[c * self.rows + r] = src_row[c];
                        }
                    }
                    col0 = col1;
                }
                row0 = row1;
            }
        }

        let mut window = self.inner.get_array(AccessMode::Write, 0, total)?;
        window.as_mut_slice().copy_from_slice(&out);
        std::sync::atomic::fence(Ordering::Release);
        Ok(())
    }

    /// Swap the logical row/column counts to reflect a transpose already
    /// performed with [`Self::transpose_in_place`].
    pub fn into_swapped(self) -> TransposedView<T> {
        TransposedView {
            inner: self.inner,
            rows: self.cols,
            cols: self.rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStorage;
    use std::sync::Arc;

    fn fill(storage: &StorageHandle<u32>, rows: usize, cols: usize) {
        let mut window = storage.get_array(AccessMode::Write, 0, rows * cols).unwrap();
        for (i, v) in window.as_mut_slice().iter_mut().enumerate() {
            *v = i as u32;
        }
    }

    #[test]
    fn transposes_rectangular_matrix() {
        let storage: StorageHandle<u32> = Arc::new(MemoryStorage::<u32>::new(12));
        fill(&storage, 3, 4);
        let view = TransposedView::new(Arc::clone(&storage), 3, 4).unwrap();
        view.transpose_in_place(2).unwrap();
        let window = storage.get_array(AccessMode::Read, 0, 12).unwrap();
        // original: [[0,1,2,3],[4,5,6,7],[8,9,10,11]] -> transposed 4x3
        assert_eq!(
            window.as_slice(),
            &[0, 4, 8, 1, 5, 9, 2, 6, 10, 3, 7, 11]
        );
    }

    #[test]
    fn double_transpose_is_identity() {
        let storage: StorageHandle<u32> = Arc::new(MemoryStorage::<u32>::new(20));
        fill(&storage, 4, 5);
        let original: Vec<u32> = storage
            .get_array(AccessMode::Read, 0, 20)
            .unwrap()
            .as_slice()
            .to_vec();

        let view = TransposedView::new(Arc::clone(&storage), 4, 5).unwrap();
        view.transpose_in_place(3).unwrap();
        let view = view.into_swapped();
        view.transpose_in_place(3).unwrap();

        let round_tripped = storage.get_array(AccessMode::Read, 0, 20).unwrap();
        assert_eq!(round_tripped.as_slice(), original.as_slice());
    }

    #[test]
    fn mismatched_geometry_rejected() {
        let storage: StorageHandle<u32> = Arc::new(MemoryStorage::<u32>::new(12));
        assert!(matches!(
            TransposedView::new(storage, 5, 5),
            Err(StorageError::InvalidGeometry(_))
        ));
    }
}
