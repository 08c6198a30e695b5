//! Failure modes of the storage subsystem (spec.md §4.2, §7).

/// Storage-layer errors. File errors are fatal for the operation that hit
/// them and are never retried at this layer; size overflow is reported
/// separately so callers can distinguish "disk is broken" from "this would
/// not fit any representable length".
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// An I/O error occurred against the disk-backed file.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The requested size exceeds what this element type / platform can
    /// represent.
    #[error("requested size {requested} exceeds representable maximum {max}")]
    Overflow {
        /// The size that was requested, in elements or bytes depending on
        /// call site.
        requested: u64,
        /// The representable maximum.
        max: u64,
    },
    /// `get_array` was asked for a range outside `[0, len)`.
    #[error("range [{offset}, {offset}+{length}) is out of bounds for storage of length {len}")]
    OutOfBounds {
        /// Requested window offset.
        offset: usize,
        /// Requested window length.
        length: usize,
        /// The storage's current logical length.
        len: usize,
    },
    /// A second `WRITE` window overlapping an already-open one was
    /// requested (spec.md §4.2 invariant: at most one live write window per
    /// overlapping range).
    #[error("overlapping write window already open for range [{offset}, {offset}+{length})")]
    WriteConflict {
        /// Requested window offset.
        offset: usize,
        /// Requested window length.
        length: usize,
    },
    /// `set_size` was called more than once, or after the storage had
    /// already been accessed.
    #[error("storage size was already finalized")]
    AlreadyFinalized,
    /// A transposed-view precondition failed (dimensions not powers of two,
    /// or the requested column block runs past the matrix width).
    #[error("invalid transpose geometry: {0}")]
    InvalidGeometry(String),
}
