//! Failure modes for the NTT layer (spec.md §4.4, §7).

/// Errors raised while planning or running a transform.
#[derive(Debug, thiserror::Error)]
pub enum NttError {
    /// The requested transform length isn't of an admissible form (`2^n` or
    /// `3*2^n`) or exceeds the prime family's maximum supported order.
    #[error("transform length {length} is not admissible (max supported length is {max})")]
    InvalidLength {
        /// The length that was requested.
        length: usize,
        /// The largest length the active prime family supports.
        max: usize,
    },
    /// A lower-layer storage operation failed.
    #[error(transparent)]
    Storage(#[from] apfloat_storage::StorageError),
}
