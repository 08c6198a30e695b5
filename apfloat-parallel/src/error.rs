//! Failure modes of the binary-splitting driver (spec.md §4.7).

/// The recursion was cancelled, or a lower layer failed.
#[derive(Debug, thiserror::Error)]
pub enum ParallelError {
    /// [`crate::CancellationToken::is_alive`] returned `false` during the
    /// recursion; no partial state escapes the call.
    #[error("cancelled")]
    Cancelled,
    #[error(transparent)]
    Precision(#[from] apfloat_convolution::PrecisionError),
}
