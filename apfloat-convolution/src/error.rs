//! Failure modes of mantissa multiplication (spec.md §4.5).

/// Multiplication failed before producing a result.
#[derive(Debug, thiserror::Error)]
pub enum PrecisionError {
    /// The three fixed primes' product can't represent every possible
    /// convolution sum at this transform length; the caller must switch to
    /// a wider element type (`Int` -> `Long`).
    #[error(
        "convolution of length {length} under radix {radix} needs a CRT modulus wider than the \
         three {family} primes provide; switch builderFactory to a wider element type"
    )]
    InsufficientRange {
        /// The admissible transform length that was selected.
        length: usize,
        /// The mantissa radix in use.
        radix: u32,
        /// Which element family's primes were insufficient.
        family: &'static str,
    },
    /// The requested transform length exceeds every fixed prime's supported
    /// power-of-two range.
    #[error("mantissa lengths {lhs} + {rhs} exceed the largest transform length this family supports")]
    LengthUnsupported {
        /// Length of the left mantissa.
        lhs: usize,
        /// Length of the right mantissa.
        rhs: usize,
    },
    #[error(transparent)]
    Ntt(#[from] apfloat_ntt::NttError),
    #[error(transparent)]
    Storage(#[from] apfloat_storage::StorageError),
}
