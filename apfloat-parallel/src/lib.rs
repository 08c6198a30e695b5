//! Parallel binary-splitting driver for linearly convergent series, and the
//! Chudnovsky series for pi built on top of it (spec.md §4.7, §5, §6).
//!
//! This crate intentionally has no dependency on `apfloat_number`: that
//! crate depends on *this* one to evaluate its own transcendental series,
//! so [`split::binary_split`] is generic over an opaque accumulated value
//! instead, and [`chudnovsky`] carries its own small [`bigint::BigInt`]
//! rather than reaching for `Apfloat`. See `DESIGN.md` for the full
//! rationale.

#![warn(missing_docs)]
#![deny(unused_must_use)]

pub mod bigint;
pub mod cancel;
pub mod chudnovsky;
pub mod error;
pub mod node_set;
pub mod split;

pub use bigint::BigInt;
pub use cancel::CancellationToken;
pub use error::ParallelError;
pub use node_set::NodeSet;
pub use split::{binary_split, binary_split_root};
