//! Arbitrary-precision number types and their arithmetic contract
//! (spec.md §3, §4.6).
//!
//! [`Apfloat`] is the real floating-point core; [`Apint`] constrains it to
//! exact integers; [`Aprational`] pairs two `Apint`s in lowest terms;
//! [`Apcomplex`] pairs two `Apfloat`s. Multiplication routes through
//! [`apfloat_convolution`]; division, roots, and the transcendental
//! inventory in [`transcendental`] build on Newton's method and
//! [`apfloat_parallel`]'s binary-splitting driver.

#![warn(missing_docs)]

mod apcomplex;
mod apfloat;
mod apint;
mod aprational;
mod arithmetic;
mod digits;
mod error;
mod precision;
pub mod transcendental;

pub use apcomplex::Apcomplex;
pub use apfloat::Apfloat;
pub use apint::Apint;
pub use aprational::Aprational;
pub use error::{ArithmeticError, ParseError};
pub use precision::{Precision, ITERATION_GUARD_DIGITS, MULTIPLY_GUARD_DIGITS};
