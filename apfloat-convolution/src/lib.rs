//! Mantissa multiplication: schoolbook below a size threshold (and for
//! element families with no NTT path), three-prime NTT convolution above it
//! (spec.md §4.5).
//!
//! Digit sequences are little-endian throughout this crate (index 0 is the
//! least significant digit) -- the natural convention for polynomial-style
//! convolution. [`apfloat_number`] is responsible for reversing its
//! most-significant-first mantissa storage at the call boundary.

#![warn(missing_docs)]
#![deny(unused_must_use)]

mod crt;
pub mod error;
mod ntt_path;
mod schoolbook;

use apfloat_context::{BuilderFactory, Context};
use apfloat_ntt::primes::{PRIME_INFO_32, PRIME_INFO_64};

pub use error::PrecisionError;

/// Below this many digits (in the larger operand), schoolbook multiplication
/// beats the fixed overhead of three forward/inverse transforms (spec.md
/// §4.5 "16 to 64 elements").
pub const SCHOOLBOOK_THRESHOLD: usize = 32;

/// Multiply two little-endian mantissa digit sequences in `radix`,
/// returning exactly `lhs.len() + rhs.len()` digits (the top digit may be
/// zero; the caller shifts scale accordingly).
///
/// Dispatches to schoolbook multiplication for small inputs or for element
/// families with no NTT path ([`BuilderFactory::Float`]/[`BuilderFactory::Double`]),
/// and to the three-prime NTT pipeline otherwise.
pub fn multiply_mantissas(
    ctx: &Context,
    lhs: &[u32],
    rhs: &[u32],
    radix: u32,
) -> Result<Vec<u32>, PrecisionError> {
    let factory = ctx.builder_factory();
    let larger = lhs.len().max(rhs.len());

    if !factory.supports_ntt() || larger <= SCHOOLBOOK_THRESHOLD {
        return Ok(schoolbook::multiply(lhs, rhs, radix));
    }

    match factory {
        BuilderFactory::Int => ntt_path::multiply(
            apfloat_ntt::family_32(),
            PRIME_INFO_32.map(|info| info.modulus.p as u64),
            "32-bit",
            BuilderFactory::Int,
            ctx,
            lhs,
            rhs,
            radix,
        ),
        BuilderFactory::Long => ntt_path::multiply(
            apfloat_ntt::family_64(),
            PRIME_INFO_64.map(|info| info.modulus.p),
            "64-bit",
            BuilderFactory::Long,
            ctx,
            lhs,
            rhs,
            radix,
        ),
        BuilderFactory::Float | BuilderFactory::Double => unreachable!("filtered out above"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_digits(mut n: u128, radix: u32, len: usize) -> Vec<u32> {
        let mut out = vec![0u32; len];
        for slot in out.iter_mut() {
            *slot = (n % radix as u128) as u32;
            n /= radix as u128;
        }
        out
    }

    fn from_digits(digits: &[u32], radix: u32) -> u128 {
        digits.iter().rev().fold(0u128, |acc, &d| acc * radix as u128 + d as u128)
    }

    #[test]
    fn schoolbook_path_matches_native_multiplication() {
        let ctx = Context::builder().build();
        let a = to_digits(123_456, 10, 8);
        let b = to_digits(7_890, 10, 8);
        let product = multiply_mantissas(&ctx, &a, &b, 10).unwrap();
        assert_eq!(from_digits(&product, 10), 123_456 * 7_890);
    }

    #[test]
    fn ntt_path_matches_schoolbook_on_large_random_operands() {
        let ctx = Context::builder().with_builder_factory(BuilderFactory::Int).build();
        let radix = 10u32;
        let a: Vec<u32> = (0..200).map(|i| ((i * 37 + 5) % radix as usize) as u32).collect();
        let b: Vec<u32> = (0..200).map(|i| ((i * 53 + 3) % radix as usize) as u32).collect();

        let via_ntt = multiply_mantissas(&ctx, &a, &b, radix).unwrap();
        let via_schoolbook = schoolbook::multiply(&a, &b, radix);
        assert_eq!(via_ntt, via_schoolbook);
    }

    #[test]
    fn float_family_always_uses_schoolbook() {
        let ctx = Context::builder().with_builder_factory(BuilderFactory::Double).build();
        let a = vec![1u32; 200];
        let b = vec![1u32; 200];
        let result = multiply_mantissas(&ctx, &a, &b, 10).unwrap();
        assert_eq!(result, schoolbook::multiply(&a, &b, 10));
    }

    #[test]
    fn zero_length_operand_yields_empty_result() {
        let ctx = Context::builder().build();
        assert!(multiply_mantissas(&ctx, &[], &[], 10).unwrap().is_empty());
    }
}
