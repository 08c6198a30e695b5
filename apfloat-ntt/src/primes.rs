//! Primitive roots of unity for the fixed NTT primes in
//! [`apfloat_modmath::PRIMES_32`]/[`apfloat_modmath::PRIMES_64`].
//!
//! Each prime is `k*2^n + 1`; `root` is an element of multiplicative order
//! exactly `2^n`, i.e. a generator of the unique subgroup of 2-power order.
//! Values were computed offline (`sympy.primitive_root`, verified against
//! `pow(root, 2**n, p) == 1` and `pow(root, 2**(n-1), p) != 1`) since this
//! crate never runs a primality/order search at build time.

use apfloat_modmath::{Modulus32, Modulus64, PRIMES_32, PRIMES_64};

/// A prime's NTT-relevant metadata: the largest power-of-two transform
/// length it supports, and a primitive root of that order.
#[derive(Debug, Clone, Copy)]
pub struct PrimeInfo<M, E> {
    /// The modulus itself.
    pub modulus: M,
    /// `n` such that the prime is `k*2^n + 1`; `2^n` is the largest
    /// power-of-two transform length this prime alone supports.
    pub max_log_len: u32,
    /// An element of multiplicative order `2^max_log_len`.
    pub root: E,
    /// A primitive cube root of unity, present only when `3 | (p-1)` --
    /// needed for the factor-3 butterfly layer. `k` isn't always a multiple
    /// of 3, so not every prime in the family supports it.
    pub cube_root: Option<E>,
}

/// Metadata for [`apfloat_modmath::PRIMES_32`], in the same order.
pub const PRIME_INFO_32: [PrimeInfo<Modulus32, u32>; 3] = [
    PrimeInfo {
        modulus: PRIMES_32[0],
        max_log_len: 24,
        root: 1_791_270_792,
        cube_root: None,
    },
    PrimeInfo {
        modulus: PRIMES_32[1],
        max_log_len: 25,
        root: 1_971_140_334,
        cube_root: Some(1_783_381_011),
    },
    PrimeInfo {
        modulus: PRIMES_32[2],
        max_log_len: 27,
        root: 440_564_289,
        cube_root: Some(1_314_723_123),
    },
];

/// Metadata for [`apfloat_modmath::PRIMES_64`], in the same order.
pub const PRIME_INFO_64: [PrimeInfo<Modulus64, u64>; 3] = [
    PrimeInfo {
        modulus: PRIMES_64[0],
        max_log_len: 55,
        root: 4_614_278_974_170_858_164,
        cube_root: None,
    },
    PrimeInfo {
        modulus: PRIMES_64[1],
        max_log_len: 56,
        root: 4_467_632_415_761_384_939,
        cube_root: Some(6_019_536_454_011_682_988),
    },
    PrimeInfo {
        modulus: PRIMES_64[2],
        max_log_len: 55,
        root: 90_479_342_105_353_296,
        cube_root: None,
    },
];

/// The transform length shared by all three primes of a family: the
/// smallest of their individual maxima, since a multi-prime convolution
/// needs every prime to support the same length.
pub fn shared_max_log_len_32() -> u32 {
    PRIME_INFO_32.iter().map(|info| info.max_log_len).min().unwrap()
}

/// See [`shared_max_log_len_32`], for the 64-bit family.
pub fn shared_max_log_len_64() -> u32 {
    PRIME_INFO_64.iter().map(|info| info.max_log_len).min().unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::NttField;

    #[test]
    fn roots_have_claimed_order() {
        for info in PRIME_INFO_32 {
            let full = info.modulus.pow(info.root, 1u64 << info.max_log_len);
            assert_eq!(full, 1, "p={}", info.modulus.p);
            let half = info.modulus.pow(info.root, 1u64 << (info.max_log_len - 1));
            assert_ne!(half, 1, "p={}", info.modulus.p);
        }
    }

    #[test]
    fn shared_len_is_the_minimum() {
        assert_eq!(shared_max_log_len_32(), 24);
        assert_eq!(shared_max_log_len_64(), 55);
    }
}
