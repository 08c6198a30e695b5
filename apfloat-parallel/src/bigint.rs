//! A minimal signed, arbitrary-precision integer used only by
//! [`crate::chudnovsky`] to carry the P/Q/T binary-splitting triple.
//!
//! This is deliberately not [`apfloat_number::Apint`] (that crate depends on
//! `apfloat-parallel` to get its own series summation, so the reverse
//! dependency would be circular -- see `DESIGN.md`). It stores its
//! magnitude little-endian in base [`RADIX`], the same convention
//! [`apfloat_convolution::multiply_mantissas`] expects, and a caller that
//! wants an [`apfloat_number::Apfloat`] out the other end can build a
//! [`apfloat_context::Context`] with `default_radix` set to `RADIX` and feed
//! [`BigInt::into_little_endian_digits`] straight in as mantissa digits.

use apfloat_context::Context;

use crate::error::ParallelError;

/// The internal limb radix: `10^9`, the largest power of ten that still
/// leaves headroom for a schoolbook carry accumulator in `u64` and keeps a
/// decimal reading of the result a matter of splicing fixed-width limbs.
pub const RADIX: u32 = 1_000_000_000;

/// A signed integer, magnitude stored little-endian in base [`RADIX`] with
/// no leading (most significant) zero limbs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BigInt {
    negative: bool,
    magnitude: Vec<u32>,
}

impl BigInt {
    /// The additive identity.
    pub fn zero() -> Self {
        BigInt {
            negative: false,
            magnitude: vec![0],
        }
    }

    /// `1`.
    pub fn one() -> Self {
        BigInt::from_u64(1)
    }

    /// Build from a nonnegative native integer.
    pub fn from_u64(mut value: u64) -> Self {
        if value == 0 {
            return BigInt::zero();
        }
        let mut limbs = Vec::new();
        while value > 0 {
            limbs.push((value % RADIX as u64) as u32);
            value /= RADIX as u64;
        }
        BigInt {
            negative: false,
            magnitude: limbs,
        }
    }

    /// Build from a nonnegative `u128`, for leaf values (e.g. `a^3`) that
    /// outgrow `u64` before the first convolution call ever happens.
    pub fn from_u128(mut value: u128) -> Self {
        if value == 0 {
            return BigInt::zero();
        }
        let mut limbs = Vec::new();
        while value > 0 {
            limbs.push((value % RADIX as u128) as u32);
            value /= RADIX as u128;
        }
        BigInt {
            negative: false,
            magnitude: limbs,
        }
    }

    /// Build from a signed native integer.
    pub fn from_i64(value: i64) -> Self {
        let mut out = BigInt::from_u64(value.unsigned_abs());
        out.negative = value < 0 && !out.is_zero();
        out
    }

    /// Whether this value is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.magnitude.len() == 1 && self.magnitude[0] == 0
    }

    /// The stored sign; always `false` for zero.
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// `-self`.
    pub fn negate(&self) -> Self {
        let mut out = self.clone();
        if !out.is_zero() {
            out.negative = !out.negative;
        }
        out
    }

    /// `self + other`.
    pub fn add(&self, other: &BigInt) -> BigInt {
        if self.negative == other.negative {
            BigInt {
                negative: self.negative,
                magnitude: magnitude_add(&self.magnitude, &other.magnitude),
            }
            .normalized()
        } else if magnitude_cmp(&self.magnitude, &other.magnitude) != std::cmp::Ordering::Less {
            BigInt {
                negative: self.negative,
                magnitude: magnitude_sub(&self.magnitude, &other.magnitude),
            }
            .normalized()
        } else {
            BigInt {
                negative: other.negative,
                magnitude: magnitude_sub(&other.magnitude, &self.magnitude),
            }
            .normalized()
        }
    }

    /// `self - other`.
    pub fn sub(&self, other: &BigInt) -> BigInt {
        self.add(&other.negate())
    }

    /// `self * other`, routed through the shared convolution engine for
    /// large operands and a direct schoolbook pass for small ones (the
    /// convolution crate already makes that call internally).
    pub fn mul(&self, other: &BigInt, ctx: &Context) -> Result<BigInt, ParallelError> {
        if self.is_zero() || other.is_zero() {
            return Ok(BigInt::zero());
        }
        let magnitude =
            apfloat_convolution::multiply_mantissas(ctx, &self.magnitude, &other.magnitude, RADIX)?;
        Ok(BigInt {
            negative: self.negative != other.negative,
            magnitude,
        }
        .normalized())
    }

    /// `self * scalar`, for the small multipliers that show up constantly
    /// in a binary-splitting leaf (e.g. `6*k-5`) without paying for a full
    /// convolution call.
    pub fn mul_u64(&self, scalar: u64) -> BigInt {
        if self.is_zero() || scalar == 0 {
            return BigInt::zero();
        }
        let mut carry: u128 = 0;
        let mut out = Vec::with_capacity(self.magnitude.len() + 2);
        for &limb in &self.magnitude {
            let product = limb as u128 * scalar as u128 + carry;
            out.push((product % RADIX as u128) as u32);
            carry = product / RADIX as u128;
        }
        while carry > 0 {
            out.push((carry % RADIX as u128) as u32);
            carry /= RADIX as u128;
        }
        BigInt {
            negative: self.negative,
            magnitude: out,
        }
        .normalized()
    }

    /// Drop this value into its little-endian, base-[`RADIX`] limbs, along
    /// with whether it was negative.
    pub fn into_little_endian_digits(self) -> (bool, Vec<u32>) {
        (self.negative, self.magnitude)
    }

    fn normalized(mut self) -> Self {
        while self.magnitude.len() > 1 && *self.magnitude.last().unwrap() == 0 {
            self.magnitude.pop();
        }
        if self.is_zero() {
            self.negative = false;
        }
        self
    }
}

fn magnitude_cmp(a: &[u32], b: &[u32]) -> std::cmp::Ordering {
    if a.len() != b.len() {
        return a.len().cmp(&b.len());
    }
    for (da, db) in a.iter().rev().zip(b.iter().rev()) {
        match da.cmp(db) {
            std::cmp::Ordering::Equal => continue,
            other => return other,
        }
    }
    std::cmp::Ordering::Equal
}

/// `a + b`, both little-endian base-[`RADIX`] magnitudes.
fn magnitude_add(a: &[u32], b: &[u32]) -> Vec<u32> {
    let mut out = Vec::with_capacity(a.len().max(b.len()) + 1);
    let mut carry: u64 = 0;
    for i in 0..a.len().max(b.len()) {
        let sum = carry + a.get(i).copied().unwrap_or(0) as u64 + b.get(i).copied().unwrap_or(0) as u64;
        out.push((sum % RADIX as u64) as u32);
        carry = sum / RADIX as u64;
    }
    if carry > 0 {
        out.push(carry as u32);
    }
    out
}

/// `a - b`, requires `a >= b` as base-[`RADIX`] magnitudes.
fn magnitude_sub(a: &[u32], b: &[u32]) -> Vec<u32> {
    let mut out = Vec::with_capacity(a.len());
    let mut borrow: i64 = 0;
    for i in 0..a.len() {
        let mut diff = a[i] as i64 - borrow - b.get(i).copied().unwrap_or(0) as i64;
        if diff < 0 {
            diff += RADIX as i64;
            borrow = 1;
        } else {
            borrow = 0;
        }
        out.push(diff as u32);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_and_subtracts_across_sign() {
        let a = BigInt::from_i64(-7);
        let b = BigInt::from_i64(12);
        assert_eq!(a.add(&b), BigInt::from_i64(5));
        assert_eq!(a.sub(&b), BigInt::from_i64(-19));
    }

    #[test]
    fn mul_u64_matches_native_multiplication() {
        let a = BigInt::from_u64(123_456_789_012);
        let product = a.mul_u64(37);
        let (negative, digits) = product.into_little_endian_digits();
        assert!(!negative);
        let mut value: u128 = 0;
        for &limb in digits.iter().rev() {
            value = value * RADIX as u128 + limb as u128;
        }
        assert_eq!(value, 123_456_789_012u128 * 37);
    }

    #[test]
    fn mul_matches_mul_u64_for_small_operands() {
        let ctx = Context::builder().build();
        let a = BigInt::from_u64(999_999_999_999);
        let via_convolution = a.mul(&BigInt::from_u64(41), &ctx).unwrap();
        let via_scalar = a.mul_u64(41);
        assert_eq!(via_convolution, via_scalar);
    }

    #[test]
    fn negate_and_zero() {
        let zero = BigInt::zero();
        assert!(!zero.negate().is_negative());
        let one = BigInt::one();
        assert!(one.negate().is_negative());
        assert!(one.negate().negate() == one);
    }

    #[test]
    fn carries_propagate_past_a_single_limb() {
        let a = BigInt::from_u64(RADIX as u64 - 1);
        let b = BigInt::from_u64(2);
        let (negative, digits) = a.add(&b).into_little_endian_digits();
        assert!(!negative);
        assert_eq!(digits, vec![1, 1]);
    }
}
