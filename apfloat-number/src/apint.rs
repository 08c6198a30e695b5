//! Exact arbitrary-precision integers (spec.md §3).
//!
//! An `Apint` is an [`Apfloat`] constrained to `scale >= ` the number of
//! fractional digits it would otherwise carry -- in this representation,
//! an `Apfloat` whose lsb exponent is nonnegative, so it always denotes a
//! whole number, always at `Precision::Infinite`.

use std::cmp::Ordering;
use std::fmt;

use apfloat_context::Context;

use crate::apfloat::Apfloat;
use crate::error::{ArithmeticError, ParseError};
use crate::precision::Precision;

/// An exact integer.
#[derive(Clone, PartialEq)]
pub struct Apint(Apfloat);

impl Apint {
    /// The canonical zero under `ctx`.
    pub fn zero(ctx: &Context) -> Self {
        Apint(Apfloat::zero(ctx))
    }

    /// Build from a native signed integer.
    pub fn from_i64(ctx: &Context, value: i64) -> Self {
        Apint(Apfloat::from_i64(ctx, value))
    }

    /// Parse an integer numeral; any `.digits`/exponent part is truncated
    /// toward zero.
    pub fn parse(ctx: &Context, text: &str) -> Result<Self, ParseError> {
        let value = Apfloat::parse(ctx, text, Some(Precision::Infinite))?;
        Ok(Apint(value.truncate_to_integer()))
    }

    /// Truncate an [`Apfloat`] toward zero into an `Apint`.
    pub fn from_apfloat_truncated(value: &Apfloat) -> Self {
        Apint(value.truncate_to_integer())
    }

    /// View this integer as an [`Apfloat`].
    pub fn as_apfloat(&self) -> &Apfloat {
        &self.0
    }

    /// Whether this value is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// `-1`, `0`, or `1`.
    pub fn signum(&self) -> i8 {
        self.0.signum()
    }

    /// `self + other`.
    pub fn add(&self, other: &Apint) -> Apint {
        Apint(self.0.add(&other.0))
    }

    /// `self - other`.
    pub fn sub(&self, other: &Apint) -> Apint {
        Apint(self.0.sub(&other.0))
    }

    /// `-self`.
    pub fn negated(&self) -> Apint {
        Apint(self.0.negated())
    }

    /// `|self|`.
    pub fn abs(&self) -> Apint {
        Apint(self.0.abs())
    }

    /// `self * other`, exact.
    pub fn mul(&self, other: &Apint) -> Result<Apint, ArithmeticError> {
        Ok(Apint(self.0.mul(&other.0)?))
    }

    /// Truncating (toward zero) integer division; `self - self.div_trunc(other) * other`
    /// is the remainder.
    pub fn div_trunc(&self, other: &Apint) -> Result<Apint, ArithmeticError> {
        if other.is_zero() {
            return Err(ArithmeticError::DivisionByZero);
        }
        let quotient = self.0.div(&other.0)?;
        Ok(Apint(quotient.truncate_to_integer()))
    }

    /// The remainder of truncating division.
    pub fn rem_trunc(&self, other: &Apint) -> Result<Apint, ArithmeticError> {
        let q = self.div_trunc(other)?;
        Ok(self.sub(&q.mul(other)?))
    }

    /// `self` and `other` compared by value.
    pub fn cmp_value(&self, other: &Apint) -> Ordering {
        self.0.cmp_value(&other.0)
    }

    /// The [`Context`] this value was built under.
    pub fn context(&self) -> &Context {
        self.0.context()
    }
}

impl fmt::Debug for Apint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Apint({:?})", self.0)
    }
}

impl fmt::Display for Apint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> Context {
        Context::builder().build()
    }

    #[test]
    fn parse_truncates_the_fractional_part() {
        let ctx = ctx();
        let value = Apint::parse(&ctx, "123.987").unwrap();
        assert_eq!(value, Apint::from_i64(&ctx, 123));
    }

    #[test]
    fn add_and_mul_match_native_arithmetic() {
        let ctx = ctx();
        let a = Apint::from_i64(&ctx, 7);
        let b = Apint::from_i64(&ctx, 6);
        assert_eq!(a.add(&b), Apint::from_i64(&ctx, 13));
        assert_eq!(a.mul(&b).unwrap(), Apint::from_i64(&ctx, 42));
    }

    #[test]
    fn div_trunc_rounds_toward_zero() {
        let ctx = ctx();
        let a = Apint::from_i64(&ctx, -7);
        let b = Apint::from_i64(&ctx, 2);
        assert_eq!(a.div_trunc(&b).unwrap(), Apint::from_i64(&ctx, -3));
        assert_eq!(a.rem_trunc(&b).unwrap(), Apint::from_i64(&ctx, -1));
    }

    #[test]
    fn div_by_zero_is_an_error() {
        let ctx = ctx();
        let a = Apint::from_i64(&ctx, 1);
        let zero = Apint::zero(&ctx);
        assert!(matches!(a.div_trunc(&zero), Err(ArithmeticError::DivisionByZero)));
    }
}
