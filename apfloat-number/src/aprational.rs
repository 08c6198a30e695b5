//! Exact arbitrary-precision rationals (spec.md §3).
//!
//! `numerator / denominator` is always kept in lowest terms with a
//! strictly positive denominator -- the sign lives on the numerator.

use std::fmt;

use apfloat_context::Context;

use crate::apint::Apint;
use crate::error::ArithmeticError;

/// A rational number, numerator/denominator reduced to lowest terms.
#[derive(Clone, Debug, PartialEq)]
pub struct Aprational {
    numerator: Apint,
    denominator: Apint,
}

impl Aprational {
    /// Build `numerator / denominator`, reducing by their GCD and
    /// normalizing the denominator's sign to positive.
    pub fn new(numerator: Apint, denominator: Apint) -> Result<Self, ArithmeticError> {
        if denominator.is_zero() {
            return Err(ArithmeticError::DivisionByZero);
        }
        let (mut numerator, mut denominator) = (numerator, denominator);
        if denominator.signum() < 0 {
            numerator = numerator.negated();
            denominator = denominator.negated();
        }
        let divisor = gcd(&numerator.abs(), &denominator)?;
        if !divisor.is_zero() && divisor != Apint::from_i64(divisor.context(), 1) {
            numerator = numerator.div_trunc(&divisor)?;
            denominator = denominator.div_trunc(&divisor)?;
        }
        Ok(Aprational { numerator, denominator })
    }

    /// Build an integer-valued rational (`n / 1`).
    pub fn from_apint(value: Apint) -> Self {
        let one = Apint::from_i64(value.context(), 1);
        Aprational { numerator: value, denominator: one }
    }

    /// The reduced numerator.
    pub fn numerator(&self) -> &Apint {
        &self.numerator
    }

    /// The reduced, strictly positive denominator.
    pub fn denominator(&self) -> &Apint {
        &self.denominator
    }

    /// `self + other`.
    pub fn add(&self, other: &Aprational) -> Result<Aprational, ArithmeticError> {
        let numerator = self
            .numerator
            .mul(&other.denominator)?
            .add(&other.numerator.mul(&self.denominator)?);
        let denominator = self.denominator.mul(&other.denominator)?;
        Aprational::new(numerator, denominator)
    }

    /// `self - other`.
    pub fn sub(&self, other: &Aprational) -> Result<Aprational, ArithmeticError> {
        self.add(&other.negated())
    }

    /// `-self`.
    pub fn negated(&self) -> Aprational {
        Aprational { numerator: self.numerator.negated(), denominator: self.denominator.clone() }
    }

    /// `self * other`.
    pub fn mul(&self, other: &Aprational) -> Result<Aprational, ArithmeticError> {
        let numerator = self.numerator.mul(&other.numerator)?;
        let denominator = self.denominator.mul(&other.denominator)?;
        Aprational::new(numerator, denominator)
    }

    /// `self / other`.
    pub fn div(&self, other: &Aprational) -> Result<Aprational, ArithmeticError> {
        if other.numerator.is_zero() {
            return Err(ArithmeticError::DivisionByZero);
        }
        let numerator = self.numerator.mul(&other.denominator)?;
        let denominator = self.denominator.mul(&other.numerator)?;
        Aprational::new(numerator, denominator)
    }

    /// Whether this value is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.numerator.is_zero()
    }

    /// The [`Context`] this value was built under.
    pub fn context(&self) -> &Context {
        self.numerator.context()
    }
}

/// The Euclidean algorithm over [`Apint`]: `num_integer::Integer::gcd` needs
/// the `Integer` trait, which `Apint` doesn't implement (it has no native
/// width to hang the trait's required bit-level operations off of), so
/// reduction uses the textbook recursive remainder loop directly instead.
fn gcd(a: &Apint, b: &Apint) -> Result<Apint, ArithmeticError> {
    let mut a = a.abs();
    let mut b = b.abs();
    while !b.is_zero() {
        let remainder = a.rem_trunc(&b)?;
        a = b;
        b = remainder;
    }
    Ok(a)
}

impl fmt::Display for Aprational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> Context {
        Context::builder().build()
    }

    #[test]
    fn new_reduces_to_lowest_terms() {
        let ctx = ctx();
        let r = Aprational::new(Apint::from_i64(&ctx, 6), Apint::from_i64(&ctx, 8)).unwrap();
        assert_eq!(*r.numerator(), Apint::from_i64(&ctx, 3));
        assert_eq!(*r.denominator(), Apint::from_i64(&ctx, 4));
    }

    #[test]
    fn new_normalizes_a_negative_denominator() {
        let ctx = ctx();
        let r = Aprational::new(Apint::from_i64(&ctx, 1), Apint::from_i64(&ctx, -2)).unwrap();
        assert_eq!(r.numerator().signum(), -1);
        assert_eq!(r.denominator().signum(), 1);
    }

    #[test]
    fn zero_denominator_is_an_error() {
        let ctx = ctx();
        assert!(matches!(
            Aprational::new(Apint::from_i64(&ctx, 1), Apint::zero(&ctx)),
            Err(ArithmeticError::DivisionByZero)
        ));
    }

    #[test]
    fn add_matches_schoolbook_fraction_addition() {
        let ctx = ctx();
        let a = Aprational::new(Apint::from_i64(&ctx, 1), Apint::from_i64(&ctx, 2)).unwrap();
        let b = Aprational::new(Apint::from_i64(&ctx, 1), Apint::from_i64(&ctx, 3)).unwrap();
        let sum = a.add(&b).unwrap();
        assert_eq!(*sum.numerator(), Apint::from_i64(&ctx, 5));
        assert_eq!(*sum.denominator(), Apint::from_i64(&ctx, 6));
    }

    #[test]
    fn mul_reduces_the_result() {
        let ctx = ctx();
        let a = Aprational::new(Apint::from_i64(&ctx, 2), Apint::from_i64(&ctx, 3)).unwrap();
        let b = Aprational::new(Apint::from_i64(&ctx, 3), Apint::from_i64(&ctx, 4)).unwrap();
        let product = a.mul(&b).unwrap();
        assert_eq!(*product.numerator(), Apint::from_i64(&ctx, 1));
        assert_eq!(*product.denominator(), Apint::from_i64(&ctx, 2));
    }
}
