//! Arbitrary-precision complex numbers (spec.md §3).

use std::fmt;

use apfloat_context::Context;

use crate::apfloat::Apfloat;
use crate::error::ArithmeticError;
use crate::transcendental;

/// `re + im*i`.
#[derive(Clone, Debug, PartialEq)]
pub struct Apcomplex {
    re: Apfloat,
    im: Apfloat,
}

impl Apcomplex {
    /// Build from real and imaginary parts.
    pub fn new(re: Apfloat, im: Apfloat) -> Self {
        Apcomplex { re, im }
    }

    /// A purely real value.
    pub fn from_real(re: Apfloat) -> Self {
        let im = Apfloat::zero(re.context());
        Apcomplex { re, im }
    }

    /// The real part.
    pub fn re(&self) -> &Apfloat {
        &self.re
    }

    /// The imaginary part.
    pub fn im(&self) -> &Apfloat {
        &self.im
    }

    /// The [`Context`] this value was built under.
    pub fn context(&self) -> &Context {
        self.re.context()
    }

    /// Whether both parts are exactly zero.
    pub fn is_zero(&self) -> bool {
        self.re.is_zero() && self.im.is_zero()
    }

    /// `self + other`.
    pub fn add(&self, other: &Apcomplex) -> Apcomplex {
        Apcomplex { re: self.re.add(&other.re), im: self.im.add(&other.im) }
    }

    /// `self - other`.
    pub fn sub(&self, other: &Apcomplex) -> Apcomplex {
        Apcomplex { re: self.re.sub(&other.re), im: self.im.sub(&other.im) }
    }

    /// `-self`.
    pub fn negated(&self) -> Apcomplex {
        Apcomplex { re: self.re.negated(), im: self.im.negated() }
    }

    /// `conj(self) = re - im*i`.
    pub fn conjugate(&self) -> Apcomplex {
        Apcomplex { re: self.re.clone(), im: self.im.negated() }
    }

    /// `self * other = (ac - bd) + (ad + bc)i`.
    pub fn mul(&self, other: &Apcomplex) -> Result<Apcomplex, ArithmeticError> {
        let ac = self.re.mul(&other.re)?;
        let bd = self.im.mul(&other.im)?;
        let ad = self.re.mul(&other.im)?;
        let bc = self.im.mul(&other.re)?;
        Ok(Apcomplex { re: ac.sub(&bd), im: ad.add(&bc) })
    }

    /// `|self|^2 = re^2 + im^2`, avoiding the square root a full modulus needs.
    pub fn norm_squared(&self) -> Result<Apfloat, ArithmeticError> {
        Ok(self.re.mul(&self.re)?.add(&self.im.mul(&self.im)?))
    }

    /// `|self|`.
    pub fn abs(&self) -> Result<Apfloat, ArithmeticError> {
        self.norm_squared()?.sqrt()
    }

    /// `self / other`, via `self * conj(other) / |other|^2`.
    pub fn div(&self, other: &Apcomplex) -> Result<Apcomplex, ArithmeticError> {
        if other.is_zero() {
            return Err(ArithmeticError::DivisionByZero);
        }
        let denom = other.norm_squared()?;
        let numerator = self.mul(&other.conjugate())?;
        Ok(Apcomplex { re: numerator.re.div(&denom)?, im: numerator.im.div(&denom)? })
    }

    /// The argument (angle from the positive real axis), via `atan2(im, re)`.
    pub fn arg(&self) -> Result<Apfloat, ArithmeticError> {
        transcendental::atan2(&self.im, &self.re)
    }

    /// `e^self = e^re * (cos(im) + sin(im)i)`.
    pub fn exp(&self) -> Result<Apcomplex, ArithmeticError> {
        let magnitude = transcendental::exp(&self.re)?;
        let (sin_im, cos_im) = transcendental::sin_cos(&self.im)?;
        Ok(Apcomplex { re: magnitude.mul(&cos_im)?, im: magnitude.mul(&sin_im)? })
    }
}

impl fmt::Display for Apcomplex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.im.signum() < 0 {
            write!(f, "{}-{}i", self.re, self.im.abs())
        } else {
            write!(f, "{}+{}i", self.re, self.im)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::precision::Precision;

    fn ctx() -> Context {
        Context::builder().build()
    }

    #[test]
    fn add_and_sub_act_componentwise() {
        let ctx = ctx();
        let a = Apcomplex::new(Apfloat::from_i64(&ctx, 1), Apfloat::from_i64(&ctx, 2));
        let b = Apcomplex::new(Apfloat::from_i64(&ctx, 3), Apfloat::from_i64(&ctx, 4));
        let sum = a.add(&b);
        assert_eq!(sum.re().approx_f64(), 4.0);
        assert_eq!(sum.im().approx_f64(), 6.0);
    }

    #[test]
    fn mul_matches_schoolbook_complex_multiplication() {
        let ctx = ctx();
        let a = Apcomplex::new(Apfloat::from_i64(&ctx, 1), Apfloat::from_i64(&ctx, 2));
        let b = Apcomplex::new(Apfloat::from_i64(&ctx, 3), Apfloat::from_i64(&ctx, 4));
        let product = a.mul(&b).unwrap();
        assert_eq!(product.re().approx_f64(), -5.0);
        assert_eq!(product.im().approx_f64(), 10.0);
    }

    #[test]
    fn abs_of_three_four_i_is_five() {
        let ctx = ctx();
        let a = Apcomplex::new(
            Apfloat::parse(&ctx, "3", Some(Precision::Finite(20))).unwrap(),
            Apfloat::parse(&ctx, "4", Some(Precision::Finite(20))).unwrap(),
        );
        let magnitude = a.abs().unwrap();
        assert!((magnitude.approx_f64() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn div_by_zero_is_an_error() {
        let ctx = ctx();
        let a = Apcomplex::from_real(Apfloat::from_i64(&ctx, 1));
        let zero = Apcomplex::from_real(Apfloat::zero(&ctx));
        assert!(matches!(a.div(&zero), Err(ArithmeticError::DivisionByZero)));
    }

    #[test]
    fn conjugate_negates_the_imaginary_part() {
        let ctx = ctx();
        let a = Apcomplex::new(Apfloat::from_i64(&ctx, 1), Apfloat::from_i64(&ctx, 2));
        let conj = a.conjugate();
        assert_eq!(conj.im().approx_f64(), -2.0);
    }
}
