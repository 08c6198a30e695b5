//! The real floating-point number type (spec.md §3).
//!
//! A value is `sign * 0.mantissa[0]mantissa[1]... * radix^scale`: `scale` is
//! the place value of the leading mantissa digit (so a normalized mantissa
//! always has a nonzero leading digit), and `mantissa.len()` never exceeds
//! `precision.digits(_)`. Equivalently, writing `exponent = scale -
//! mantissa.len()`, the value is `sign * (Σ mantissa_lsb[i] * radix^i) *
//! radix^exponent` -- the representation [`apfloat_convolution`] and
//! [`crate::arithmetic`] actually operate on.

use std::cmp::Ordering;
use std::fmt;

use apfloat_context::Context;
use apfloat_storage::StorageHandle;

use crate::arithmetic::{magnitude_add, magnitude_cmp, magnitude_sub, trim_high_zeros};
use crate::digits;
use crate::error::{ArithmeticError, ParseError};
use crate::precision::{Precision, ITERATION_GUARD_DIGITS, MULTIPLY_GUARD_DIGITS};

/// An arbitrary-precision real number.
#[derive(Clone)]
pub struct Apfloat {
    sign: i8,
    radix: u32,
    scale: i64,
    precision: Precision,
    mantissa: StorageHandle<u32>,
    ctx: Context,
}

impl Apfloat {
    /// The canonical zero under `ctx`.
    pub fn zero(ctx: &Context) -> Self {
        Apfloat {
            sign: 0,
            radix: ctx.default_radix(),
            scale: 0,
            precision: Precision::Infinite,
            mantissa: digits::empty(ctx),
            ctx: ctx.clone(),
        }
    }

    /// Build from a native signed integer, exact (`Infinite` precision).
    pub fn from_i64(ctx: &Context, value: i64) -> Self {
        if value == 0 {
            return Apfloat::zero(ctx);
        }
        let radix = ctx.default_radix();
        let msb = digits::u128_to_digits(value.unsigned_abs() as u128, radix);
        let scale = msb.len() as i64;
        Apfloat {
            sign: if value < 0 { -1 } else { 1 },
            radix,
            scale,
            precision: Precision::Infinite,
            mantissa: digits::from_digits(ctx, &msb),
            ctx: ctx.clone(),
        }
    }

    /// Build a small exact integer with an explicit declared precision
    /// (unlike [`Self::from_i64`], which always declares `Infinite`) --
    /// used internally to seed Newton-iteration constants at whatever
    /// working precision the iteration is running at.
    pub(crate) fn parse_int(ctx: &Context, value: i64, precision: Precision) -> Self {
        let mut out = Apfloat::from_i64(ctx, value);
        out.precision = precision;
        out
    }

    /// Parse a numeral (`[sign]digits[.digits][(e|E)[sign]digits]`) in
    /// `ctx`'s default radix. `precision` defaults to the number of
    /// significant digits actually written.
    pub fn parse(ctx: &Context, text: &str, precision: Option<Precision>) -> Result<Self, ParseError> {
        let radix = ctx.default_radix();
        let text = text.trim();
        if text.is_empty() {
            return Err(ParseError::Empty);
        }

        let (sign, rest) = match text.as_bytes()[0] {
            b'-' => (-1i8, &text[1..]),
            b'+' => (1i8, &text[1..]),
            _ => (1i8, text),
        };
        if rest.is_empty() {
            return Err(ParseError::Malformed(text.to_string()));
        }

        let (mantissa_part, exponent_part) = match rest.find(['e', 'E']) {
            Some(idx) => (&rest[..idx], Some(&rest[idx + 1..])),
            None => (rest, None),
        };
        let extra_exponent: i64 = match exponent_part {
            Some(e) if !e.is_empty() => e
                .parse::<i64>()
                .map_err(|_| ParseError::Malformed(text.to_string()))?,
            Some(_) => return Err(ParseError::Malformed(text.to_string())),
            None => 0,
        };

        let (int_part, frac_part) = match mantissa_part.find('.') {
            Some(idx) => (&mantissa_part[..idx], &mantissa_part[idx + 1..]),
            None => (mantissa_part, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(ParseError::Malformed(text.to_string()));
        }

        let mut digits_msb = Vec::with_capacity(int_part.len() + frac_part.len());
        for ch in int_part.chars().chain(frac_part.chars()) {
            let d = ch
                .to_digit(radix)
                .ok_or(ParseError::InvalidDigit { ch, radix })?;
            digits_msb.push(d);
        }

        let point_position = int_part.chars().count() as i64;
        let first_nonzero = digits_msb.iter().position(|&d| d != 0);
        let Some(first_nonzero) = first_nonzero else {
            return Ok(Apfloat::zero(ctx));
        };
        let trimmed: Vec<u32> = digits_msb[first_nonzero..].to_vec();

        let scale = point_position - first_nonzero as i64 + extra_exponent;
        let declared_precision = precision.unwrap_or(Precision::Finite(trimmed.len() as u64));

        Ok(Apfloat {
            sign,
            radix,
            scale,
            precision: declared_precision,
            mantissa: digits::from_digits(ctx, &trimmed),
            ctx: ctx.clone(),
        })
    }

    /// Whether this value is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.sign == 0
    }

    /// `-1`, `0`, or `1`.
    pub fn signum(&self) -> i8 {
        self.sign
    }

    /// The radix this value's digits are expressed in.
    pub fn radix(&self) -> u32 {
        self.radix
    }

    /// The place value of the leading mantissa digit.
    pub fn scale(&self) -> i64 {
        self.scale
    }

    /// The declared number of significant mantissa digits.
    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// The [`Context`] this value was built under.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    fn mantissa_msb(&self) -> Vec<u32> {
        digits::read_all(&self.mantissa)
    }

    /// The lsb exponent: the place value of the least significant mantissa
    /// digit, i.e. `scale - mantissa.len()`.
    fn exponent(&self) -> i64 {
        self.scale - self.mantissa.len() as i64
    }

    fn from_parts(ctx: &Context, sign: i8, scale: i64, precision: Precision, mantissa_msb: Vec<u32>) -> Self {
        if sign == 0 || mantissa_msb.is_empty() {
            return Apfloat::zero(ctx);
        }
        Apfloat {
            sign,
            radix: ctx.default_radix(),
            scale,
            precision,
            mantissa: digits::from_digits(ctx, &mantissa_msb),
            ctx: ctx.clone(),
        }
    }

    /// `self + other`.
    pub fn add(&self, other: &Apfloat) -> Apfloat {
        if self.is_zero() {
            return other.clone();
        }
        if other.is_zero() {
            return self.clone();
        }

        let target_precision = self.precision.min(other.precision);
        let (lsb, scale, sign) = add_aligned(
            &self.ctx,
            self.sign,
            self.scale,
            self.exponent(),
            &digits::to_lsb(&self.mantissa_msb()),
            other.sign,
            other.scale,
            other.exponent(),
            &digits::to_lsb(&other.mantissa_msb()),
            target_precision,
        );
        let msb: Vec<u32> = lsb.into_iter().rev().collect();
        let mut result = Apfloat::from_parts(&self.ctx, sign, scale, target_precision, msb);
        if let Precision::Finite(p) = target_precision {
            result.truncate_to(p);
        }
        result
    }

    /// `self - other`.
    pub fn sub(&self, other: &Apfloat) -> Apfloat {
        self.add(&other.negated())
    }

    /// `-self`.
    pub fn negated(&self) -> Apfloat {
        let mut out = self.clone();
        out.sign = -out.sign;
        out
    }

    /// `|self|`.
    pub fn abs(&self) -> Apfloat {
        let mut out = self.clone();
        if out.sign < 0 {
            out.sign = 1;
        }
        out
    }

    /// `self * other`.
    pub fn mul(&self, other: &Apfloat) -> Result<Apfloat, ArithmeticError> {
        if self.is_zero() || other.is_zero() {
            return Ok(Apfloat::zero(&self.ctx));
        }
        let sign = self.sign * other.sign;
        let lsb_a = digits::to_lsb(&self.mantissa_msb());
        let lsb_b = digits::to_lsb(&other.mantissa_msb());
        let product_lsb =
            apfloat_convolution::multiply_mantissas(&self.ctx, &lsb_a, &lsb_b, self.radix)?;
        let exponent = self.exponent() + other.exponent();
        let mut msb: Vec<u32> = product_lsb.into_iter().rev().collect();
        trim_leading_zero_digits(&mut msb);
        let scale = exponent + msb.len() as i64;

        let target_precision = self.precision.min(other.precision);
        let mut result = Apfloat::from_parts(&self.ctx, sign, scale, target_precision, msb);
        if let Precision::Finite(p) = target_precision {
            result.truncate_to(p + MULTIPLY_GUARD_DIGITS);
            result.precision = target_precision;
        }
        Ok(result)
    }

    /// `self / other`, via Newton's method on the reciprocal
    /// (`y_{n+1} = y_n (2 - other y_n)`), doubling correct digits each step.
    pub fn div(&self, other: &Apfloat) -> Result<Apfloat, ArithmeticError> {
        if other.is_zero() {
            return Err(ArithmeticError::DivisionByZero);
        }
        if self.is_zero() {
            return Ok(Apfloat::zero(&self.ctx));
        }
        let target_precision = self.precision.min(other.precision);
        let working_precision = match target_precision {
            Precision::Finite(_) => target_precision.extended(ITERATION_GUARD_DIGITS).digits(64),
            Precision::Infinite => {
                // Both operands are exact (e.g. `Apint::div_trunc`); a fixed
                // fallback would truncate the reciprocal before the
                // quotient's own integer digits are pinned down, leaving
                // Newton-iteration noise in `truncate_to_integer`'s result.
                // The quotient's magnitude is bounded by `self.scale -
                // other.scale`, so that many significant digits (plus
                // guard) covers it regardless of either operand's own
                // digit count.
                let quotient_scale = (self.scale - other.scale).max(0) as u64;
                quotient_scale
                    .max(self.mantissa.len() as u64)
                    .max(other.mantissa.len() as u64)
                    + ITERATION_GUARD_DIGITS
            }
        };
        let reciprocal = newton_reciprocal(other, working_precision)?;
        let mut result = self.mul(&reciprocal)?;
        result.precision = target_precision;
        if let Precision::Finite(p) = target_precision {
            result.truncate_to(p);
        }
        Ok(result)
    }

    /// Square root, via Newton's method on the inverse square root
    /// (`y_{n+1} = y_n (3 - x y_n^2) / 2`), then one final multiply by `x`.
    pub fn sqrt(&self) -> Result<Apfloat, ArithmeticError> {
        if self.sign < 0 {
            return Err(ArithmeticError::NegativeDomain { op: "sqrt" });
        }
        if self.is_zero() {
            return Ok(Apfloat::zero(&self.ctx));
        }
        let working_precision = self.precision.extended(ITERATION_GUARD_DIGITS).digits(64);
        let inv_sqrt = newton_inverse_sqrt(self, working_precision)?;
        let mut result = self.mul(&inv_sqrt)?;
        result.precision = self.precision;
        if let Precision::Finite(p) = self.precision {
            result.truncate_to(p);
        }
        Ok(result)
    }

    /// Drop any fractional digits (toward zero), returning an exact integer
    /// value with `Infinite` precision -- the conversion [`crate::Apint`]
    /// builds on.
    pub(crate) fn truncate_to_integer(&self) -> Apfloat {
        if self.is_zero() {
            return Apfloat::zero(&self.ctx);
        }
        let exponent = self.exponent();
        if exponent >= 0 {
            return Apfloat::from_parts(&self.ctx, self.sign, self.scale, Precision::Infinite, self.mantissa_msb());
        }
        let mut lsb = digits::to_lsb(&self.mantissa_msb());
        let drop = (-exponent) as usize;
        if drop >= lsb.len() {
            return Apfloat::zero(&self.ctx);
        }
        lsb.drain(0..drop);
        let mut msb: Vec<u32> = lsb.into_iter().rev().collect();
        trim_leading_zero_digits(&mut msb);
        Apfloat::from_parts(&self.ctx, self.sign, self.scale, Precision::Infinite, msb)
    }

    /// Truncate the stored mantissa (no rounding) down to `precision`
    /// digits, without altering `scale`.
    pub(crate) fn truncate_to(&mut self, precision: u64) {
        let mut msb = self.mantissa_msb();
        digits::truncate(&mut msb, precision);
        self.mantissa = digits::from_digits(&self.ctx, &msb);
    }

    /// A lossy `f64` approximation, used only to seed a Newton iteration.
    pub(crate) fn approx_f64(&self) -> f64 {
        if self.is_zero() {
            return 0.0;
        }
        let msb = self.mantissa_msb();
        let used = msb.len().min(15);
        let mut value = 0f64;
        for &d in &msb[..used] {
            value = value * self.radix as f64 + d as f64;
        }
        value *= (self.radix as f64).powi((self.scale - used as i64) as i32);
        if self.sign < 0 {
            -value
        } else {
            value
        }
    }

    /// Compare two values' magnitudes and signs (total order on the real
    /// line, `NaN`-free by construction).
    pub fn cmp_value(&self, other: &Apfloat) -> Ordering {
        if self.sign != other.sign {
            return self.sign.cmp(&other.sign);
        }
        if self.sign == 0 {
            return Ordering::Equal;
        }
        let by_scale = self.scale.cmp(&other.scale);
        let magnitude_order = if by_scale != Ordering::Equal {
            by_scale
        } else {
            digits::cmp_prefix(&self.mantissa_msb(), &other.mantissa_msb())
        };
        if self.sign < 0 {
            magnitude_order.reverse()
        } else {
            magnitude_order
        }
    }
}

impl PartialEq for Apfloat {
    fn eq(&self, other: &Self) -> bool {
        self.cmp_value(other) == Ordering::Equal
    }
}

impl fmt::Debug for Apfloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Apfloat {{ sign: {}, scale: {}, precision: {:?}, mantissa: {:?} }}",
            self.sign,
            self.scale,
            self.precision,
            self.mantissa_msb()
        )
    }
}

/// How far `scale` may stray from the digit string's own span (either past
/// its end, as leading-zero padding before the point, or past its start, as
/// trailing-zero padding before the point) before rendering switches to
/// exponent form (spec.md §6: "exponent form chosen when the magnitude
/// differs from the natural scale by a configurable threshold").
const FIXED_NOTATION_PADDING: i64 = 21;

impl fmt::Display for Apfloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        let msb = self.mantissa_msb();
        let digits: Vec<char> = msb.iter().map(|d| std::char::from_digit(*d, self.radix).unwrap_or('?')).collect();
        let digit_count = digits.len() as i64;
        if self.sign < 0 {
            write!(f, "-")?;
        }
        if self.scale > 0 && self.scale <= digit_count {
            // The point lands inside the digit string: `digits[..scale]`
            // is the integer part, the rest fractional.
            let point = self.scale as usize;
            for c in &digits[..point] {
                write!(f, "{c}")?;
            }
            write!(f, ".")?;
            for c in &digits[point..] {
                write!(f, "{c}")?;
            }
            return Ok(());
        }
        if self.scale <= 0 && -self.scale <= FIXED_NOTATION_PADDING {
            write!(f, "0.")?;
            for _ in 0..(-self.scale) {
                write!(f, "0")?;
            }
            for c in &digits {
                write!(f, "{c}")?;
            }
            return Ok(());
        }
        if self.scale > digit_count && self.scale - digit_count <= FIXED_NOTATION_PADDING {
            for c in &digits {
                write!(f, "{c}")?;
            }
            for _ in 0..(self.scale - digit_count) {
                write!(f, "0")?;
            }
            return Ok(());
        }
        // Past the padding threshold: standard scientific form, one digit
        // before the point, exponent counted from that leading digit.
        write!(f, "{}", digits[0])?;
        if digits.len() > 1 {
            write!(f, ".")?;
            for c in &digits[1..] {
                write!(f, "{c}")?;
            }
        }
        write!(f, "e{}", self.scale - 1)
    }
}

fn trim_leading_zero_digits(msb: &mut Vec<u32>) {
    let mut drop = 0;
    while drop < msb.len().saturating_sub(1) && msb[drop] == 0 {
        drop += 1;
    }
    msb.drain(0..drop);
}

/// Align two signed lsb magnitudes at a common exponent and add or subtract
/// them as the signs dictate, applying the precision-guard shortcut when
/// one operand's exponent puts it entirely below the result's significant
/// digits.
#[allow(clippy::too_many_arguments)]
fn add_aligned(
    ctx: &Context,
    sign_a: i8,
    scale_a: i64,
    exp_a: i64,
    lsb_a: &[u32],
    sign_b: i8,
    scale_b: i64,
    exp_b: i64,
    lsb_b: &[u32],
    target_precision: Precision,
) -> (Vec<u32>, i64, i8) {
    let radix = ctx.default_radix();
    let cap = target_precision.digits(u64::MAX / 2) + MULTIPLY_GUARD_DIGITS;

    let scale_gap = (scale_a - scale_b).unsigned_abs();
    if scale_gap > cap {
        // The smaller-scale operand's leading digit already falls below
        // the guard band under the dominant operand's target precision;
        // its contribution cannot affect the result.
        return if scale_a >= scale_b {
            (lsb_a.to_vec(), scale_a, sign_a)
        } else {
            (lsb_b.to_vec(), scale_b, sign_b)
        };
    }

    let common_exp = exp_a.min(exp_b);
    let mut a = lsb_a.to_vec();
    let mut b = lsb_b.to_vec();
    digits::pad_low(&mut a, (exp_a - common_exp) as usize);
    digits::pad_low(&mut b, (exp_b - common_exp) as usize);
    let len = a.len().max(b.len());
    digits::pad_high_to_len(&mut a, len);
    digits::pad_high_to_len(&mut b, len);

    if sign_a == sign_b {
        let mut sum = magnitude_add(&a, &b, radix);
        trim_high_zeros(&mut sum);
        let scale = common_exp + sum.len() as i64;
        (sum, scale, sign_a)
    } else {
        match magnitude_cmp(&a, &b) {
            Ordering::Equal => (vec![0], 0, 0),
            Ordering::Greater => {
                let mut diff = magnitude_sub(&a, &b, radix);
                trim_high_zeros(&mut diff);
                let scale = common_exp + diff.len() as i64;
                (diff, scale, sign_a)
            }
            Ordering::Less => {
                let mut diff = magnitude_sub(&b, &a, radix);
                trim_high_zeros(&mut diff);
                let scale = common_exp + diff.len() as i64;
                (diff, scale, sign_b)
            }
        }
    }
}

/// Build an `Apfloat` from a lossy native-`f64` approximation, extracting
/// `digit_count` digits of the target radix directly (rather than
/// round-tripping through a decimal string, which would reject digits like
/// `8`/`9` under a radix below 10). Only ever used to seed a Newton
/// iteration that then corrects itself.
pub(crate) fn seed_from_f64(ctx: &Context, value: f64, digit_count: usize) -> Apfloat {
    if value == 0.0 || !value.is_finite() {
        return Apfloat::zero(ctx);
    }
    let sign = if value < 0.0 { -1i8 } else { 1i8 };
    let radix = ctx.default_radix() as f64;
    let mut v = value.abs();
    let mut scale = 0i64;
    while v >= radix {
        v /= radix;
        scale += 1;
    }
    while v < 1.0 {
        v *= radix;
        scale -= 1;
    }
    let mut msb = Vec::with_capacity(digit_count);
    for _ in 0..digit_count {
        let d = (v.floor() as u32).min(ctx.default_radix() - 1);
        msb.push(d);
        v = (v - d as f64) * radix;
    }
    trim_leading_zero_digits(&mut msb);
    Apfloat::from_parts(ctx, sign, scale + 1, Precision::Finite(msb.len() as u64), msb)
}

/// `1/2` to `working_precision` digits, via division rather than a decimal
/// literal (`1/2` has no terminating expansion in an odd radix).
fn one_half(ctx: &Context, working_precision: u64) -> Result<Apfloat, ArithmeticError> {
    let one = Apfloat::parse_int(ctx, 1, Precision::Finite(working_precision));
    let two = Apfloat::parse_int(ctx, 2, Precision::Finite(working_precision));
    one.div(&two)
}

fn newton_reciprocal(value: &Apfloat, working_precision: u64) -> Result<Apfloat, ArithmeticError> {
    let ctx = value.context();
    let seed_precision = 15u64.min(working_precision);
    let mut guess = seed_from_f64(ctx, 1.0 / value.approx_f64(), seed_precision as usize);
    let two = Apfloat::parse_int(ctx, 2, Precision::Infinite);
    let mut precision = seed_precision;
    while precision < working_precision {
        precision = (precision * 2).min(working_precision);
        guess.precision = Precision::Finite(precision);
        let correction = two.sub(&value.mul(&guess)?.with_precision(Precision::Finite(precision)));
        guess = guess.mul(&correction.with_precision(Precision::Finite(precision)))?;
        guess.precision = Precision::Finite(precision);
    }
    Ok(guess)
}

fn newton_inverse_sqrt(value: &Apfloat, working_precision: u64) -> Result<Apfloat, ArithmeticError> {
    let ctx = value.context();
    let seed_precision = 15u64.min(working_precision);
    let mut guess = seed_from_f64(ctx, 1.0 / value.approx_f64().sqrt(), seed_precision as usize);
    let three = Apfloat::parse_int(ctx, 3, Precision::Infinite);
    let mut precision = seed_precision;
    while precision < working_precision {
        precision = (precision * 2).min(working_precision);
        let half = one_half(ctx, precision)?;
        guess.precision = Precision::Finite(precision);
        let squared = guess.mul(&guess)?.with_precision(Precision::Finite(precision));
        let inner = three.sub(&value.mul(&squared)?.with_precision(Precision::Finite(precision)));
        guess = guess
            .mul(&inner.with_precision(Precision::Finite(precision)))?
            .mul(&half)?;
        guess.precision = Precision::Finite(precision);
    }
    Ok(guess)
}

impl Apfloat {
    /// Reinterpret this value's declared precision without touching its
    /// stored digits (used internally by the Newton iterations' doubling
    /// schedule, where the mantissa already carries ample guard digits).
    pub(crate) fn with_precision(mut self, precision: Precision) -> Apfloat {
        self.precision = precision;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> Context {
        Context::builder().build()
    }

    #[test]
    fn parses_and_displays_round_trip_sign() {
        let ctx = ctx();
        let value = Apfloat::parse(&ctx, "-123.456", None).unwrap();
        assert_eq!(value.signum(), -1);
        assert_eq!(value.scale(), 3);
    }

    #[test]
    fn parse_rejects_empty_input() {
        assert!(matches!(Apfloat::parse(&ctx(), "", None), Err(ParseError::Empty)));
    }

    #[test]
    fn parse_with_exponent_shifts_scale() {
        let ctx = ctx();
        let value = Apfloat::parse(&ctx, "1.5e3", None).unwrap();
        assert_eq!(value.scale(), 1 + 3);
    }

    #[test]
    fn add_matches_native_arithmetic_for_small_values() {
        let ctx = ctx();
        let a = Apfloat::from_i64(&ctx, 123);
        let b = Apfloat::from_i64(&ctx, 45);
        let sum = a.add(&b);
        assert_eq!(sum.approx_f64(), 168.0);
    }

    #[test]
    fn sub_of_equal_values_is_zero() {
        let ctx = ctx();
        let a = Apfloat::from_i64(&ctx, 77);
        assert!(a.sub(&a).is_zero());
    }

    #[test]
    fn mul_matches_native_arithmetic_for_small_values() {
        let ctx = ctx();
        let a = Apfloat::from_i64(&ctx, 12);
        let b = Apfloat::from_i64(&ctx, 11);
        let product = a.mul(&b).unwrap();
        assert_eq!(product.approx_f64(), 132.0);
    }

    #[test]
    fn div_by_zero_is_an_error() {
        let ctx = ctx();
        let a = Apfloat::from_i64(&ctx, 1);
        let zero = Apfloat::zero(&ctx);
        assert!(matches!(a.div(&zero), Err(ArithmeticError::DivisionByZero)));
    }

    #[test]
    fn div_recovers_the_dividend_after_multiplying_back() {
        let ctx = ctx();
        let a = Apfloat::parse(&ctx, "10", Some(Precision::Finite(20))).unwrap();
        let b = Apfloat::parse(&ctx, "4", Some(Precision::Finite(20))).unwrap();
        let quotient = a.div(&b).unwrap();
        assert!((quotient.approx_f64() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn sqrt_of_negative_is_an_error() {
        let ctx = ctx();
        let a = Apfloat::from_i64(&ctx, -4);
        assert!(matches!(a.sqrt(), Err(ArithmeticError::NegativeDomain { .. })));
    }

    #[test]
    fn sqrt_of_four_is_about_two() {
        let ctx = ctx();
        let a = Apfloat::parse(&ctx, "4", Some(Precision::Finite(20))).unwrap();
        let root = a.sqrt().unwrap();
        assert!((root.approx_f64() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn ordering_respects_sign_and_magnitude() {
        let ctx = ctx();
        let a = Apfloat::from_i64(&ctx, -5);
        let b = Apfloat::from_i64(&ctx, 3);
        assert_eq!(a.cmp_value(&b), Ordering::Less);
        assert_eq!(b.cmp_value(&a), Ordering::Greater);
        assert_eq!(a.cmp_value(&a), Ordering::Equal);
    }

    #[test]
    fn displays_a_fraction_in_fixed_notation_with_no_leading_digit() {
        let ctx = ctx();
        let one = Apfloat::parse(&ctx, "1", Some(Precision::Finite(20))).unwrap();
        let three = Apfloat::parse(&ctx, "3", Some(Precision::Finite(20))).unwrap();
        let third = one.div(&three).unwrap();
        assert_eq!(third.to_string(), "0.33333333333333333333");
    }

    #[test]
    fn displays_the_radix_point_after_the_leading_digit() {
        let ctx = ctx();
        let value = Apfloat::parse(&ctx, "3.14159", Some(Precision::Finite(6))).unwrap();
        assert_eq!(value.to_string(), "3.14159");
    }

    #[test]
    fn displays_a_negative_value_with_the_sign_first() {
        let ctx = ctx();
        let value = Apfloat::parse(&ctx, "-12.5", Some(Precision::Finite(4))).unwrap();
        assert_eq!(value.to_string(), "-12.5");
    }

    #[test]
    fn displays_far_out_of_range_scales_in_exponent_form() {
        let ctx = ctx();
        let value = Apfloat::parse(&ctx, "5e100", Some(Precision::Finite(3))).unwrap();
        assert_eq!(value.to_string(), "5e100");
    }

    #[test]
    fn div_trunc_is_exact_for_integers_beyond_the_guard_digit_fallback() {
        let ctx = ctx();
        let dividend = Apfloat::parse(&ctx, &"7".repeat(90), Some(Precision::Infinite)).unwrap();
        let divisor = Apfloat::parse(&ctx, "3", Some(Precision::Infinite)).unwrap();
        let quotient = dividend.div(&divisor).unwrap().truncate_to_integer();
        let rebuilt = quotient.mul(&divisor).unwrap();
        let remainder = dividend.sub(&rebuilt);
        assert!(remainder.cmp_value(&divisor) == Ordering::Less);
    }
}
