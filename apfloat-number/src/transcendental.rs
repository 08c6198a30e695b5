//! Transcendental functions (spec.md §4.6.1).
//!
//! `exp`/`sin`/`cos`/[`pi`] reduce to a hypergeometric-ratio or Chudnovsky
//! `(P, Q, T)` triple and sum it via [`apfloat_parallel::binary_split`]
//! (spec.md §4.6's "transcendentals through the binary-splitting driver",
//! §4.7's worked Chudnovsky example), then reconstruct the full-magnitude
//! result by repeated squaring / double-angle formulas where the argument
//! needed reducing first. Everything else here is Newton's method built on
//! `exp`/`log`/`sin`/`cos` plus the primitives already on [`Apfloat`].

use std::cmp::Ordering;

use apfloat_context::Context;
use apfloat_parallel::{binary_split, CancellationToken, NodeSet, ParallelError};

use crate::apfloat::{seed_from_f64, Apfloat};
use crate::error::ArithmeticError;
use crate::precision::{Precision, ITERATION_GUARD_DIGITS};

/// `A` in Chudnovsky's `T(k) = P(k) * (A + B*k)`.
const CHUDNOVSKY_A: i64 = 13_591_409;
/// `B` in Chudnovsky's `T(k) = P(k) * (A + B*k)`.
const CHUDNOVSKY_B: i64 = 545_140_134;
/// `640320^3 / 24`, used by `Q(k) = k^3 * CHUDNOVSKY_C3_OVER_24` for `k > 0`.
const CHUDNOVSKY_C3_OVER_24: i64 = 10_939_058_860_032_000;
/// `pi = (Q * 426880 * sqrt(10005)) / T`, the series' closing combination.
const CHUDNOVSKY_SQRT_ARGUMENT: i64 = 10_005;
const CHUDNOVSKY_SCALE: i64 = 426_880;
/// Each Chudnovsky term contributes about this many decimal digits.
const CHUDNOVSKY_DIGITS_PER_TERM: u64 = 14;

/// A binary-splitting accumulator over Apfloat-valued exact integers:
/// `t / q` is the partial sum over a term range, and `p` the product of
/// each term's numerator factor, the three quantities a combine step needs
/// without ever dividing until the range is whole (spec.md §4.7's P/Q/T
/// pattern).
#[derive(Clone)]
struct Triple {
    p: Apfloat,
    q: Apfloat,
    t: Apfloat,
}

fn combine_triples(left: Triple, right: Triple) -> Result<Triple, ArithmeticError> {
    let p = left.p.mul(&right.p)?;
    let q = left.q.mul(&right.q)?;
    let t = left.t.mul(&right.q)?.add(&left.p.mul(&right.t)?);
    Ok(Triple { p, q, t })
}

fn parallel_error(e: ArithmeticError) -> ParallelError {
    match e {
        ArithmeticError::Precision(inner) => ParallelError::Precision(inner),
        _ => ParallelError::Cancelled,
    }
}

fn arithmetic_error(e: ParallelError) -> ArithmeticError {
    match e {
        ParallelError::Precision(inner) => ArithmeticError::Precision(inner),
        ParallelError::Cancelled => ArithmeticError::Cancelled,
    }
}

/// Run a binary-splitting recursion over term range `[0, term_count)`,
/// given a leaf producing each term's `(P, Q, T)` triple directly.
fn binary_split_triple(
    ctx: &Context,
    term_count: u64,
    leaf: impl Fn(u64) -> Triple + Sync,
) -> Result<Triple, ArithmeticError> {
    let nodes = NodeSet::new(ctx.number_of_processors());
    let token = CancellationToken::new();
    let base = |k: u64| -> Result<Triple, ParallelError> { Ok(leaf(k)) };
    let combine = |l: Triple, r: Triple| -> Result<Triple, ParallelError> {
        combine_triples(l, r).map_err(parallel_error)
    };
    binary_split(0, term_count, &nodes, &token, &base, &combine).map_err(arithmetic_error)
}

/// Sum `Σ term(k)` for `k` in `[1, term_count]`, where `term(k) = term(k-1)
/// * numerator(k) / denominator(k)` and `term(0)` is implicitly `1`. Returns
/// the sum alone; the caller adds the `k = 0` term itself, since every
/// series here applies a different prefactor to it (`exp` adds it bare,
/// `sin` multiplies the whole sum by `x` first).
fn hypergeometric_sum(
    ctx: &Context,
    term_count: u64,
    numerator: impl Fn(u64) -> Apfloat + Sync,
    denominator: impl Fn(u64) -> i64 + Sync,
) -> Result<Apfloat, ArithmeticError> {
    if term_count == 0 {
        return Ok(Apfloat::zero(ctx));
    }
    let triple = binary_split_triple(ctx, term_count, |k| {
        let p = numerator(k);
        let q = Apfloat::parse_int(ctx, denominator(k), Precision::Infinite);
        Triple { t: p.clone(), p, q }
    })?;
    triple.t.div(&triple.q)
}

/// How many terms of a unit-magnitude-argument Taylor series this
/// precision needs: each term contributes roughly one more digit of
/// accuracy for `|x| <= 0.5` after reduction, so `precision + guard` terms
/// is ample headroom.
fn term_budget(precision: Precision) -> u64 {
    precision.extended(ITERATION_GUARD_DIGITS).digits(64).max(8)
}

/// Halve `x` until its magnitude is below 1, returning the reduced value
/// and how many halvings were applied.
fn reduce_by_halving(x: &Apfloat) -> Result<(Apfloat, u32), ArithmeticError> {
    let ctx = x.context().clone();
    let one = Apfloat::parse_int(&ctx, 1, x.precision());
    let two = Apfloat::parse_int(&ctx, 2, Precision::Infinite);
    let mut reduced = x.clone();
    let mut halvings = 0u32;
    while reduced.abs().cmp_value(&one) != Ordering::Less {
        reduced = reduced.div(&two)?;
        halvings += 1;
    }
    Ok((reduced, halvings))
}

/// `e^x`.
pub fn exp(x: &Apfloat) -> Result<Apfloat, ArithmeticError> {
    let ctx = x.context().clone();
    if x.is_zero() {
        return Ok(Apfloat::parse_int(&ctx, 1, x.precision()));
    }
    let (reduced, halvings) = reduce_by_halving(x)?;
    let terms = term_budget(x.precision());
    let sum = hypergeometric_sum(&ctx, terms, |_k| reduced.clone(), |k| k as i64)?;
    let mut result = Apfloat::parse_int(&ctx, 1, x.precision()).add(&sum);
    for _ in 0..halvings {
        result = result.mul(&result)?;
    }
    Ok(result.with_precision(x.precision()))
}

/// `(sin x, cos x)`, computed together since both share the reduced-argument
/// series and the double-angle reconstruction.
pub fn sin_cos(x: &Apfloat) -> Result<(Apfloat, Apfloat), ArithmeticError> {
    let ctx = x.context().clone();
    if x.is_zero() {
        return Ok((Apfloat::zero(&ctx), Apfloat::parse_int(&ctx, 1, x.precision())));
    }
    let (reduced, halvings) = reduce_by_halving(x)?;
    let terms = term_budget(x.precision());
    let neg_square = reduced.mul(&reduced)?.negated();

    let cos_sum = hypergeometric_sum(&ctx, terms, |_k| neg_square.clone(), |k| (2 * k - 1) as i64 * (2 * k) as i64)?;
    let sin_sum = hypergeometric_sum(&ctx, terms, |_k| neg_square.clone(), |k| (2 * k) as i64 * (2 * k + 1) as i64)?;

    let one = Apfloat::parse_int(&ctx, 1, x.precision());
    let mut cos_r = one.add(&cos_sum);
    let mut sin_r = reduced.mul(&one.add(&sin_sum))?;

    let two = Apfloat::parse_int(&ctx, 2, Precision::Infinite);
    for _ in 0..halvings {
        let new_sin = two.mul(&sin_r)?.mul(&cos_r)?;
        let new_cos = two.mul(&cos_r)?.mul(&cos_r)?.sub(&one);
        sin_r = new_sin;
        cos_r = new_cos;
    }
    Ok((sin_r.with_precision(x.precision()), cos_r.with_precision(x.precision())))
}

/// `sin x`.
pub fn sin(x: &Apfloat) -> Result<Apfloat, ArithmeticError> {
    Ok(sin_cos(x)?.0)
}

/// `cos x`.
pub fn cos(x: &Apfloat) -> Result<Apfloat, ArithmeticError> {
    Ok(sin_cos(x)?.1)
}

/// `tan x = sin x / cos x`.
pub fn tan(x: &Apfloat) -> Result<Apfloat, ArithmeticError> {
    let (s, c) = sin_cos(x)?;
    s.div(&c)
}

/// Pi, via the Chudnovsky series' binary-splitting P/Q/T triple (spec.md
/// §4.7), closed as `pi = (Q * 426880 * sqrt(10005)) / T`.
pub fn pi(ctx: &Context, precision: Precision) -> Result<Apfloat, ArithmeticError> {
    let working_precision = precision.extended(ITERATION_GUARD_DIGITS).digits(64);
    let terms = (working_precision / CHUDNOVSKY_DIGITS_PER_TERM + 2).max(1);
    let triple = binary_split_triple(ctx, terms, |k| chudnovsky_leaf(ctx, k))?;
    let sqrt_10005 = Apfloat::parse_int(ctx, CHUDNOVSKY_SQRT_ARGUMENT, Precision::Finite(working_precision)).sqrt()?;
    let scale = Apfloat::parse_int(ctx, CHUDNOVSKY_SCALE, Precision::Infinite);
    let numerator = triple.q.mul(&scale)?.mul(&sqrt_10005)?;
    Ok(numerator.div(&triple.t)?.with_precision(precision))
}

fn chudnovsky_leaf(ctx: &Context, k: u64) -> Triple {
    if k == 0 {
        return Triple {
            p: Apfloat::parse_int(ctx, 1, Precision::Infinite),
            q: Apfloat::parse_int(ctx, 1, Precision::Infinite),
            t: Apfloat::parse_int(ctx, CHUDNOVSKY_A, Precision::Infinite),
        };
    }
    let k = k as i64;
    let p = Apfloat::parse_int(ctx, 6 * k - 5, Precision::Infinite)
        .mul(&Apfloat::parse_int(ctx, 2 * k - 1, Precision::Infinite))
        .and_then(|v| v.mul(&Apfloat::parse_int(ctx, 6 * k - 1, Precision::Infinite)))
        .expect("exact-integer multiply never fails precision");
    let q = Apfloat::parse_int(ctx, k, Precision::Infinite)
        .mul(&Apfloat::parse_int(ctx, k, Precision::Infinite))
        .and_then(|v| v.mul(&Apfloat::parse_int(ctx, k, Precision::Infinite)))
        .and_then(|v| v.mul(&Apfloat::parse_int(ctx, CHUDNOVSKY_C3_OVER_24, Precision::Infinite)))
        .expect("exact-integer multiply never fails precision");
    let linear = Apfloat::parse_int(ctx, CHUDNOVSKY_A, Precision::Infinite).add(
        &Apfloat::parse_int(ctx, CHUDNOVSKY_B, Precision::Infinite)
            .mul(&Apfloat::parse_int(ctx, k, Precision::Infinite))
            .expect("exact-integer multiply never fails precision"),
    );
    let mut t = p.mul(&linear).expect("exact-integer multiply never fails precision");
    if k % 2 == 1 {
        t = t.negated();
    }
    Triple { p, q, t }
}

/// Natural log, via Newton's method on `exp` (`y_{n+1} = y_n + x e^{-y_n} -
/// 1`), which doubles correct digits each step.
pub fn log(x: &Apfloat) -> Result<Apfloat, ArithmeticError> {
    let ctx = x.context().clone();
    if x.is_zero() || x.signum() < 0 {
        return Err(ArithmeticError::NegativeDomain { op: "log" });
    }
    let one = Apfloat::parse_int(&ctx, 1, x.precision());
    if *x == one {
        return Ok(Apfloat::zero(&ctx));
    }
    let working_precision = x.precision().extended(ITERATION_GUARD_DIGITS).digits(64);
    let seed_precision = 15u64.min(working_precision);
    let mut guess = seed_from_f64(&ctx, x.approx_f64().ln(), seed_precision as usize);
    let mut precision = seed_precision;
    while precision < working_precision {
        precision = (precision * 2).min(working_precision);
        guess = guess.with_precision(Precision::Finite(precision));
        let e_neg_y = exp(&guess.negated())?;
        let correction = x
            .mul(&e_neg_y)?
            .sub(&Apfloat::parse_int(&ctx, 1, Precision::Finite(precision)));
        guess = guess.add(&correction).with_precision(Precision::Finite(precision));
    }
    Ok(guess.with_precision(x.precision()))
}

/// `log_radix(x) = log(x) / log(radix)`, the convenience base named by
/// `x`'s own context radix.
pub fn log_radix(x: &Apfloat) -> Result<Apfloat, ArithmeticError> {
    let ctx = x.context().clone();
    let radix_value = Apfloat::from_i64(&ctx, ctx.default_radix() as i64);
    log(x)?.div(&log(&radix_value)?)
}

/// `x^y` for a real exponent, via `exp(y log x)`; integer-valued `y` uses
/// exact repeated squaring instead.
pub fn pow(x: &Apfloat, y: &Apfloat) -> Result<Apfloat, ArithmeticError> {
    if y.is_zero() {
        if x.is_zero() {
            return Err(ArithmeticError::ZeroToZero);
        }
        return Ok(Apfloat::parse_int(x.context(), 1, x.precision()));
    }
    if let Some(n) = as_small_integer(y) {
        return integer_power(x, n);
    }
    if x.signum() <= 0 {
        return Err(ArithmeticError::NegativeDomain { op: "pow" });
    }
    exp(&y.mul(&log(x)?)?)
}

fn as_small_integer(value: &Apfloat) -> Option<i64> {
    let approx = value.approx_f64();
    if approx.fract() == 0.0 && approx.abs() < 1e15 {
        Some(approx as i64)
    } else {
        None
    }
}

fn integer_power(x: &Apfloat, mut n: i64) -> Result<Apfloat, ArithmeticError> {
    let ctx = x.context().clone();
    if n == 0 {
        return Ok(Apfloat::parse_int(&ctx, 1, x.precision()));
    }
    let invert = n < 0;
    n = n.abs();
    let mut base = x.clone();
    let mut result = Apfloat::parse_int(&ctx, 1, x.precision());
    while n > 0 {
        if n & 1 == 1 {
            result = result.mul(&base)?;
        }
        n >>= 1;
        if n > 0 {
            base = base.mul(&base)?;
        }
    }
    if invert {
        Apfloat::parse_int(&ctx, 1, x.precision()).div(&result)
    } else {
        Ok(result)
    }
}

/// `x^{-1/n}`, via Newton's method (`y_{n+1} = y_n ((n+1) - x y_n^n) / n`).
pub fn inverse_root(x: &Apfloat, n: u32) -> Result<Apfloat, ArithmeticError> {
    if n == 0 {
        return Err(ArithmeticError::ZeroRoot);
    }
    if x.signum() <= 0 {
        return Err(ArithmeticError::NegativeDomain { op: "inverse_root" });
    }
    let ctx = x.context().clone();
    let working_precision = x.precision().extended(ITERATION_GUARD_DIGITS).digits(64);
    let seed_precision = 15u64.min(working_precision);
    let seed = x.approx_f64().powf(-1.0 / n as f64);
    let mut guess = seed_from_f64(&ctx, seed, seed_precision as usize);
    let n_plus_one = Apfloat::parse_int(&ctx, n as i64 + 1, Precision::Infinite);
    let n_apfloat = Apfloat::parse_int(&ctx, n as i64, Precision::Infinite);
    let mut precision = seed_precision;
    while precision < working_precision {
        precision = (precision * 2).min(working_precision);
        guess = guess.with_precision(Precision::Finite(precision));
        let power = integer_power(&guess, n as i64)?;
        let inner = n_plus_one.sub(&x.mul(&power)?);
        guess = guess
            .mul(&inner)?
            .div(&n_apfloat)?
            .with_precision(Precision::Finite(precision));
    }
    Ok(guess.with_precision(x.precision()))
}

/// `x^{1/3}`.
pub fn cbrt(x: &Apfloat) -> Result<Apfloat, ArithmeticError> {
    if x.is_zero() {
        return Ok(Apfloat::zero(x.context()));
    }
    let magnitude = x.abs();
    let inv = inverse_root(&magnitude, 3)?;
    let mut result = magnitude.mul(&inv.mul(&inv)?)?;
    if x.signum() < 0 {
        result = result.negated();
    }
    Ok(result)
}

/// `sinh x = (e^x - e^{-x}) / 2`.
pub fn sinh(x: &Apfloat) -> Result<Apfloat, ArithmeticError> {
    let two = Apfloat::parse_int(x.context(), 2, Precision::Infinite);
    exp(x)?.sub(&exp(&x.negated())?).div(&two)
}

/// `cosh x = (e^x + e^{-x}) / 2`.
pub fn cosh(x: &Apfloat) -> Result<Apfloat, ArithmeticError> {
    let two = Apfloat::parse_int(x.context(), 2, Precision::Infinite);
    exp(x)?.add(&exp(&x.negated())?).div(&two)
}

/// `tanh x = sinh x / cosh x`.
pub fn tanh(x: &Apfloat) -> Result<Apfloat, ArithmeticError> {
    sinh(x)?.div(&cosh(x)?)
}

/// `asinh x = log(x + sqrt(x^2 + 1))`.
pub fn asinh(x: &Apfloat) -> Result<Apfloat, ArithmeticError> {
    let one = Apfloat::parse_int(x.context(), 1, x.precision());
    let inner = x.mul(x)?.add(&one).sqrt()?;
    log(&x.add(&inner))
}

/// `acosh x = log(x + sqrt(x^2 - 1))`, for `x >= 1`.
pub fn acosh(x: &Apfloat) -> Result<Apfloat, ArithmeticError> {
    let one = Apfloat::parse_int(x.context(), 1, x.precision());
    if x.cmp_value(&one) == Ordering::Less {
        return Err(ArithmeticError::NegativeDomain { op: "acosh" });
    }
    let inner = x.mul(x)?.sub(&one).sqrt()?;
    log(&x.add(&inner))
}

/// `atanh x = log((1 + x) / (1 - x)) / 2`, for `|x| < 1`.
pub fn atanh(x: &Apfloat) -> Result<Apfloat, ArithmeticError> {
    let ctx = x.context().clone();
    let one = Apfloat::parse_int(&ctx, 1, x.precision());
    if x.abs().cmp_value(&one) != Ordering::Less {
        return Err(ArithmeticError::NegativeDomain { op: "atanh" });
    }
    let two = Apfloat::parse_int(&ctx, 2, Precision::Infinite);
    let ratio = one.add(x).div(&one.sub(x))?;
    log(&ratio)?.div(&two)
}

/// `atan x`, via Newton's method on `tan` (`y_{n+1} = y_n - (tan y_n - x)
/// cos^2 y_n`).
pub fn atan(x: &Apfloat) -> Result<Apfloat, ArithmeticError> {
    let ctx = x.context().clone();
    if x.is_zero() {
        return Ok(Apfloat::zero(&ctx));
    }
    let working_precision = x.precision().extended(ITERATION_GUARD_DIGITS).digits(64);
    let seed_precision = 15u64.min(working_precision);
    let mut guess = seed_from_f64(&ctx, x.approx_f64().atan(), seed_precision as usize);
    let mut precision = seed_precision;
    while precision < working_precision {
        precision = (precision * 2).min(working_precision);
        guess = guess.with_precision(Precision::Finite(precision));
        let (s, c) = sin_cos(&guess)?;
        let tan_y = s.div(&c)?;
        let correction = tan_y.sub(x).mul(&c)?.mul(&c)?;
        guess = guess.sub(&correction).with_precision(Precision::Finite(precision));
    }
    Ok(guess.with_precision(x.precision()))
}

/// `atan2(y, x)`, resolving the quadrant `atan` alone cannot (spec.md
/// §4.6.1's full inverse-trig inventory).
pub fn atan2(y: &Apfloat, x: &Apfloat) -> Result<Apfloat, ArithmeticError> {
    let ctx = x.context().clone();
    if x.is_zero() && y.is_zero() {
        return Err(ArithmeticError::NegativeDomain { op: "atan2" });
    }
    let precision = x.precision().min(y.precision());
    if x.signum() > 0 {
        return atan(&y.div(x)?);
    }
    let pi_value = pi(&ctx, precision)?;
    if x.signum() < 0 {
        let base = atan(&y.div(x)?)?;
        return Ok(if y.signum() >= 0 {
            base.add(&pi_value)
        } else {
            base.sub(&pi_value)
        });
    }
    let half_pi = pi_value.div(&Apfloat::parse_int(&ctx, 2, Precision::Infinite))?;
    Ok(if y.signum() > 0 { half_pi } else { half_pi.negated() })
}

/// `asin x = atan(x / sqrt(1 - x^2))`.
pub fn asin(x: &Apfloat) -> Result<Apfloat, ArithmeticError> {
    let one = Apfloat::parse_int(x.context(), 1, x.precision());
    if x.abs().cmp_value(&one) == Ordering::Greater {
        return Err(ArithmeticError::NegativeDomain { op: "asin" });
    }
    let denom = one.sub(&x.mul(x)?).sqrt()?;
    atan(&x.div(&denom)?)
}

/// `acos x`, via Newton's method directly on `cos` since `acos` has no
/// singularity-free ratio to `atan` the way `asin` does near `x = -1`.
pub fn acos(x: &Apfloat) -> Result<Apfloat, ArithmeticError> {
    let ctx = x.context().clone();
    let one = Apfloat::parse_int(&ctx, 1, x.precision());
    if x.abs().cmp_value(&one) == Ordering::Greater {
        return Err(ArithmeticError::NegativeDomain { op: "acos" });
    }
    let working_precision = x.precision().extended(ITERATION_GUARD_DIGITS).digits(64);
    let seed_precision = 15u64.min(working_precision);
    let mut guess = seed_from_f64(&ctx, x.approx_f64().acos(), seed_precision as usize);
    let mut precision = seed_precision;
    while precision < working_precision {
        precision = (precision * 2).min(working_precision);
        guess = guess.with_precision(Precision::Finite(precision));
        let (s, c) = sin_cos(&guess)?;
        if s.is_zero() {
            break;
        }
        let correction = c.sub(x).div(&s.negated())?;
        guess = guess.sub(&correction).with_precision(Precision::Finite(precision));
    }
    Ok(guess.with_precision(x.precision()))
}
