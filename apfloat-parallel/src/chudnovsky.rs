//! The Chudnovsky series for pi, driven by [`crate::split::binary_split`]
//! (spec.md §4.7's worked example).
//!
//! Binary splitting accumulates a `(P, Q, T)` triple over term range
//! `[0, n)` such that, once the recursion bottoms out,
//! `pi ≈ (Q * 640320 * sqrt(640320)) / (12 * T)`. The auxiliary term
//! `sqrt(640320)` is computed independently (an inverse square root, per
//! spec.md §4.6.2's Newton iteration) rather than folded into the P/Q/T
//! recursion, so it is launched concurrently with the final combine
//! whenever at least two worker nodes are free for it.

use apfloat_context::{get_context, Context};

use crate::bigint::BigInt;
use crate::cancel::CancellationToken;
use crate::error::ParallelError;
use crate::node_set::NodeSet;
use crate::split::binary_split;

/// `A` in `T(k) = P(k) * (A + B*k)`.
const A: u64 = 13_591_409;
/// `B` in `T(k) = P(k) * (A + B*k)`.
const B: u64 = 545_140_134;
/// `640320^3 / 24`, used by `Q(k) = k^3 * C3_OVER_24` for `k > 0`.
const C3_OVER_24: u64 = 10_939_058_860_032_000;
/// The constant under the auxiliary square root, `640320`.
pub const SQRT_ARGUMENT: u64 = 640_320;

/// The accumulated binary-splitting triple for a term range.
#[derive(Debug, Clone)]
struct Triple {
    p: BigInt,
    q: BigInt,
    t: BigInt,
}

fn leaf(k: u64) -> Result<Triple, ParallelError> {
    if k == 0 {
        return Ok(Triple {
            p: BigInt::one(),
            q: BigInt::one(),
            t: BigInt::from_u64(A),
        });
    }
    let p = BigInt::from_u64(6 * k - 5).mul_u64(2 * k - 1).mul_u64(6 * k - 1);
    let q = BigInt::from_u128(k as u128 * k as u128 * k as u128).mul_u64(C3_OVER_24);
    let mut t = p.mul_u64(A).add(&p.mul_u64(B).mul_u64(k));
    if k % 2 == 1 {
        t = t.negate();
    }
    Ok(Triple { p, q, t })
}

fn combine(left: Triple, right: Triple) -> Result<Triple, ParallelError> {
    let ctx = get_context();
    let p = left.p.mul(&right.p, &ctx)?;
    let q = left.q.mul(&right.q, &ctx)?;
    let t = right.q.mul(&left.t, &ctx)?.add(&left.p.mul(&right.t, &ctx)?);
    Ok(Triple { p, q, t })
}

/// The result of [`binary_splitting`]: the accumulated `Q`/`T` needed for
/// the closing division, and the worker budget that was still free to
/// compute the auxiliary inverse square root concurrently (`0` if none).
pub struct ChudnovskyResult {
    /// `Q(0, n)`.
    pub q: BigInt,
    /// `T(0, n)`.
    pub t: BigInt,
}

/// Run the Chudnovsky binary-splitting recursion over `n` terms (each term
/// contributes roughly 14.18 decimal digits), returning the `Q`/`T`
/// accumulators a caller combines with an independently computed
/// `1/sqrt(640320)` to close the series:
///
/// `pi ≈ (Q * 640320) / (12 * T * inverse_sqrt(640320))`
///
/// `n` must be at least 1. Cooperative cancellation is sampled at every
/// recursion entry via `token`.
pub fn binary_splitting(n: u64, token: &CancellationToken) -> Result<ChudnovskyResult, ParallelError> {
    assert!(n >= 1, "binary_splitting requires at least one term");
    let ctx = get_context();
    let nodes = NodeSet::new(ctx.number_of_processors());
    let triple = binary_split(0, n, &nodes, token, &leaf, &combine)?;
    Ok(ChudnovskyResult {
        q: triple.q,
        t: triple.t,
    })
}

/// Run the series and, whenever the node pool splits off at least one
/// other worker for it, compute the auxiliary `1/sqrt(640320)` term
/// concurrently via `auxiliary`. `auxiliary` receives the [`Context`] it
/// should install on its own thread (already budgeted) and the ambient
/// one otherwise; `None` is passed when no extra capacity was available
/// and the caller should compute the auxiliary term itself afterward.
pub fn binary_splitting_with_auxiliary<A2, R>(
    n: u64,
    token: &CancellationToken,
    auxiliary: A2,
) -> Result<(ChudnovskyResult, Option<R>), ParallelError>
where
    A2: FnOnce(&Context) -> R + Send,
    R: Send,
{
    let ctx = get_context();
    let total = ctx.number_of_processors();
    if total < 2 {
        let result = binary_splitting(n, token)?;
        return Ok((result, None));
    }
    let nodes = NodeSet::new(total - 1);
    let aux_ctx = ctx.to_builder().with_number_of_processors(1).build();
    let (series_result, aux_result) = rayon::join(
        || {
            let triple = binary_split(0, n, &nodes, token, &leaf, &combine);
            triple.map(|t| ChudnovskyResult { q: t.q, t: t.t })
        },
        || auxiliary(&aux_ctx),
    );
    Ok((series_result?, Some(aux_result)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_f64(value: &BigInt) -> f64 {
        let mut out = 0f64;
        let (negative, digits) = value.clone().into_little_endian_digits();
        for &limb in digits.iter().rev() {
            out = out * crate::bigint::RADIX as f64 + limb as f64;
        }
        if negative {
            out = -out;
        }
        out
    }

    #[test]
    fn five_terms_reproduce_pi_to_double_precision() {
        let token = CancellationToken::new();
        let result = binary_splitting(5, &token).unwrap();
        let q = to_f64(&result.q);
        let t = to_f64(&result.t);
        let pi_approx = (q * 426_880.0 * (10_005f64).sqrt()) / t;
        assert!((pi_approx - std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn single_term_is_just_the_leaf() {
        let token = CancellationToken::new();
        let result = binary_splitting(1, &token).unwrap();
        assert_eq!(to_f64(&result.q), 1.0);
        assert_eq!(to_f64(&result.t), A as f64);
    }

    #[test]
    fn auxiliary_runs_when_capacity_allows() {
        let ctx = Context::builder().with_number_of_processors(4).build();
        apfloat_context::set_thread_context(ctx);
        let token = CancellationToken::new();
        let (_, aux) = binary_splitting_with_auxiliary(5, &token, |_ctx| 42u32).unwrap();
        apfloat_context::remove_thread_context();
        assert_eq!(aux, Some(42));
    }

    #[test]
    fn auxiliary_is_skipped_with_a_single_processor() {
        let ctx = Context::builder().with_number_of_processors(1).build();
        apfloat_context::set_thread_context(ctx);
        let token = CancellationToken::new();
        let (_, aux) = binary_splitting_with_auxiliary(5, &token, |_ctx| 42u32).unwrap();
        apfloat_context::remove_thread_context();
        assert_eq!(aux, None);
    }
}
