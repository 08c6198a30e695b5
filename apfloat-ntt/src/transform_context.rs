//! Per-prime transform state: root of unity, its inverse, and a twiddle
//! table cache (spec.md §3 "Transform context", §4.4).

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::field::NttField;

/// Forward or inverse twiddle tables are cached separately, keyed by the
/// log2 of the transform length they were built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    log_len: u32,
    inverse: bool,
}

/// Everything needed to run forward/inverse NTTs of any length up to
/// `2^max_log_len` under one prime.
pub struct TransformContext<F: NttField> {
    field: F,
    root: F::Elem,
    root_inv: F::Elem,
    inv2: F::Elem,
    max_log_len: u32,
    cube_root: Option<F::Elem>,
    twiddles: RwLock<HashMap<CacheKey, Arc<Vec<F::Elem>>>>,
}

impl<F: NttField> TransformContext<F> {
    /// Build a context for `field`, whose `root` has multiplicative order
    /// exactly `2^max_log_len`. `cube_root`, if given, must have
    /// multiplicative order exactly 3 (see [`crate::primes::PrimeInfo`]).
    pub fn new(field: F, root: F::Elem, max_log_len: u32, cube_root: Option<F::Elem>) -> Self {
        let root_inv = field.inverse(root);
        let two = field.from_u64(2);
        let inv2 = field.inverse(two);
        TransformContext {
            field,
            root,
            root_inv,
            inv2,
            max_log_len,
            cube_root,
            twiddles: RwLock::new(HashMap::new()),
        }
    }

    /// The underlying field.
    pub fn field(&self) -> F {
        self.field
    }

    /// The inverse of 2 mod p, used to scale an inverse transform's output.
    pub fn inv2(&self) -> F::Elem {
        self.inv2
    }

    /// The largest `n` such that this prime supports a length-`2^n`
    /// transform.
    pub fn max_log_len(&self) -> u32 {
        self.max_log_len
    }

    /// A primitive `2^log_len`-th root of unity (or its inverse), derived
    /// from the context's base root by exponentiation.
    pub(crate) fn root_of_order(&self, log_len: u32, inverse: bool) -> F::Elem {
        assert!(log_len <= self.max_log_len, "requested order exceeds prime's supported range");
        let base = if inverse { self.root_inv } else { self.root };
        let shift = self.max_log_len - log_len;
        self.field.pow(base, 1u64 << shift)
    }

    /// The table `[omega^0, omega^1, ..., omega^(N/2 - 1)]` where `omega` is
    /// a primitive `N`-th root of unity (`N = 2^log_len`), building and
    /// caching it on first use. Invalidate the whole cache with
    /// [`Self::clear_cache`] when the active `builderFactory` changes.
    pub fn twiddles(&self, log_len: u32, inverse: bool) -> Arc<Vec<F::Elem>> {
        let key = CacheKey { log_len, inverse };
        if let Some(table) = self.twiddles.read().unwrap_or_else(|p| p.into_inner()).get(&key) {
            return Arc::clone(table);
        }
        let omega = self.root_of_order(log_len, inverse);
        let half = 1usize << log_len.saturating_sub(1);
        let mut table = Vec::with_capacity(half.max(1));
        let mut current = self.field.from_u64(1);
        for _ in 0..half.max(1) {
            table.push(current);
            current = self.field.mul(current, omega);
        }
        let table = Arc::new(table);
        self.twiddles
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .insert(key, Arc::clone(&table));
        table
    }

    /// A primitive cube root of unity, for the factor-3 butterfly layer.
    /// `None` if this prime doesn't support one (`3` doesn't divide `p-1`).
    pub fn cube_root(&self) -> Option<F::Elem> {
        self.cube_root
    }

    /// Drop every cached twiddle table, e.g. after `builderFactory` changes.
    pub fn clear_cache(&self) {
        self.twiddles.write().unwrap_or_else(|p| p.into_inner()).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apfloat_modmath::{Modulus32, PRIMES_32};
    use crate::primes::PRIME_INFO_32;

    fn context(info: crate::primes::PrimeInfo<Modulus32, u32>) -> TransformContext<Modulus32> {
        TransformContext::new(info.modulus, info.root, info.max_log_len, info.cube_root)
    }

    #[test]
    fn twiddle_table_has_half_length() {
        let ctx = context(PRIME_INFO_32[0]);
        let table = ctx.twiddles(8, false);
        assert_eq!(table.len(), 128);
        assert_eq!(table[0], 1);
    }

    #[test]
    fn cache_is_reused_across_calls() {
        let ctx = context(PRIME_INFO_32[0]);
        let a = ctx.twiddles(4, false);
        let b = ctx.twiddles(4, false);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn forward_and_inverse_roots_are_reciprocal() {
        let ctx = context(PRIME_INFO_32[0]);
        let fwd = ctx.root_of_order(10, false);
        let inv = ctx.root_of_order(10, true);
        assert_eq!(PRIMES_32[0].mul(fwd, inv), 1);
    }

    #[test]
    fn cube_root_has_order_three_when_present() {
        let ctx = context(PRIME_INFO_32[1]);
        let cube = ctx.cube_root().expect("this prime supports factor-3");
        let one = ctx.field().mul(cube, ctx.field().mul(cube, cube));
        assert_eq!(one, 1);
        assert_ne!(cube, 1);
    }

    #[test]
    fn cube_root_absent_when_unsupported() {
        let ctx = context(PRIME_INFO_32[0]);
        assert!(ctx.cube_root().is_none());
    }
}
