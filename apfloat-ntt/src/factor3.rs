//! The factor-3 butterfly layer, for transform lengths `N = 3*2^n`
//! (spec.md §4.4 "Factor-3" path).
//!
//! Splits the input into three length-`M = N/3` subsequences by stride,
//! runs the radix-2 core on each, then combines with a 3-point butterfly
//! driven by a primitive cube root of unity. Only usable under a prime
//! whose [`TransformContext::cube_root`] is `Some` (spec.md §4.3's fixed
//! primes include both kinds).

use crate::field::NttField;
use crate::radix2;
use crate::transform_context::TransformContext;

/// Run an in-place forward or inverse factor-3 NTT over `data`, whose
/// length must be `3 * 2^n` for some `n <= ctx.max_log_len()`.
///
/// # Panics
/// Panics if `data.len()` isn't a multiple of 3 with a power-of-two
/// quotient, or if the active prime has no cube root of unity.
pub fn transform<F: NttField>(ctx: &TransformContext<F>, data: &mut [F::Elem], inverse: bool) {
    let n = data.len();
    assert_eq!(n % 3, 0, "factor-3 transform length must be a multiple of 3");
    let m = n / 3;
    assert!(m.is_power_of_two(), "factor-3 transform length must be 3*2^n");
    let log_m = m.trailing_zeros();
    let field = ctx.field();

    let base_cube = ctx
        .cube_root()
        .expect("active prime has no cube root of unity; factor-3 path unavailable");
    let zeta = if inverse { field.inverse(base_cube) } else { base_cube };
    let zeta2 = field.mul(zeta, zeta);
    let mu = ctx.root_of_order(log_m, inverse);
    let omega = field.mul(zeta, mu);

    let mut x0 = vec![F::Elem::default(); m];
    let mut x1 = vec![F::Elem::default(); m];
    let mut x2 = vec![F::Elem::default(); m];
    for k in 0..m {
        x0[k] = data[3 * k];
        x1[k] = data[3 * k + 1];
        x2[k] = data[3 * k + 2];
    }

    radix2::transform(ctx, &mut x0, inverse);
    radix2::transform(ctx, &mut x1, inverse);
    radix2::transform(ctx, &mut x2, inverse);

    let mut pow = field.from_u64(1);
    for k in 0..m {
        let t1 = field.mul(pow, x1[k]);
        let pow2 = field.mul(pow, pow);
        let t2 = field.mul(pow2, x2[k]);
        let a = x0[k];

        data[k] = field.add(a, field.add(t1, t2));
        data[k + m] = field.add(a, field.add(field.mul(zeta, t1), field.mul(zeta2, t2)));
        data[k + 2 * m] = field.add(a, field.add(field.mul(zeta2, t1), field.mul(zeta, t2)));

        pow = field.mul(pow, omega);
    }

    if inverse {
        let three_inv = field.inverse(field.from_u64(3));
        for value in data.iter_mut() {
            *value = field.mul(*value, three_inv);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primes::PRIME_INFO_32;

    fn ctx() -> TransformContext<apfloat_modmath::Modulus32> {
        // PRIME_INFO_32[1] is the one with a cube root of unity.
        let info = PRIME_INFO_32[1];
        TransformContext::new(info.modulus, info.root, info.max_log_len, info.cube_root)
    }

    #[test]
    fn forward_then_inverse_is_identity() {
        let ctx = ctx();
        let mut data: Vec<u32> = (0..24).collect();
        let original = data.clone();
        transform(&ctx, &mut data, false);
        transform(&ctx, &mut data, true);
        assert_eq!(data, original);
    }

    #[test]
    #[should_panic(expected = "no cube root")]
    fn unsupported_prime_panics() {
        let info = PRIME_INFO_32[0];
        let ctx = TransformContext::new(info.modulus, info.root, info.max_log_len, info.cube_root);
        let mut data = vec![0u32; 12];
        transform(&ctx, &mut data, false);
    }
}
