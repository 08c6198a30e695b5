//! Iterative radix-2 decimation-in-time NTT, run entirely inside one
//! in-memory window (spec.md §4.4 "small-n path" and inner stage of the
//! six-step path).

use crate::field::NttField;
use crate::transform_context::TransformContext;

fn bit_reverse_permute<T: Copy>(data: &mut [T]) {
    let n = data.len();
    let bits = n.trailing_zeros();
    for i in 0..n {
        let j = (i as u32).reverse_bits() >> (32 - bits);
        let j = j as usize;
        if i < j {
            data.swap(i, j);
        }
    }
}

/// Run an in-place forward or inverse radix-2 NTT over `data`, whose length
/// must be a power of two not exceeding `ctx.max_log_len()`.
pub fn transform<F: NttField>(ctx: &TransformContext<F>, data: &mut [F::Elem], inverse: bool) {
    let n = data.len();
    if n <= 1 {
        return;
    }
    debug_assert!(n.is_power_of_two());
    let log_n = n.trailing_zeros();
    let field = ctx.field();

    bit_reverse_permute(data);

    let twiddles = ctx.twiddles(log_n, inverse);
    let mut len = 2usize;
    while len <= n {
        let half = len / 2;
        let stride = n / len;
        let mut start = 0;
        while start < n {
            for k in 0..half {
                let w = twiddles[k * stride];
                let u = data[start + k];
                let v = field.mul(data[start + k + half], w);
                data[start + k] = field.add(u, v);
                data[start + k + half] = field.sub(u, v);
            }
            start += len;
        }
        len <<= 1;
    }

    if inverse {
        let n_inv = field.inverse(field.from_u64(n as u64));
        for value in data.iter_mut() {
            *value = field.mul(*value, n_inv);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primes::PRIME_INFO_32;

    fn ctx() -> TransformContext<apfloat_modmath::Modulus32> {
        let info = PRIME_INFO_32[0];
        TransformContext::new(info.modulus, info.root, info.max_log_len, info.cube_root)
    }

    #[test]
    fn forward_then_inverse_is_identity() {
        let ctx = ctx();
        let mut data: Vec<u32> = (0..16).collect();
        let original = data.clone();
        transform(&ctx, &mut data, false);
        transform(&ctx, &mut data, true);
        assert_eq!(data, original);
    }

    #[test]
    fn transform_of_constant_sequence_has_nonzero_dc_term() {
        let ctx = ctx();
        let mut data = vec![5u32; 8];
        transform(&ctx, &mut data, false);
        assert_eq!(data[0], ctx.field().mul(5, 8));
        for value in &data[1..] {
            assert_eq!(*value, 0);
        }
    }

    #[test]
    fn single_element_transform_is_noop() {
        let ctx = ctx();
        let mut data = vec![42u32];
        transform(&ctx, &mut data, false);
        assert_eq!(data, vec![42]);
    }
}
