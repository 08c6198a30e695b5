//! The three-prime transform/pointwise-multiply/inverse/CRT pipeline
//! (spec.md §4.5 steps 1-3), generic over the element family via
//! [`apfloat_ntt::NttField`] so it's written once for both `Int` and `Long`.

use std::sync::Arc;

use apfloat_context::{BuilderFactory, Context};
use apfloat_ntt::{Ntt, NttField, TransformContext};
use apfloat_storage::factory::StorageFactory;
use apfloat_storage::{AccessMode, StorageHandle};
use num_bigint::BigUint;
use num_traits::ToPrimitive;

use crate::crt::CrtParams;
use crate::error::PrecisionError;

/// Multiply little-endian digit sequences `lhs`/`rhs` in `radix` via the
/// three fixed primes behind `contexts`, tagged `family` for error messages
/// and `factory` for [`Ntt`]'s twiddle-cache-invalidation bookkeeping.
pub(crate) fn multiply<F: NttField>(
    contexts: &[Arc<TransformContext<F>>; 3],
    moduli: [u64; 3],
    family: &'static str,
    factory: BuilderFactory,
    ctx: &Context,
    lhs: &[u32],
    rhs: &[u32],
    radix: u32,
) -> Result<Vec<u32>, PrecisionError> {
    let target_len = lhs.len() + rhs.len();
    if target_len == 0 {
        return Ok(Vec::new());
    }

    let log_len = target_len.next_power_of_two().trailing_zeros();
    let max_log_len = contexts.iter().map(|c| c.max_log_len()).min().unwrap_or(0);
    if log_len > max_log_len {
        return Err(PrecisionError::LengthUnsupported {
            lhs: lhs.len(),
            rhs: rhs.len(),
        });
    }
    let n = 1usize << log_len;

    let crt = CrtParams::new(moduli);
    let bound = BigUint::from(n as u64) * BigUint::from((radix - 1) as u64) * BigUint::from((radix - 1) as u64);
    if bound >= *crt.product() {
        return Err(PrecisionError::InsufficientRange {
            length: n,
            radix,
            family,
        });
    }

    let storage_factory = StorageFactory::new(ctx.clone());
    let mut residues: [Vec<u64>; 3] = [Vec::new(), Vec::new(), Vec::new()];

    for (prime_idx, tctx) in contexts.iter().enumerate() {
        let field = tctx.field();
        let a: StorageHandle<F::Elem> = storage_factory.create(n)?;
        let b: StorageHandle<F::Elem> = storage_factory.create(n)?;

        fill(&a, lhs, field, n)?;
        fill(&b, rhs, field, n)?;

        let ntt = Ntt::new(Arc::clone(tctx), factory);
        ntt.forward(ctx, &a)?;
        ntt.forward(ctx, &b)?;
        {
            let mut wa = a.get_array(AccessMode::ReadWrite, 0, n)?;
            let rb = b.get_array(AccessMode::Read, 0, n)?;
            let sa = wa.as_mut_slice();
            let sb = rb.as_slice();
            for i in 0..n {
                sa[i] = field.mul(sa[i], sb[i]);
            }
        }
        ntt.inverse(ctx, &a)?;

        let result = a.get_array(AccessMode::Read, 0, target_len)?;
        residues[prime_idx] = result.as_slice().iter().map(|&v| field.to_u64(v)).collect();
    }

    let mut raw = Vec::with_capacity(target_len);
    for i in 0..target_len {
        let combined = crt.combine([residues[0][i], residues[1][i], residues[2][i]]);
        let value = combined
            .to_u64()
            .expect("convolution sum is bounded by n*(radix-1)^2, which fits a u64");
        raw.push(value);
    }

    Ok(carry_propagate(raw, radix))
}

fn fill<F: NttField>(
    storage: &StorageHandle<F::Elem>,
    digits: &[u32],
    field: F,
    n: usize,
) -> Result<(), apfloat_storage::StorageError> {
    let mut window = storage.get_array(AccessMode::Write, 0, n)?;
    for (i, slot) in window.as_mut_slice().iter_mut().enumerate() {
        let digit = digits.get(i).copied().unwrap_or(0);
        *slot = field.from_u64(digit as u64);
    }
    Ok(())
}

fn carry_propagate(raw: Vec<u64>, radix: u32) -> Vec<u32> {
    let mut carry = 0u64;
    let mut out = Vec::with_capacity(raw.len());
    for value in raw {
        let sum = value + carry;
        out.push((sum % radix as u64) as u32);
        carry = sum / radix as u64;
    }
    debug_assert_eq!(carry, 0, "convolution result overflowed its allotted length");
    out
}
