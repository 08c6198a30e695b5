//! The six-step large-`N` NTT: factor `N = N1*N2`, alternating transposes
//! (via [`apfloat_storage::TransposedView`]) with inner row transforms that
//! each run entirely inside one in-memory window (spec.md §4.4).

use std::sync::Arc;

use apfloat_storage::{AccessMode, StorageHandle, TransposedView};
use rayon::prelude::*;

use crate::error::NttError;
use crate::field::NttField;
use crate::radix2;
use crate::transform_context::TransformContext;

/// Run the forward or inverse six-step NTT over `storage` in place.
/// `storage`'s length must equal `n1 * n2`, both powers of two. `block` is
/// the transpose tile size (typically `ctx_cache_burst / size_of::<Elem>()`
/// from [`apfloat_context::Context`]); `parallel` dispatches each stage's
/// independent rows across `rayon`'s global pool when true.
pub fn transform<F: NttField>(
    ctx: &TransformContext<F>,
    storage: &StorageHandle<F::Elem>,
    n1: usize,
    n2: usize,
    inverse: bool,
    block: usize,
    parallel: bool,
) -> Result<(), NttError> {
    let total = n1 * n2;
    if storage.len() != total || !n1.is_power_of_two() || !n2.is_power_of_two() {
        return Err(NttError::InvalidLength {
            length: storage.len(),
            max: total,
        });
    }
    let log_n = total.trailing_zeros();
    let field = ctx.field();

    // Step 1: transpose the initial N2 x N1 layout to N1 x N2.
    let view = TransposedView::new(Arc::clone(storage), n2, n1)?;
    view.transpose_in_place(block)?;
    let view = view.into_swapped();

    // Steps 2-3: inner NTT of each length-N2 row, then multiply by the
    // twiddle omega^(i*j).
    let omega = ctx.root_of_order(log_n, inverse);
    process_rows(storage, n1, n2, parallel, |row_i, buf| {
        radix2::transform(ctx, buf, inverse);
        let mut w = field.pow(omega, row_i as u64);
        for value in buf.iter_mut() {
            *value = field.mul(*value, w);
            w = field.mul(w, omega);
        }
    })?;

    // Step 4: transpose back to N2 x N1.
    view.transpose_in_place(block)?;
    let view = view.into_swapped();

    // Step 5: inner NTT of each length-N1 row.
    process_rows(storage, n2, n1, parallel, |_row_i, buf| {
        radix2::transform(ctx, buf, inverse);
    })?;

    // Step 6: final transpose.
    view.transpose_in_place(block)?;

    if inverse {
        // Each inner radix2::transform(..., inverse=true) already scaled its
        // own row by its own length's inverse, so the two stages together
        // already contributed 1/(N1*N2) = 1/N; nothing further to scale.
    }

    Ok(())
}

fn process_rows<F: NttField>(
    storage: &StorageHandle<F::Elem>,
    rows: usize,
    row_len: usize,
    parallel: bool,
    op: impl Fn(usize, &mut [F::Elem]) + Sync + Send,
) -> Result<(), NttError> {
    let run_one = |row: usize| -> Result<(), NttError> {
        let mut window = storage.get_array(AccessMode::ReadWrite, row * row_len, row_len)?;
        op(row, window.as_mut_slice());
        Ok(())
    };

    if parallel {
        (0..rows).into_par_iter().try_for_each(run_one)
    } else {
        (0..rows).try_for_each(run_one)
    }
}
