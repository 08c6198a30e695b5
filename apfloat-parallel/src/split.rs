//! The generic binary-splitting recursion (spec.md §4.7, §5).
//!
//! This is deliberately generic over the accumulated value `V` rather than
//! tied to [`apfloat_number::Apfloat`]: `apfloat_number` depends on this
//! crate to run its own transcendental series, so this crate cannot also
//! depend on `apfloat_number` without a cycle. Every concrete series (the
//! Chudnovsky P/Q/T triple here, a Taylor-series partial sum in
//! `apfloat_number`) supplies its own leaf and combine closures instead.

use apfloat_context::{get_context, Context};

use crate::cancel::CancellationToken;
use crate::error::ParallelError;
use crate::node_set::NodeSet;

/// Recursively accumulate `base(i)` for `i` in `[start, end)` via pairwise
/// `combine`, splitting the range in half and, while the node pool still
/// has more than one worker to hand out, running both halves concurrently
/// via `rayon::join`. Each concurrent branch installs a per-thread
/// [`Context`] override with `number_of_processors` set to its share of the
/// pool for the duration of its recursion, and removes the override before
/// returning (spec.md §5).
///
/// `base` and `combine` are fallible so a caller routing through
/// [`apfloat_convolution::multiply_mantissas`] can propagate a precision
/// error instead of panicking; `token` is sampled at every recursion entry,
/// and once cancelled every in-flight branch returns
/// [`ParallelError::Cancelled`] without attempting further work.
pub fn binary_split<V, B, C>(
    start: u64,
    end: u64,
    nodes: &NodeSet,
    token: &CancellationToken,
    base: &B,
    combine: &C,
) -> Result<V, ParallelError>
where
    V: Send,
    B: Fn(u64) -> Result<V, ParallelError> + Sync,
    C: Fn(V, V) -> Result<V, ParallelError> + Sync,
{
    if !token.is_alive() {
        return Err(ParallelError::Cancelled);
    }
    debug_assert!(end > start);
    if end - start == 1 {
        return base(start);
    }
    let mid = start + (end - start) / 2;
    if nodes.is_single() {
        let left = binary_split(start, mid, nodes, token, base, combine)?;
        let right = binary_split(mid, end, nodes, token, base, combine)?;
        return combine(left, right);
    }

    let (left_nodes, right_nodes) = nodes.split();
    let ambient = get_context();
    let left_ctx = thread_context_for(&ambient, &left_nodes);
    let right_ctx = thread_context_for(&ambient, &right_nodes);

    let (left_result, right_result) = rayon::join(
        || run_with_context(left_ctx, || binary_split(start, mid, &left_nodes, token, base, combine)),
        || run_with_context(right_ctx, || binary_split(mid, end, &right_nodes, token, base, combine)),
    );
    combine(left_result?, right_result?)
}

/// Convenience entry point: builds a fresh [`NodeSet`] from the ambient
/// context's `number_of_processors` and a live [`CancellationToken`].
pub fn binary_split_root<V, B, C>(start: u64, end: u64, base: &B, combine: &C) -> Result<V, ParallelError>
where
    V: Send,
    B: Fn(u64) -> Result<V, ParallelError> + Sync,
    C: Fn(V, V) -> Result<V, ParallelError> + Sync,
{
    let ctx = get_context();
    let nodes = NodeSet::new(ctx.number_of_processors());
    let token = CancellationToken::new();
    binary_split(start, end, &nodes, &token, base, combine)
}

fn thread_context_for(ambient: &Context, nodes: &NodeSet) -> Context {
    ambient
        .to_builder()
        .with_number_of_processors(nodes.total_weight())
        .build()
}

fn run_with_context<T>(ctx: Context, work: impl FnOnce() -> T) -> T {
    apfloat_context::set_thread_context(ctx);
    let result = work();
    apfloat_context::remove_thread_context();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_a_range_sequentially_with_one_node() {
        let nodes = NodeSet::new(1);
        let token = CancellationToken::new();
        let sum = binary_split(0, 10, &nodes, &token, &|i| Ok(i), &|a, b| Ok(a + b)).unwrap();
        assert_eq!(sum, (0..10u64).sum::<u64>());
    }

    #[test]
    fn sums_a_range_across_several_nodes() {
        let nodes = NodeSet::new(4);
        let token = CancellationToken::new();
        let sum = binary_split(0, 37, &nodes, &token, &|i| Ok(i), &|a, b| Ok(a + b)).unwrap();
        assert_eq!(sum, (0..37u64).sum::<u64>());
    }

    #[test]
    fn single_element_range_is_the_base_case() {
        let nodes = NodeSet::new(1);
        let token = CancellationToken::new();
        let value = binary_split(5, 6, &nodes, &token, &|i| Ok(i * 2), &|a, b| Ok(a + b)).unwrap();
        assert_eq!(value, 10);
    }

    #[test]
    fn cancellation_before_entry_short_circuits() {
        let nodes = NodeSet::new(2);
        let token = CancellationToken::new();
        token.cancel();
        let result = binary_split(0, 10, &nodes, &token, &|i| Ok(i), &|a, b| Ok(a + b));
        assert!(matches!(result, Err(ParallelError::Cancelled)));
    }

    #[test]
    fn a_failing_base_case_propagates() {
        let nodes = NodeSet::new(1);
        let token = CancellationToken::new();
        let result: Result<u64, ParallelError> = binary_split(
            0,
            4,
            &nodes,
            &token,
            &|i| if i == 2 { Err(ParallelError::Cancelled) } else { Ok(i) },
            &|a, b| Ok(a + b),
        );
        assert!(result.is_err());
    }
}
