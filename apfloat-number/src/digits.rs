//! Mantissa digit storage: most-significant-first in [`crate::Apfloat`]
//! (spec.md §3's "mantissa handle"), backed by [`apfloat_storage`] so large
//! mantissas land on disk per the active `Context`'s `memoryThreshold`.

use apfloat_context::Context;
use apfloat_storage::factory::StorageFactory;
use apfloat_storage::{AccessMode, StorageHandle};

/// Read an entire mantissa storage out into a plain most-significant-first
/// `Vec<u32>`. Mantissas are small enough relative to a single operation's
/// working set that materializing them is the right tradeoff against the
/// extra bookkeeping a windowed digit-by-digit algorithm would need.
pub fn read_all(storage: &StorageHandle<u32>) -> Vec<u32> {
    let len = storage.len();
    if len == 0 {
        return Vec::new();
    }
    storage
        .get_array(AccessMode::Read, 0, len)
        .expect("mantissa storage read")
        .as_slice()
        .to_vec()
}

/// Build a new storage from most-significant-first digits, sized and
/// backed per `ctx`'s thresholds.
pub fn from_digits(ctx: &Context, digits: &[u32]) -> StorageHandle<u32> {
    let factory = StorageFactory::new(ctx.clone());
    let storage: StorageHandle<u32> = factory
        .create(digits.len())
        .expect("mantissa storage allocation");
    if !digits.is_empty() {
        let mut window = storage
            .get_array(AccessMode::Write, 0, digits.len())
            .expect("mantissa storage write");
        window.as_mut_slice().copy_from_slice(digits);
    }
    storage
}

/// The shared empty mantissa, for the canonical zero.
pub fn empty(ctx: &Context) -> StorageHandle<u32> {
    from_digits(ctx, &[])
}

/// Reverse a most-significant-first digit vector into the least-significant-
/// first order [`apfloat_convolution::multiply_mantissas`] expects.
pub fn to_lsb(msb: &[u32]) -> Vec<u32> {
    msb.iter().rev().copied().collect()
}

/// Reverse a least-significant-first digit vector (e.g. a convolution
/// result) back into most-significant-first order, dropping leading zero
/// digits (the caller adjusts scale for any dropped digit).
pub fn from_lsb_trimmed(lsb: &[u32]) -> (Vec<u32>, i64) {
    let mut msb: Vec<u32> = lsb.iter().rev().copied().collect();
    let mut shift = 0i64;
    while msb.first() == Some(&0) && msb.len() > 1 {
        msb.remove(0);
        shift -= 1;
    }
    (msb, shift)
}

/// Truncate (no rounding) a most-significant-first digit vector down to
/// `precision` digits, per spec.md §4.6's truncate-back-to-declared-precision
/// rule.
pub fn truncate(digits: &mut Vec<u32>, precision: u64) {
    let precision = precision as usize;
    if digits.len() > precision {
        digits.truncate(precision.max(1));
    }
}

/// Compare two most-significant-first digit sequences of possibly different
/// lengths as if both were zero-padded on the right to the longer length.
pub fn cmp_prefix(a: &[u32], b: &[u32]) -> std::cmp::Ordering {
    let len = a.len().max(b.len());
    for i in 0..len {
        let da = a.get(i).copied().unwrap_or(0);
        let db = b.get(i).copied().unwrap_or(0);
        match da.cmp(&db) {
            std::cmp::Ordering::Equal => continue,
            other => return other,
        }
    }
    std::cmp::Ordering::Equal
}

/// `ctx` convenience: clone-cheap since [`Context`] is `Arc`-backed.
pub fn clone_ctx(ctx: &Context) -> Context {
    ctx.clone()
}

/// Convert a nonnegative integer to most-significant-first digits under
/// `radix`, without leading zeros (`0` itself becomes `[0]`).
pub fn u128_to_digits(mut value: u128, radix: u32) -> Vec<u32> {
    if value == 0 {
        return vec![0];
    }
    let mut lsb = Vec::new();
    while value > 0 {
        lsb.push((value % radix as u128) as u32);
        value /= radix as u128;
    }
    lsb.reverse();
    lsb
}

/// Prepend `count` zero digits to a least-significant-first digit vector,
/// shifting every existing digit to a higher index without changing the
/// value it represents relative to a smaller exponent.
pub fn pad_low(lsb: &mut Vec<u32>, count: usize) {
    if count == 0 {
        return;
    }
    lsb.splice(0..0, std::iter::repeat(0).take(count));
}

/// Extend a least-significant-first digit vector up to `len` by appending
/// (high-end, most significant) zero digits. No-op if already that long.
pub fn pad_high_to_len(lsb: &mut Vec<u32>, len: usize) {
    if lsb.len() < len {
        lsb.resize(len, 0);
    }
}

/// Convert most-significant-first digits under `radix` back to an integer,
/// for values small enough to fit (used by native-double seeding, not by
/// the general mantissa path).
pub fn digits_to_u128(digits: &[u32], radix: u32) -> Option<u128> {
    let mut acc: u128 = 0;
    for &d in digits {
        acc = acc.checked_mul(radix as u128)?.checked_add(d as u128)?;
    }
    Some(acc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_storage() {
        let ctx = Context::builder().build();
        let digits = vec![1, 2, 3, 4];
        let storage = from_digits(&ctx, &digits);
        assert_eq!(read_all(&storage), digits);
    }

    #[test]
    fn lsb_round_trip_trims_leading_zero() {
        let msb = vec![1, 2, 3];
        let lsb = to_lsb(&msb);
        let (back, shift) = from_lsb_trimmed(&lsb);
        assert_eq!(back, msb);
        assert_eq!(shift, 0);
    }

    #[test]
    fn from_lsb_trimmed_drops_leading_zero_digit() {
        let lsb = vec![9, 9, 0]; // msb would be [0, 9, 9]
        let (back, shift) = from_lsb_trimmed(&lsb);
        assert_eq!(back, vec![9, 9]);
        assert_eq!(shift, -1);
    }

    #[test]
    fn integer_digit_round_trip() {
        let digits = u128_to_digits(123_456, 10);
        assert_eq!(digits_to_u128(&digits, 10), Some(123_456));
    }
}
