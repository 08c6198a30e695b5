//! Clamping/rounding rules for the numeric properties in spec.md §4.1.

/// Largest power of two `<= value`. `value` must be nonzero.
pub fn round_down_pow2(value: u64) -> u64 {
    debug_assert!(value > 0);
    1u64 << (63 - value.leading_zeros())
}

/// Largest number of the form `2^a` or `3*2^a` that does not exceed `value`.
///
/// Used for `maxMemoryBlockSize`, which the spec allows to land on either
/// family so that transform lengths admitting a factor-3 stage aren't forced
/// down to the next pure power of two.
pub fn round_down_2a_or_3_2a(value: u64) -> u64 {
    debug_assert!(value > 0);
    let pow2 = round_down_pow2(value);
    let three_pow2 = if value >= 3 {
        let candidate = round_down_pow2(value / 3) * 3;
        if candidate <= value {
            candidate
        } else {
            0
        }
    } else {
        0
    };
    pow2.max(three_pow2)
}

/// Clamp `value` to be at least `min`, then apply `round` to the result.
pub fn clamp_then_round(value: u64, min: u64, round: impl Fn(u64) -> u64) -> u64 {
    round(value.max(min))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pow2_rounding() {
        assert_eq!(round_down_pow2(1), 1);
        assert_eq!(round_down_pow2(63), 32);
        assert_eq!(round_down_pow2(64), 64);
        assert_eq!(round_down_pow2(65), 64);
    }

    #[test]
    fn two_or_three_family_rounding() {
        assert_eq!(round_down_2a_or_3_2a(65536), 65536);
        assert_eq!(round_down_2a_or_3_2a(96), 96); // 3*32
        assert_eq!(round_down_2a_or_3_2a(100), 96);
        assert_eq!(round_down_2a_or_3_2a(127), 96);
        assert_eq!(round_down_2a_or_3_2a(128), 128);
    }

    #[quickcheck_macros::quickcheck]
    fn pow2_result_never_exceeds_input(value: std::num::NonZeroU32) -> bool {
        let value = value.get() as u64;
        round_down_pow2(value) <= value
    }

    #[quickcheck_macros::quickcheck]
    fn two_or_three_result_never_exceeds_input(value: std::num::NonZeroU32) -> bool {
        let value = value.get() as u64;
        round_down_2a_or_3_2a(value) <= value
    }
}
