//! Schoolbook O(L1*L2) multiply, for inputs below the NTT threshold and for
//! element families that never carry an NTT path (spec.md §4.5, §4.1's
//! `Float`/`Double` `builderFactory`).
//!
//! Digits are little-endian (index 0 is the least significant digit), the
//! convention this whole crate uses internally; [`crate::multiply_mantissas`]
//! is the boundary where a caller's most-significant-first mantissa gets
//! reversed.

/// Multiply two little-endian digit sequences in radix `radix`, producing
/// exactly `lhs.len() + rhs.len()` digits (the top digit may be zero).
pub fn multiply(lhs: &[u32], rhs: &[u32], radix: u32) -> Vec<u32> {
    let mut acc = vec![0u64; lhs.len() + rhs.len()];
    for (i, &a) in lhs.iter().enumerate() {
        if a == 0 {
            continue;
        }
        let mut carry = 0u64;
        for (j, &b) in rhs.iter().enumerate() {
            let sum = acc[i + j] + a as u64 * b as u64 + carry;
            acc[i + j] = sum % radix as u64;
            carry = sum / radix as u64;
        }
        let mut k = i + rhs.len();
        while carry > 0 {
            let sum = acc[k] + carry;
            acc[k] = sum % radix as u64;
            carry = sum / radix as u64;
            k += 1;
        }
    }
    acc.into_iter().map(|d| d as u32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_digits(mut n: u64, radix: u32, len: usize) -> Vec<u32> {
        let mut out = vec![0u32; len];
        for slot in out.iter_mut() {
            *slot = (n % radix as u64) as u32;
            n /= radix as u64;
        }
        out
    }

    fn from_digits(digits: &[u32], radix: u32) -> u64 {
        digits.iter().rev().fold(0u64, |acc, &d| acc * radix as u64 + d as u64)
    }

    #[test]
    fn matches_native_multiplication() {
        let radix = 10;
        for &(a, b) in &[(0u64, 0u64), (1, 1), (999, 999), (12345, 6789), (0, 500)] {
            let la = to_digits(a, radix, 5);
            let lb = to_digits(b, radix, 5);
            let product = multiply(&la, &lb, radix);
            assert_eq!(from_digits(&product, radix), a * b);
        }
    }

    #[test]
    fn zero_operand_yields_zero() {
        let product = multiply(&[0, 0, 0], &[9, 9, 9], 10);
        assert!(product.iter().all(|&d| d == 0));
    }

    #[test]
    fn result_length_is_sum_of_input_lengths() {
        let product = multiply(&[1, 2, 3], &[4, 5], 10);
        assert_eq!(product.len(), 5);
    }
}
