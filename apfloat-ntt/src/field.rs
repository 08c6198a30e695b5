//! A uniform modular-arithmetic interface over the two `apfloat_modmath`
//! element families, so the transform code is written once and
//! monomorphized per family (spec.md §4.3/§4.4 boundary).

use apfloat_modmath::{Modulus32, Modulus64};
use apfloat_storage::StorageElement;

/// A prime field usable as an NTT modulus, abstracting over the 32-bit and
/// 64-bit element families.
pub trait NttField: Copy + Send + Sync + 'static {
    /// The machine word an element of this field is stored as.
    type Elem: StorageElement;

    /// `(a + b) mod p`.
    fn add(self, a: Self::Elem, b: Self::Elem) -> Self::Elem;
    /// `(a - b) mod p`.
    fn sub(self, a: Self::Elem, b: Self::Elem) -> Self::Elem;
    /// `(a * b) mod p`.
    fn mul(self, a: Self::Elem, b: Self::Elem) -> Self::Elem;
    /// `-a mod p`.
    fn neg(self, a: Self::Elem) -> Self::Elem;
    /// The modulus, widened to `u64` for generic exponentiation bookkeeping.
    fn modulus(self) -> u64;
    /// Lift a `u64` residue (already reduced, or not -- implementers reduce)
    /// into the field's element representation.
    fn from_u64(self, value: u64) -> Self::Elem;
    /// Widen a field element back to `u64`.
    fn to_u64(self, value: Self::Elem) -> u64;

    /// `base^exp mod p`, by repeated squaring.
    fn pow(self, base: Self::Elem, mut exp: u64) -> Self::Elem {
        let mut result = self.from_u64(1);
        let mut base = base;
        while exp > 0 {
            if exp & 1 == 1 {
                result = self.mul(result, base);
            }
            base = self.mul(base, base);
            exp >>= 1;
        }
        result
    }

    /// The multiplicative inverse of `a`, via Fermat's little theorem
    /// (`a^(p-2) mod p`); valid because every NTT modulus here is prime.
    fn inverse(self, a: Self::Elem) -> Self::Elem {
        self.pow(a, self.modulus() - 2)
    }
}

impl NttField for Modulus32 {
    type Elem = u32;

    fn add(self, a: u32, b: u32) -> u32 {
        Modulus32::add(self, a, b)
    }
    fn sub(self, a: u32, b: u32) -> u32 {
        Modulus32::sub(self, a, b)
    }
    fn mul(self, a: u32, b: u32) -> u32 {
        Modulus32::mul(self, a, b)
    }
    fn neg(self, a: u32) -> u32 {
        Modulus32::neg(self, a)
    }
    fn modulus(self) -> u64 {
        self.p as u64
    }
    fn from_u64(self, value: u64) -> u32 {
        (value % self.p as u64) as u32
    }
    fn to_u64(self, value: u32) -> u64 {
        value as u64
    }
}

impl NttField for Modulus64 {
    type Elem = u64;

    fn add(self, a: u64, b: u64) -> u64 {
        Modulus64::add(self, a, b)
    }
    fn sub(self, a: u64, b: u64) -> u64 {
        Modulus64::sub(self, a, b)
    }
    fn mul(self, a: u64, b: u64) -> u64 {
        Modulus64::mul(self, a, b)
    }
    fn neg(self, a: u64) -> u64 {
        Modulus64::neg(self, a)
    }
    fn modulus(self) -> u64 {
        self.p
    }
    fn from_u64(self, value: u64) -> u64 {
        value % self.p
    }
    fn to_u64(self, value: u64) -> u64 {
        value
    }
}
