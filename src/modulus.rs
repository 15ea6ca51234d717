//! Prime modulus descriptor with Barrett precomputation
//!
//! A [`SmallModulus`] packages a modulus `q < 2^62` together with
//! `floor(2^128 / q)`, which turns every later reduction of a 128-bit
//! product into two multiplies and a handful of adds. Transforms and table
//! construction never divide by `q` at runtime.

use crate::arith::mul_hi;

/// An immutable modulus `1 < q < 2^62` with its Barrett constant.
///
/// The constant is `floor(2^128 / q)` stored as two 64-bit words plus the
/// division remainder. Copying is cheap; tables embed the descriptor by
/// value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SmallModulus {
    value: u64,
    const_ratio: [u64; 3],
    bit_count: u32,
}

impl SmallModulus {
    /// Create a descriptor for `value`.
    ///
    /// # Panics
    /// Panics if `value <= 1` or `value >= 2^62`.
    pub fn new(value: u64) -> Self {
        assert!(value > 1, "modulus must be greater than 1");
        assert!(value < (1u64 << 62), "modulus must be smaller than 2^62");

        // floor(2^128 / value): u128 cannot hold 2^128, so divide
        // u128::MAX and patch the off-by-one.
        let mut quotient = u128::MAX / value as u128;
        let mut remainder = (u128::MAX % value as u128) as u64 + 1;
        if remainder == value {
            quotient += 1;
            remainder = 0;
        }

        Self {
            value,
            const_ratio: [quotient as u64, (quotient >> 64) as u64, remainder],
            bit_count: 64 - value.leading_zeros(),
        }
    }

    /// The modulus value `q`.
    #[inline(always)]
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Number of significant bits in `q`.
    #[inline]
    pub fn bit_count(&self) -> u32 {
        self.bit_count
    }

    /// The Barrett constant `floor(2^128 / q)` as `[low, high, remainder]`.
    #[inline]
    pub fn const_ratio(&self) -> &[u64; 3] {
        &self.const_ratio
    }

    /// Reduce an arbitrary 64-bit value modulo `q`.
    #[inline]
    pub fn reduce(&self, value: u64) -> u64 {
        self.reduce_u128(value as u128)
    }

    /// Barrett reduction of a 128-bit value modulo `q`.
    ///
    /// Multiplies the input by `floor(2^128 / q)`, keeps the top word of
    /// the 256-bit product as the quotient estimate, and corrects with at
    /// most one conditional subtraction. Valid for any input below `q * 2^64`,
    /// which covers every product of two reduced operands.
    #[inline]
    pub fn reduce_u128(&self, value: u128) -> u64 {
        let z0 = value as u64;
        let z1 = (value >> 64) as u64;
        let cr0 = self.const_ratio[0];
        let cr1 = self.const_ratio[1];

        // Round 1: carry from z0 * cr0, full product z0 * cr1
        let carry = mul_hi(z0, cr0);
        let product = z0 as u128 * cr1 as u128;
        let (tmp1, overflow) = (product as u64).overflowing_add(carry);
        let tmp3 = (product >> 64) as u64 + overflow as u64;

        // Round 2: full product z1 * cr0
        let product = z1 as u128 * cr0 as u128;
        let (_, overflow) = tmp1.overflowing_add(product as u64);
        let carry = (product >> 64) as u64 + overflow as u64;

        // Top word of the 256-bit product is the quotient estimate
        let quotient = z1.wrapping_mul(cr1).wrapping_add(tmp3).wrapping_add(carry);

        let reduced = z0.wrapping_sub(quotient.wrapping_mul(self.value));
        if reduced >= self.value {
            reduced - self.value
        } else {
            reduced
        }
    }

    /// Modular multiplication `a * b mod q` for reduced operands.
    #[inline(always)]
    pub fn mul_mod(&self, a: u64, b: u64) -> u64 {
        debug_assert!(a < self.value && b < self.value);
        self.reduce_u128(a as u128 * b as u128)
    }

    /// Modular exponentiation by square-and-multiply.
    pub fn pow_mod(&self, base: u64, exponent: u64) -> u64 {
        let mut base = self.reduce(base);
        let mut exponent = exponent;
        let mut result = 1u64;
        while exponent > 0 {
            if exponent & 1 == 1 {
                result = self.mul_mod(result, base);
            }
            base = self.mul_mod(base, base);
            exponent >>= 1;
        }
        result
    }
}
