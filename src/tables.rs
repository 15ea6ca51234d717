//! Precomputed NTT tables
//!
//! An [`NttTables`] object parameterizes the negacyclic transforms for one
//! `(n, q)` pair: the powers of a minimal primitive `2n`-th root of unity
//! in bit-reversed order, their Shoup companions `floor(w * 2^64 / q)`, the
//! inverse-root powers reshuffled into the order the inverse transform
//! reads them, and `n^{-1} mod q` for the fused final scaling.
//!
//! Construction is a pure function of `(n, q)`: building the same tables
//! twice yields identical contents. Once built, tables are immutable and
//! safe to share across threads.

use crate::arith::{div2_mod, div_u128_by_u64, reverse_bits, try_inv_mod};
use crate::modulus::SmallModulus;
use crate::roots::try_minimal_primitive_root;
use crate::{POLY_MOD_DEGREE_MAX, POLY_MOD_DEGREE_MIN};
use std::fmt;

/// Reasons table construction can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum NttError {
    /// The coefficient-count power is outside the supported degree range.
    CoeffCountPowerOutOfRange {
        /// The rejected power.
        coeff_count_power: usize,
    },

    /// No primitive root of the requested order exists: the modulus is not
    /// prime, or `q ≢ 1 (mod 2n)`.
    NoPrimitiveRoot {
        /// The modulus value.
        modulus: u64,
        /// The requested root order `2n`.
        order: u64,
    },

    /// A required modular inverse does not exist.
    NoModularInverse {
        /// The non-invertible value.
        value: u64,
        /// The modulus value.
        modulus: u64,
    },
}

impl fmt::Display for NttError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NttError::CoeffCountPowerOutOfRange { coeff_count_power } => {
                write!(f, "coefficient count power {} out of range", coeff_count_power)
            }
            NttError::NoPrimitiveRoot { modulus, order } => {
                write!(f, "no primitive root of order {} modulo {}", order, modulus)
            }
            NttError::NoModularInverse { value, modulus } => {
                write!(f, "{} has no inverse modulo {}", value, modulus)
            }
        }
    }
}

impl std::error::Error for NttError {}

/// Precomputed tables for the negacyclic NTT of degree `n = 2^k` modulo `q`.
///
/// Holds six length-`n` arrays:
/// - `root_powers[i] = root^bitrev(i) mod q` and its Shoup companion;
/// - inverse-root powers and companions, reordered so the inverse
///   transform reads them sequentially (slot 0 feeds the final merge);
/// - halved inverse-root powers and companions, kept in bit-reversed
///   order, for the fused-halving formulation of the inverse butterfly.
#[derive(Clone, Debug)]
pub struct NttTables {
    pub(crate) coeff_count_power: usize,
    pub(crate) coeff_count: usize,
    pub(crate) modulus: SmallModulus,
    pub(crate) root: u64,
    pub(crate) root_powers: Vec<u64>,
    pub(crate) scaled_root_powers: Vec<u64>,
    pub(crate) inv_root_powers: Vec<u64>,
    pub(crate) scaled_inv_root_powers: Vec<u64>,
    pub(crate) inv_root_powers_div_two: Vec<u64>,
    pub(crate) scaled_inv_root_powers_div_two: Vec<u64>,
    pub(crate) inv_degree_modulo: u64,
    pub(crate) initialized: bool,
}

impl NttTables {
    /// Build tables for degree `n = 2^coeff_count_power` modulo `modulus`.
    ///
    /// Fails when the power is outside `[1, 15]`, when the modulus is not
    /// an odd prime with `q ≡ 1 (mod 2n)`, or when a required inverse
    /// does not exist.
    pub fn new(coeff_count_power: usize, modulus: &SmallModulus) -> Result<Self, NttError> {
        let power_min = POLY_MOD_DEGREE_MIN.trailing_zeros() as usize;
        let power_max = POLY_MOD_DEGREE_MAX.trailing_zeros() as usize;
        if coeff_count_power < power_min || coeff_count_power > power_max {
            return Err(NttError::CoeffCountPowerOutOfRange { coeff_count_power });
        }

        let coeff_count = 1usize << coeff_count_power;
        let group_size = 2 * coeff_count as u64;

        let root = try_minimal_primitive_root(group_size, modulus).ok_or(
            NttError::NoPrimitiveRoot {
                modulus: modulus.value(),
                order: group_size,
            },
        )?;
        let inv_root = try_inv_mod(root, modulus.value()).ok_or(NttError::NoModularInverse {
            value: root,
            modulus: modulus.value(),
        })?;

        // Powers of root and root^{-1} mod q in bit-scrambled order,
        // with the Shoup companion of every entry.
        let mut root_powers = vec![0u64; coeff_count];
        let mut scaled_root_powers = vec![0u64; coeff_count];
        Self::powers_of_primitive_root(modulus, coeff_count_power, root, &mut root_powers);
        Self::scale_powers_of_primitive_root(modulus, &root_powers, &mut scaled_root_powers);

        let mut inv_root_powers = vec![0u64; coeff_count];
        let mut scaled_inv_root_powers = vec![0u64; coeff_count];
        Self::powers_of_primitive_root(modulus, coeff_count_power, inv_root, &mut inv_root_powers);
        Self::scale_powers_of_primitive_root(modulus, &inv_root_powers, &mut scaled_inv_root_powers);

        // Halved inverse powers, taken before the reorder below so they
        // stay in bit-scrambled order.
        let mut inv_root_powers_div_two = vec![0u64; coeff_count];
        for (halved, &power) in inv_root_powers_div_two.iter_mut().zip(inv_root_powers.iter()) {
            *halved = div2_mod(power, modulus.value());
        }
        let mut scaled_inv_root_powers_div_two = vec![0u64; coeff_count];
        Self::scale_powers_of_primitive_root(
            modulus,
            &inv_root_powers_div_two,
            &mut scaled_inv_root_powers_div_two,
        );

        // Reorder the inverse tables so the inverse transform walks them
        // sequentially. Slot 0 is reserved for the root the final merge
        // layer consumes.
        let inv_root_powers = Self::reorder_for_inverse(&inv_root_powers);
        let scaled_inv_root_powers = Self::reorder_for_inverse(&scaled_inv_root_powers);

        let inv_degree_modulo = try_inv_mod(coeff_count as u64, modulus.value()).ok_or(
            NttError::NoModularInverse {
                value: coeff_count as u64,
                modulus: modulus.value(),
            },
        )?;

        Ok(Self {
            coeff_count_power,
            coeff_count,
            modulus: *modulus,
            root,
            root_powers,
            scaled_root_powers,
            inv_root_powers,
            scaled_inv_root_powers,
            inv_root_powers_div_two,
            scaled_inv_root_powers_div_two,
            inv_degree_modulo,
            initialized: true,
        })
    }

    /// Fill `destination[bitrev(i)] = root^i mod q`, computed incrementally
    /// so each entry costs one modular multiplication.
    fn powers_of_primitive_root(
        modulus: &SmallModulus,
        coeff_count_power: usize,
        root: u64,
        destination: &mut [u64],
    ) {
        destination[0] = 1;
        let mut previous = 1u64;
        for i in 1..destination.len() {
            let power = modulus.mul_mod(previous, root);
            destination[reverse_bits(i, coeff_count_power)] = power;
            previous = power;
        }
    }

    /// Fill `destination[i] = floor(input[i] * 2^64 / q)`, the Shoup
    /// companion of every table entry.
    fn scale_powers_of_primitive_root(
        modulus: &SmallModulus,
        input: &[u64],
        destination: &mut [u64],
    ) {
        for (scaled, &power) in destination.iter_mut().zip(input.iter()) {
            let (quotient, _) = div_u128_by_u64((power as u128) << 64, modulus.value());
            *scaled = quotient as u64;
        }
    }

    /// Copy the blocks `powers[m..2m)` for `m = n/2, n/4, ..., 1` into
    /// consecutive positions starting at index 1. This is the order the
    /// inverse transform consumes roots in; index 0 stays free for the
    /// final merge root.
    fn reorder_for_inverse(powers: &[u64]) -> Vec<u64> {
        let n = powers.len();
        let mut reordered = vec![0u64; n];
        let mut offset = 1;
        let mut m = n >> 1;
        while m > 0 {
            reordered[offset..offset + m].copy_from_slice(&powers[m..2 * m]);
            offset += m;
            m >>= 1;
        }
        reordered
    }

    /// Polynomial degree `n`.
    #[inline]
    pub fn coeff_count(&self) -> usize {
        self.coeff_count
    }

    /// `log2(n)`.
    #[inline]
    pub fn coeff_count_power(&self) -> usize {
        self.coeff_count_power
    }

    /// The modulus the tables were built for.
    #[inline]
    pub fn modulus(&self) -> &SmallModulus {
        &self.modulus
    }

    /// The minimal primitive `2n`-th root of unity.
    #[inline]
    pub fn root(&self) -> u64 {
        self.root
    }

    /// `n^{-1} mod q`.
    #[inline]
    pub fn inv_degree_modulo(&self) -> u64 {
        self.inv_degree_modulo
    }

    /// Whether construction completed. Always true for a table obtained
    /// from [`NttTables::new`].
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// `root^bitrev(index) mod q`.
    #[inline]
    pub fn root_powers(&self, index: usize) -> u64 {
        self.root_powers[index]
    }

    /// Shoup companion of [`root_powers`](Self::root_powers).
    #[inline]
    pub fn scaled_root_powers(&self, index: usize) -> u64 {
        self.scaled_root_powers[index]
    }

    /// Inverse-root power in the sequential inverse-transform layout.
    #[inline]
    pub fn inv_root_powers(&self, index: usize) -> u64 {
        self.inv_root_powers[index]
    }

    /// Shoup companion of [`inv_root_powers`](Self::inv_root_powers).
    #[inline]
    pub fn scaled_inv_root_powers(&self, index: usize) -> u64 {
        self.scaled_inv_root_powers[index]
    }

    /// Halved inverse-root power, bit-reversed order.
    #[inline]
    pub fn inv_root_powers_div_two(&self, index: usize) -> u64 {
        self.inv_root_powers_div_two[index]
    }

    /// Shoup companion of [`inv_root_powers_div_two`](Self::inv_root_powers_div_two).
    #[inline]
    pub fn scaled_inv_root_powers_div_two(&self, index: usize) -> u64 {
        self.scaled_inv_root_powers_div_two[index]
    }
}
