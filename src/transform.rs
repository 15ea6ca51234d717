//! In-place negacyclic NTT via Harvey butterflies
//!
//! Both directions use Shoup multiplication: with `w` and its companion
//! `w' = floor(w * 2^64 / q)` precomputed, `w * y mod q` becomes
//! `w * y - mul_hi(w', y) * q` in wrapping 64-bit arithmetic, landing in
//! `[0, 2q)` for any 64-bit `y`. Reductions are lazy:
//!
//! - forward: inputs in `[0, 4q)`, outputs in `[0, 4q)`, bit-reversed order;
//! - inverse: inputs in `[0, 2q)` bit-reversed, outputs in `[0, 2q)`,
//!   natural order, already scaled by `n^{-1}`.
//!
//! Keeping values below `4q` instead of `q` removes one reduction per
//! butterfly; with `q < 2^62` nothing can wrap. Callers are responsible
//! for presenting inputs in the declared ranges; the transforms do not
//! check them.

use crate::arith::{div_u128_by_u64, mul_hi};
use crate::tables::NttTables;

/// Forward butterfly: `(x, y)` with `x < 4q`, any 64-bit `y`, to
/// `(x + w*y, x - w*y)` in `[0, 4q)`.
#[inline(always)]
fn forward_butterfly(
    x: u64,
    y: u64,
    w: u64,
    w_shoup: u64,
    modulus: u64,
    two_times_modulus: u64,
) -> (u64, u64) {
    let tx = x - (two_times_modulus & ((x >= two_times_modulus) as u64).wrapping_neg());
    let q = mul_hi(w_shoup, y);
    let q = w.wrapping_mul(y).wrapping_sub(q.wrapping_mul(modulus));
    (tx + q, tx + two_times_modulus - q)
}

/// Inverse butterfly: `(x, y)` in `[0, 2q)` to `(x + y, (x - y) * w)`
/// in `[0, 2q)`.
#[inline(always)]
fn inverse_butterfly(
    x: u64,
    y: u64,
    w: u64,
    w_shoup: u64,
    modulus: u64,
    two_times_modulus: u64,
) -> (u64, u64) {
    let mut tx = x + y;
    tx -= two_times_modulus & ((tx >= two_times_modulus) as u64).wrapping_neg();
    let ty = x + two_times_modulus - y;
    let q = mul_hi(w_shoup, ty);
    (tx, ty.wrapping_mul(w).wrapping_sub(q.wrapping_mul(modulus)))
}

impl NttTables {
    /// In-place forward negacyclic NTT, lazy reduction.
    ///
    /// Inputs must lie in `[0, 4q)`; outputs lie in `[0, 4q)` and are in
    /// bit-reversed index order: `a'[j] ≡ a(root^(2 bitrev(j) + 1)) mod q`.
    pub fn forward_ntt_lazy(&self, operand: &mut [u64]) {
        debug_assert!(self.initialized, "tables not initialized");
        debug_assert_eq!(operand.len(), self.coeff_count, "operand length must equal n");

        let modulus = self.modulus.value();
        let two_times_modulus = modulus << 1;
        let n = self.coeff_count;

        let mut t = n >> 1;
        let mut m = 1;
        while m < n {
            let mut j1 = 0;
            if t >= 4 {
                for i in 0..m {
                    let j2 = j1 + t;
                    let w = self.root_powers[m + i];
                    let w_shoup = self.scaled_root_powers[m + i];

                    let mut j = j1;
                    while j < j2 {
                        let (x, y) = forward_butterfly(
                            operand[j], operand[j + t], w, w_shoup, modulus, two_times_modulus,
                        );
                        operand[j] = x;
                        operand[j + t] = y;

                        let (x, y) = forward_butterfly(
                            operand[j + 1], operand[j + 1 + t], w, w_shoup, modulus, two_times_modulus,
                        );
                        operand[j + 1] = x;
                        operand[j + 1 + t] = y;

                        let (x, y) = forward_butterfly(
                            operand[j + 2], operand[j + 2 + t], w, w_shoup, modulus, two_times_modulus,
                        );
                        operand[j + 2] = x;
                        operand[j + 2 + t] = y;

                        let (x, y) = forward_butterfly(
                            operand[j + 3], operand[j + 3 + t], w, w_shoup, modulus, two_times_modulus,
                        );
                        operand[j + 3] = x;
                        operand[j + 3 + t] = y;

                        j += 4;
                    }
                    j1 += t << 1;
                }
            } else {
                for i in 0..m {
                    let j2 = j1 + t;
                    let w = self.root_powers[m + i];
                    let w_shoup = self.scaled_root_powers[m + i];

                    for j in j1..j2 {
                        let (x, y) = forward_butterfly(
                            operand[j], operand[j + t], w, w_shoup, modulus, two_times_modulus,
                        );
                        operand[j] = x;
                        operand[j + t] = y;
                    }
                    j1 += t << 1;
                }
            }
            t >>= 1;
            m <<= 1;
        }
    }

    /// In-place forward negacyclic NTT with fully reduced outputs in `[0, q)`.
    pub fn forward_ntt(&self, operand: &mut [u64]) {
        self.forward_ntt_lazy(operand);
        let modulus = self.modulus.value();
        let two_times_modulus = modulus << 1;
        for value in operand.iter_mut() {
            if *value >= two_times_modulus {
                *value -= two_times_modulus;
            }
            if *value >= modulus {
                *value -= modulus;
            }
        }
    }

    /// In-place inverse negacyclic NTT, lazy reduction.
    ///
    /// Inputs must lie in `[0, 2q)` in bit-reversed order; outputs lie in
    /// `[0, 2q)` in natural order, scaled by `n^{-1} mod q`. The last
    /// butterfly layer is fused with the scaling.
    pub fn inverse_ntt_lazy(&self, operand: &mut [u64]) {
        debug_assert!(self.initialized, "tables not initialized");
        debug_assert_eq!(operand.len(), self.coeff_count, "operand length must equal n");

        let modulus = self.modulus.value();
        let two_times_modulus = modulus << 1;
        let n = self.coeff_count;

        // The reordered tables are consumed front to back; one root per
        // butterfly block.
        let mut root_index = 1;
        let mut t = 1;
        let mut m = n >> 1;
        while m > 1 {
            let mut j1 = 0;
            if t >= 4 {
                for _ in 0..m {
                    let j2 = j1 + t;
                    let w = self.inv_root_powers[root_index];
                    let w_shoup = self.scaled_inv_root_powers[root_index];
                    root_index += 1;

                    let mut j = j1;
                    while j < j2 {
                        let (x, y) = inverse_butterfly(
                            operand[j], operand[j + t], w, w_shoup, modulus, two_times_modulus,
                        );
                        operand[j] = x;
                        operand[j + t] = y;

                        let (x, y) = inverse_butterfly(
                            operand[j + 1], operand[j + 1 + t], w, w_shoup, modulus, two_times_modulus,
                        );
                        operand[j + 1] = x;
                        operand[j + 1 + t] = y;

                        let (x, y) = inverse_butterfly(
                            operand[j + 2], operand[j + 2 + t], w, w_shoup, modulus, two_times_modulus,
                        );
                        operand[j + 2] = x;
                        operand[j + 2 + t] = y;

                        let (x, y) = inverse_butterfly(
                            operand[j + 3], operand[j + 3 + t], w, w_shoup, modulus, two_times_modulus,
                        );
                        operand[j + 3] = x;
                        operand[j + 3 + t] = y;

                        j += 4;
                    }
                    j1 += t << 1;
                }
            } else {
                for _ in 0..m {
                    let j2 = j1 + t;
                    let w = self.inv_root_powers[root_index];
                    let w_shoup = self.scaled_inv_root_powers[root_index];
                    root_index += 1;

                    for j in j1..j2 {
                        let (x, y) = inverse_butterfly(
                            operand[j], operand[j + t], w, w_shoup, modulus, two_times_modulus,
                        );
                        operand[j] = x;
                        operand[j + t] = y;
                    }
                    j1 += t << 1;
                }
            }
            t <<= 1;
            m >>= 1;
        }

        // Final layer, fused with multiplication by n^{-1}. The Shoup
        // companions of inv_n and inv_n * w are cheap to derive here and
        // not worth a table slot.
        let inv_n = self.inv_degree_modulo;
        let w = self.inv_root_powers[root_index];
        let inv_n_w = self.modulus.mul_mod(inv_n, w);
        let (quotient, _) = div_u128_by_u64((inv_n as u128) << 64, modulus);
        let inv_n_shoup = quotient as u64;
        let (quotient, _) = div_u128_by_u64((inv_n_w as u128) << 64, modulus);
        let inv_n_w_shoup = quotient as u64;

        let half = n >> 1;
        for j in 0..half {
            let x = operand[j];
            let y = operand[j + half];

            let mut tx = x + y;
            tx -= two_times_modulus & ((tx >= two_times_modulus) as u64).wrapping_neg();
            let ty = x + two_times_modulus - y;

            let q = mul_hi(inv_n_shoup, tx);
            operand[j] = inv_n.wrapping_mul(tx).wrapping_sub(q.wrapping_mul(modulus));
            let q = mul_hi(inv_n_w_shoup, ty);
            operand[j + half] = inv_n_w.wrapping_mul(ty).wrapping_sub(q.wrapping_mul(modulus));
        }
    }

    /// In-place inverse negacyclic NTT with fully reduced outputs in `[0, q)`.
    pub fn inverse_ntt(&self, operand: &mut [u64]) {
        self.inverse_ntt_lazy(operand);
        let modulus = self.modulus.value();
        for value in operand.iter_mut() {
            if *value >= modulus {
                *value -= modulus;
            }
        }
    }
}
