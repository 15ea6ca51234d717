//! Primality testing and primitive-root search
//!
//! Table construction needs a primitive `2n`-th root of unity modulo `q`,
//! and it needs to reject moduli that are not prime or whose multiplicative
//! group does not contain a subgroup of order `2n`. Both checks run once
//! per `(n, q)` pair, never on the transform path.

use crate::modulus::SmallModulus;
use rand::Rng;

/// Miller-Rabin witnesses: deterministic for every 64-bit input.
const WITNESSES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/// Deterministic primality test for 64-bit values.
///
/// Miller-Rabin with a fixed witness set that is exhaustive below 2^64,
/// so the answer is exact, not probabilistic. Trial division would take
/// ~2^30 steps for the 60-bit primes used in practice.
pub fn is_prime(value: u64) -> bool {
    if value < 2 {
        return false;
    }
    for &p in &WITNESSES {
        if value == p {
            return true;
        }
        if value % p == 0 {
            return false;
        }
    }

    // value - 1 = odd * 2^exponent
    let mut odd = value - 1;
    let mut exponent = 0u32;
    while odd & 1 == 0 {
        odd >>= 1;
        exponent += 1;
    }

    'witness: for &witness in &WITNESSES {
        let mut x = pow_mod_u64(witness, odd, value);
        if x == 1 || x == value - 1 {
            continue;
        }
        for _ in 1..exponent {
            x = mul_mod_u64(x, x, value);
            if x == value - 1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

// Plain 128-bit-product arithmetic: primality runs on candidate values
// that have no Barrett constant yet.
#[inline]
fn mul_mod_u64(a: u64, b: u64, modulus: u64) -> u64 {
    (a as u128 * b as u128 % modulus as u128) as u64
}

fn pow_mod_u64(base: u64, exponent: u64, modulus: u64) -> u64 {
    let mut base = base % modulus;
    let mut exponent = exponent;
    let mut result = 1u64;
    while exponent > 0 {
        if exponent & 1 == 1 {
            result = mul_mod_u64(result, base, modulus);
        }
        base = mul_mod_u64(base, base, modulus);
        exponent >>= 1;
    }
    result
}

/// Whether `root` generates the order-`group_size` subgroup of `Z_q^*`.
///
/// For a power-of-two `group_size` it suffices to check
/// `root^(group_size / 2) ≡ -1 (mod q)`.
fn is_primitive_root(root: u64, group_size: u64, modulus: &SmallModulus) -> bool {
    if root == 0 {
        return false;
    }
    debug_assert!(group_size >= 2 && group_size.is_power_of_two());
    modulus.pow_mod(root, group_size >> 1) == modulus.value() - 1
}

/// Find some primitive `group_size`-th root of unity modulo `q`.
///
/// Verifies that `q` is prime and that `group_size` divides `q - 1`, then
/// raises random group elements to the power `(q - 1) / group_size` until
/// one of them has order exactly `group_size`. Each attempt succeeds with
/// probability 1/2, so the attempt bound is never reached for valid
/// parameters.
pub fn try_primitive_root(group_size: u64, modulus: &SmallModulus) -> Option<u64> {
    debug_assert!(group_size.is_power_of_two());
    if !is_prime(modulus.value()) {
        return None;
    }
    let size_entire_group = modulus.value() - 1;
    if size_entire_group % group_size != 0 {
        return None;
    }
    let size_quotient_group = size_entire_group / group_size;

    let mut rng = rand::thread_rng();
    for _ in 0..100 {
        let candidate = rng.gen_range(1..modulus.value());
        let root = modulus.pow_mod(candidate, size_quotient_group);
        if is_primitive_root(root, group_size, modulus) {
            return Some(root);
        }
    }
    None
}

/// Find the numerically smallest primitive `group_size`-th root of unity.
///
/// The primitive roots of a cyclic subgroup of power-of-two order are
/// exactly the odd powers of any one of them, so walking
/// `root, root^3, root^5, ...` and keeping the minimum visits them all.
/// The result depends only on `(group_size, q)`.
pub fn try_minimal_primitive_root(group_size: u64, modulus: &SmallModulus) -> Option<u64> {
    let root = try_primitive_root(group_size, modulus)?;
    let generator_sq = modulus.mul_mod(root, root);

    let mut current = root;
    let mut minimal = root;
    for _ in 0..group_size / 2 {
        if current < minimal {
            minimal = current;
        }
        current = modulus.mul_mod(current, generator_sq);
    }
    Some(minimal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_prime() {
        assert!(is_prime(2));
        assert!(is_prime(3));
        assert!(is_prime(17));
        assert!(is_prime(97));
        assert!(is_prime(7681));
        assert!(is_prime(12289));
        assert!(is_prime(998244353));
        assert!(is_prime(1152921504606584833));

        assert!(!is_prime(0));
        assert!(!is_prime(1));
        assert!(!is_prime(15));
        assert!(!is_prime(25));
        assert!(!is_prime(561)); // Carmichael number
        assert!(!is_prime(1152921504606584832));
    }

    #[test]
    fn test_minimal_primitive_root_small() {
        let modulus = SmallModulus::new(17);
        // Order-4 subgroup of Z_17^*: {4, 13}, minimum 4
        assert_eq!(try_minimal_primitive_root(4, &modulus), Some(4));
        // Order-8: 2^4 = 16 ≡ -1, and no smaller candidate qualifies
        assert_eq!(try_minimal_primitive_root(8, &modulus), Some(2));
        // Order-16: smallest generator of Z_17^* is 3
        assert_eq!(try_minimal_primitive_root(16, &modulus), Some(3));
    }

    #[test]
    fn test_primitive_root_properties() {
        let modulus = SmallModulus::new(998244353);
        let group_size = 2048u64;
        let root = try_primitive_root(group_size, &modulus)
            .expect("998244353 ≡ 1 mod 2048 must admit a 2048th root");

        assert_eq!(modulus.pow_mod(root, group_size), 1, "root^(2n) must be 1");
        assert_eq!(
            modulus.pow_mod(root, group_size / 2),
            modulus.value() - 1,
            "root^n must be -1"
        );
    }

    #[test]
    fn test_minimal_root_is_deterministic() {
        // Random sampling inside the search must not leak into the result
        let modulus = SmallModulus::new(7681);
        let first = try_minimal_primitive_root(512, &modulus);
        for _ in 0..5 {
            assert_eq!(try_minimal_primitive_root(512, &modulus), first);
        }
    }

    #[test]
    fn test_no_root_cases() {
        // 32 does not divide 17 - 1 = 16
        let modulus = SmallModulus::new(17);
        assert_eq!(try_primitive_root(32, &modulus), None);

        // 15 is not prime
        let modulus = SmallModulus::new(15);
        assert_eq!(try_primitive_root(4, &modulus), None);
        assert_eq!(try_minimal_primitive_root(4, &modulus), None);
    }
}
