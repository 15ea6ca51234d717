#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod arith;
pub mod modulus;
pub mod roots;
pub mod tables;
pub mod transform;

pub use modulus::SmallModulus;
pub use roots::{is_prime, try_minimal_primitive_root, try_primitive_root};
pub use tables::{NttError, NttTables};

/// Smallest supported polynomial modulus degree.
pub const POLY_MOD_DEGREE_MIN: usize = 2;

/// Largest supported polynomial modulus degree.
pub const POLY_MOD_DEGREE_MAX: usize = 32768;
