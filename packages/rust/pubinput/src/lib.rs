//! SHA-256 public-input hasher, truncated to 253 bits (C14).
//!
//! Binds an ordered list of public field values into the single Groth16
//! public input the on-chain verifier checks. Per spec.md §9's recorded
//! open-question resolution, the `& (2^253 - 1)` truncation is authoritative
//! over a "mod p" reading — it matches the in-circuit `Bits2Num(253)`
//! gadget bit-for-bit, which a modular reduction would not.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

use maci_field::Fp;
use num_bigint::BigUint;
use sha2::{Digest, Sha256};

/// Hash an ordered list of public field values into the truncated
/// public-input integer: 32-byte big-endian encode each value, concatenate,
/// SHA-256, then mask to the low 253 bits.
pub fn hash_public_inputs(values: &[Fp]) -> BigUint {
    let mut hasher = Sha256::new();
    for value in values {
        hasher.update(value.to_bytes_be());
    }
    let digest = hasher.finalize();
    let full = BigUint::from_bytes_be(&digest);
    let mask = (BigUint::from(1u8) << 253u32) - 1u8;
    full & mask
}

/// Same as [`hash_public_inputs`], but returns the result reduced into the
/// SNARK field (the masked value is always `< p`, so this is a lossless
/// re-typing, not a further reduction) for callers that want an [`Fp`]
/// directly.
pub fn hash_public_inputs_as_field(values: &[Fp]) -> Fp {
    Fp::from_biguint_mod(&hash_public_inputs(values))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_is_deterministic() {
        let values = vec![Fp::from_u64(1), Fp::from_u64(2), Fp::from_u64(3)];
        assert_eq!(hash_public_inputs(&values), hash_public_inputs(&values));
    }

    #[test]
    fn output_fits_in_253_bits() {
        let values = vec![Fp::from_u64(u64::MAX)];
        let result = hash_public_inputs(&values);
        assert!(result.bits() <= 253);
    }

    #[test]
    fn differing_inputs_diverge() {
        let a = hash_public_inputs(&[Fp::from_u64(1)]);
        let b = hash_public_inputs(&[Fp::from_u64(2)]);
        assert_ne!(a, b);
    }

    #[test]
    fn order_sensitive() {
        let a = hash_public_inputs(&[Fp::from_u64(1), Fp::from_u64(2)]);
        let b = hash_public_inputs(&[Fp::from_u64(2), Fp::from_u64(1)]);
        assert_ne!(a, b);
    }

    #[test]
    fn field_conversion_is_lossless() {
        let values = vec![Fp::from_u64(7)];
        let as_biguint = hash_public_inputs(&values);
        let as_field = hash_public_inputs_as_field(&values);
        assert_eq!(as_field.to_biguint(), as_biguint);
    }
}
