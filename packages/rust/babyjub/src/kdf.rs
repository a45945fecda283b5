//! BLAKE2b-512-based private-key derivation (C4)

use crate::curve::Scalar;
use blake2::{digest::consts::U64, Blake2b, Digest};
use rand::{CryptoRng, Rng};

/// BLAKE2b with a 512-bit (64-byte) digest.
type Blake2b512 = Blake2b<U64>;

/// Derive a Baby-Jubjub private-key scalar from an arbitrary-length seed.
///
/// `h = BLAKE2b-512(seed)`; the low 32 bytes are RFC-8032-style clamped
/// (`h[0] &= 0xF8; h[31] &= 0x7F; h[31] |= 0x40`) and interpreted as a
/// little-endian integer, reduced mod the Baby-Jubjub subgroup order `l`.
/// Deterministic: the same seed always yields the same key.
pub fn derive_private_key(seed: &[u8]) -> Scalar {
    let mut hasher = Blake2b512::new();
    hasher.update(seed);
    let h = hasher.finalize();

    let mut low = [0u8; 32];
    low.copy_from_slice(&h[0..32]);
    low[0] &= 0xF8;
    low[31] &= 0x7F;
    low[31] |= 0x40;

    Scalar::from_le_bytes_mod_order(&low)
}

/// Generate a fresh, random private-key scalar from 32 bytes of CSPRNG
/// output used as the KDF seed.
pub fn generate_random_private_key<R: Rng + CryptoRng>(rng: &mut R) -> Scalar {
    let mut seed = [0u8; 32];
    rng.fill_bytes(&mut seed);
    derive_private_key(&seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let seed = b"correct horse battery staple";
        assert_eq!(derive_private_key(seed), derive_private_key(seed));
    }

    #[test]
    fn different_seeds_diverge() {
        assert_ne!(derive_private_key(b"seed-a"), derive_private_key(b"seed-b"));
    }

    #[test]
    fn random_keys_are_distinct() {
        let mut rng = rand::thread_rng();
        let a = generate_random_private_key(&mut rng);
        let b = generate_random_private_key(&mut rng);
        assert_ne!(a, b);
    }
}
