//! Poseidon-EdDSA over Baby-Jubjub (C5)
//!
//! Follows the teacher's (`mabingol-EdDSA-Jubjub-mab`) shape for the private
//! key type — raw seed bytes, `Zeroize`/`ZeroizeOnDrop`, the scalar derived
//! on demand rather than cached — generalized to this workspace's field/
//! curve/Poseidon stack and to circomlib-style Poseidon-EdDSA rather than
//! the teacher's BabyJubjub-over-BLS12-381 variant.

use crate::curve::{Point, Scalar};
use crate::kdf;
use blake2::{digest::consts::U64, Blake2b, Digest};
use maci_field::Fp;
use rand::{CryptoRng, Rng};
use zeroize::{Zeroize, ZeroizeOnDrop};

type Blake2b512 = Blake2b<U64>;

/// A Baby-Jubjub EdDSA private key.
///
/// Stores the raw 32-byte seed, not the derived scalar — the scalar (and
/// the public key) are recomputed on demand via the KDF (C4), matching
/// spec.md's "`sk` is derived via `derivePrivateKey(seed)`" lifecycle. The
/// raw bytes are wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EdDSAPrivateKey([u8; 32]);

impl EdDSAPrivateKey {
    /// Wrap a 32-byte seed as a private key (the seed is run through the
    /// KDF whenever the scalar or public key is needed).
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self(seed)
    }

    /// Generate a fresh private key from 32 bytes of CSPRNG output.
    pub fn random<R: Rng + CryptoRng>(rng: &mut R) -> Self {
        let mut seed = [0u8; 32];
        rng.fill_bytes(&mut seed);
        Self(seed)
    }

    /// The derived, subgroup-reduced signing scalar.
    pub fn scalar(&self) -> Scalar {
        kdf::derive_private_key(&self.0)
    }

    /// The corresponding public key, `pk = sk · B`.
    pub fn public(&self) -> EdDSAPublicKey {
        EdDSAPublicKey(Point::generator().scalar_mul(self.scalar()))
    }

    /// Sign a single field-element message.
    ///
    /// `r` is derived deterministically from `(sk, msg)` via BLAKE2b, so a
    /// weak RNG at signing time cannot leak or bias the nonce; the same
    /// `(sk, msg)` pair always reproduces the same signature.
    pub fn sign(&self, msg: Fp) -> EdDSASignature {
        let sk = self.scalar();
        let pk = self.public();

        let r = deterministic_nonce(&self.0, msg);
        let r8 = Point::generator().scalar_mul(r);

        let c = challenge_scalar(msg, &r8, &pk.0);
        let s = r.add(&c.mul(&sk));

        EdDSASignature { r8, s }
    }
}

/// A Baby-Jubjub EdDSA public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdDSAPublicKey(Point);

impl EdDSAPublicKey {
    /// Wrap an on-curve point as a public key.
    pub fn from_point(point: Point) -> Self {
        Self(point)
    }

    /// The underlying curve point.
    pub fn point(&self) -> Point {
        self.0
    }

    /// `x` coordinate.
    pub fn x(&self) -> Fp {
        self.0.x()
    }

    /// `y` coordinate.
    pub fn y(&self) -> Fp {
        self.0.y()
    }

    /// Verify a signature over a single field-element message.
    ///
    /// `S · B == R8 + c · Pk` where `c = Poseidon_5(R8.x, R8.y, Pk.x, Pk.y,
    /// msg)`.
    pub fn verify(&self, msg: Fp, sig: &EdDSASignature) -> bool {
        let c = challenge_scalar(msg, &sig.r8, &self.0);
        let lhs = Point::generator().scalar_mul(sig.s);
        let rhs = sig.r8.add(&self.0.scalar_mul(c));
        lhs == rhs
    }
}

/// An EdDSA signature: `(R8, S)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdDSASignature {
    /// The nonce commitment point `R8 = r · B`.
    pub r8: Point,
    /// The response scalar `S = r + c · sk mod l`.
    pub s: Scalar,
}

fn challenge_scalar(msg: Fp, r8: &Point, pk: &Point) -> Scalar {
    let c = maci_poseidon::hash5(r8.x(), r8.y(), pk.x(), pk.y(), msg);
    Scalar::from_fp_mod_order(c)
}

/// Deterministic nonce domain separator, bound into every nonce derivation
/// so this construction cannot be confused with an unrelated BLAKE2b use
/// elsewhere in the workspace.
const NONCE_DST: &[u8] = b"maci.eddsa.nonce.v1";

fn deterministic_nonce(sk_seed: &[u8; 32], msg: Fp) -> Scalar {
    let mut hasher = Blake2b512::new();
    hasher.update(NONCE_DST);
    hasher.update(sk_seed);
    hasher.update(msg.to_bytes_be());
    let digest = hasher.finalize();
    Scalar::from_le_bytes_mod_order(&digest)
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn any_seed_and_message_verify(seed in prop::array::uniform32(any::<u8>()), msg in any::<u64>()) {
            let sk = EdDSAPrivateKey::from_seed(seed);
            let pk = sk.public();
            let sig = sk.sign(Fp::from_u64(msg));
            prop_assert!(pk.verify(Fp::from_u64(msg), &sig));
        }

        #[test]
        fn signing_is_deterministic_for_any_seed(seed in prop::array::uniform32(any::<u8>()), msg in any::<u64>()) {
            let sk = EdDSAPrivateKey::from_seed(seed);
            let a = sk.sign(Fp::from_u64(msg));
            let b = sk.sign(Fp::from_u64(msg));
            prop_assert_eq!(a, b);
        }

        #[test]
        fn distinct_seeds_do_not_cross_verify(seed_a in prop::array::uniform32(any::<u8>()), seed_b in prop::array::uniform32(any::<u8>()), msg in any::<u64>()) {
            prop_assume!(seed_a != seed_b);
            let sk_a = EdDSAPrivateKey::from_seed(seed_a);
            let sk_b = EdDSAPrivateKey::from_seed(seed_b);
            prop_assume!(sk_a.public() != sk_b.public());
            let sig = sk_a.sign(Fp::from_u64(msg));
            prop_assert!(!sk_b.public().verify(Fp::from_u64(msg), &sig));
        }
    }
}
