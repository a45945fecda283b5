//! SNARK scalar field arithmetic (C1)
//!
//! A single canonical wrapper around the BN254 scalar field `Fr`, which is
//! the SNARK field `p` used throughout this workspace:
//! `p = 21888242871839275222246405745257275088548364400416034343698204186575808495617`.
//!
//! Every field element that crosses a module boundary in this workspace is
//! an [`Fp`], never a raw integer. `Fp` is always canonical (in `[0, p)`) by
//! construction — `ark_ff` guarantees this for every arithmetic operation —
//! so callers never need to separately "reduce" a value before using it.
//! The only place a non-canonical integer can appear is at a deserialization
//! boundary (bytes coming off the wire), which is exactly where
//! [`FieldError::NotCanonical`] is raised.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

use ark_ff::{BigInteger, PrimeField, UniformRand, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use num_bigint::BigUint;
use rand::{CryptoRng, Rng};
use std::ops::{Add, Mul, Neg, Sub};

/// The SNARK scalar field element type, BN254's `Fr`.
type Inner = ark_bn254::Fr;

/// Errors raised when converting untrusted input into a field element.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FieldError {
    /// The supplied integer is `>= p` and cannot be represented canonically
    /// without an explicit reduction.
    #[error("value is not canonical: must be < p")]
    NotCanonical,
}

/// A canonical element of the SNARK scalar field `p`.
///
/// Construction always yields a value in `[0, p)`; there is no way to build
/// a non-canonical `Fp` through this type's public API.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Fp(Inner);

impl Fp {
    /// The additive identity.
    pub fn zero() -> Self {
        Self(Inner::zero())
    }

    /// The multiplicative identity.
    pub fn one() -> Self {
        Self(Inner::from(1u64))
    }

    /// Build a field element from a small integer, reducing mod `p` (a no-op
    /// for any `u64`, since `p` is far larger than `u64::MAX`).
    pub fn from_u64(v: u64) -> Self {
        Self(Inner::from(v))
    }

    /// Reduce an arbitrary non-negative integer mod `p`.
    pub fn from_biguint_mod(v: &BigUint) -> Self {
        Self(Inner::from_le_bytes_mod_order(&v.to_bytes_le()))
    }

    /// Accept an integer only if it is already canonical (`< p`); otherwise
    /// fail with [`FieldError::NotCanonical`]. Use this at wire/event
    /// boundaries where a non-canonical value indicates malformed input.
    pub fn try_from_biguint(v: &BigUint) -> Result<Self, FieldError> {
        let reduced = Self::from_biguint_mod(v);
        if &reduced.to_biguint() == v {
            Ok(reduced)
        } else {
            Err(FieldError::NotCanonical)
        }
    }

    /// Reduce 32 little-endian bytes mod `p` (used by KDF/nonce derivation,
    /// which always wants a reduction, never a canonicality check).
    pub fn from_le_bytes_mod_order(bytes: &[u8]) -> Self {
        Self(Inner::from_le_bytes_mod_order(bytes))
    }

    /// Reduce big-endian bytes mod `p`.
    pub fn from_be_bytes_mod_order(bytes: &[u8]) -> Self {
        Self(Inner::from_be_bytes_mod_order(bytes))
    }

    /// Canonical big-endian 32-byte encoding.
    pub fn to_bytes_be(&self) -> [u8; 32] {
        let mut bytes = self.0.into_bigint().to_bytes_be();
        let mut out = [0u8; 32];
        // `to_bytes_be` is minimal-length; left-pad to 32.
        let start = 32 - bytes.len();
        out[start..].copy_from_slice(&bytes);
        bytes.clear();
        out
    }

    /// Canonical little-endian 32-byte encoding.
    pub fn to_bytes_le(&self) -> [u8; 32] {
        let mut out = self.to_bytes_be();
        out.reverse();
        out
    }

    /// The canonical integer representative in `[0, p)`.
    pub fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_be(&self.to_bytes_be())
    }

    /// Multiplicative inverse. Returns `None` for zero.
    pub fn inverse(&self) -> Option<Self> {
        ark_ff::Field::inverse(&self.0).map(Self)
    }

    /// Exponentiation by a `u64` exponent.
    pub fn pow(&self, exp: u64) -> Self {
        Self(ark_ff::Field::pow(&self.0, [exp]))
    }

    /// Sample a uniformly random field element from a CSPRNG.
    pub fn random<R: Rng + CryptoRng>(rng: &mut R) -> Self {
        Self(Inner::rand(rng))
    }

    /// Access the underlying `ark_bn254::Fr`. Exposed for crates in this
    /// workspace that need to hand a raw arkworks value to `ark_ec`/Poseidon
    /// internals; never re-exported outside the workspace's own crates.
    pub fn inner(&self) -> Inner {
        self.0
    }

    /// Wrap a raw arkworks field element. Internal-use constructor for
    /// sibling crates that compute directly in `ark_bn254::Fr` (curve
    /// coordinates, Poseidon state) and need to hand the result back as an
    /// [`Fp`].
    pub fn from_inner(v: Inner) -> Self {
        Self(v)
    }

    /// Canonical serialized length in bytes.
    pub const BYTE_LEN: usize = 32;
}

impl Add for Fp {
    type Output = Fp;
    fn add(self, rhs: Fp) -> Fp {
        Fp(self.0 + rhs.0)
    }
}

impl Sub for Fp {
    type Output = Fp;
    fn sub(self, rhs: Fp) -> Fp {
        Fp(self.0 - rhs.0)
    }
}

impl Mul for Fp {
    type Output = Fp;
    fn mul(self, rhs: Fp) -> Fp {
        Fp(self.0 * rhs.0)
    }
}

impl Neg for Fp {
    type Output = Fp;
    fn neg(self) -> Fp {
        Fp(-self.0)
    }
}

impl CanonicalSerialize for Fp {
    fn serialize_with_mode<W: ark_serialize::Write>(
        &self,
        writer: W,
        compress: ark_serialize::Compress,
    ) -> Result<(), ark_serialize::SerializationError> {
        self.0.serialize_with_mode(writer, compress)
    }

    fn serialized_size(&self, compress: ark_serialize::Compress) -> usize {
        self.0.serialized_size(compress)
    }
}

impl ark_serialize::Valid for Fp {
    fn check(&self) -> Result<(), ark_serialize::SerializationError> {
        self.0.check()
    }
}

impl CanonicalDeserialize for Fp {
    fn deserialize_with_mode<R: ark_serialize::Read>(
        reader: R,
        compress: ark_serialize::Compress,
        validate: ark_serialize::Validate,
    ) -> Result<Self, ark_serialize::SerializationError> {
        Inner::deserialize_with_mode(reader, compress, validate).map(Fp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_one_roundtrip_bytes() {
        assert_eq!(Fp::zero().to_biguint(), BigUint::from(0u64));
        assert_eq!(Fp::one().to_biguint(), BigUint::from(1u64));
    }

    #[test]
    fn canonicality_is_enforced_on_reduction() {
        // p itself reduces to 0.
        let p = BigUint::parse_bytes(
            b"21888242871839275222246405745257275088548364400416034343698204186575808495617",
            10,
        )
        .unwrap();
        assert_eq!(Fp::try_from_biguint(&p), Err(FieldError::NotCanonical));
        assert_eq!(Fp::from_biguint_mod(&p), Fp::zero());
        assert!(Fp::try_from_biguint(&(p.clone() - 1u64)).is_ok());
    }

    #[test]
    fn arithmetic_round_trips() {
        let a = Fp::from_u64(7);
        let b = Fp::from_u64(5);
        assert_eq!(a + b, Fp::from_u64(12));
        assert_eq!(a - b, Fp::from_u64(2));
        assert_eq!(a * b, Fp::from_u64(35));
        let inv = a.inverse().unwrap();
        assert_eq!(a * inv, Fp::one());
    }

    #[test]
    fn byte_encoding_round_trips() {
        let a = Fp::from_u64(123456789);
        let bytes = a.to_bytes_be();
        let back = Fp::from_be_bytes_mod_order(&bytes);
        assert_eq!(a, back);
    }

    #[test]
    fn pow_matches_repeated_multiplication() {
        let a = Fp::from_u64(3);
        let mut acc = Fp::one();
        for _ in 0..10 {
            acc = acc * a;
        }
        assert_eq!(a.pow(10), acc);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn modulus() -> BigUint {
        BigUint::parse_bytes(
            b"21888242871839275222246405745257275088548364400416034343698204186575808495617",
            10,
        )
        .unwrap()
    }

    proptest! {
        #[test]
        fn reduction_is_always_canonical(bytes in prop::collection::vec(any::<u8>(), 32..96)) {
            let fp = Fp::from_be_bytes_mod_order(&bytes);
            prop_assert!(fp.to_biguint() < modulus());
        }

        #[test]
        fn byte_round_trip_is_lossless(a in any::<u64>()) {
            let x = Fp::from_u64(a);
            prop_assert_eq!(Fp::from_be_bytes_mod_order(&x.to_bytes_be()), x);
            prop_assert_eq!(Fp::from_le_bytes_mod_order(&x.to_bytes_le()), x);
        }

        #[test]
        fn addition_is_commutative(a in any::<u64>(), b in any::<u64>()) {
            let (x, y) = (Fp::from_u64(a), Fp::from_u64(b));
            prop_assert_eq!(x + y, y + x);
        }

        #[test]
        fn nonzero_elements_invert(a in 1u64..u64::MAX) {
            let x = Fp::from_u64(a);
            let inv = x.inverse().expect("nonzero element must invert");
            prop_assert_eq!(x * inv, Fp::one());
        }
    }
}
