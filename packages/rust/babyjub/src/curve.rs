//! Baby-Jubjub twisted-Edwards curve operations (C3)
//!
//! Baby-Jubjub is the twisted-Edwards curve embedded in BN254: its base
//! field is exactly the SNARK scalar field `p` ([`maci_field::Fp`]), and its
//! prime-order subgroup has order `l`. We use `ark_ed_on_bn254`, the same
//! crate Semaphore's Rust implementation uses for this curve (see
//! `DESIGN.md`), rather than hand-rolling twisted-Edwards arithmetic.

use ark_ec::{twisted_edwards::TECurveConfig, AffineRepr, CurveGroup};
use ark_ff::{BigInteger, PrimeField, UniformRand};
use maci_field::Fp;
use rand::{CryptoRng, Rng};
use std::ops::{Add, Mul};

type Affine = ark_ed_on_bn254::EdwardsAffine;
type ScalarInner = ark_ed_on_bn254::Fr;
type Config = ark_ed_on_bn254::EdwardsConfig;

/// Errors raised when a point fails to deserialize onto the curve.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CurveError {
    /// The `(x, y)` pair is not a point on the Baby-Jubjub curve.
    #[error("point is not on the Baby-Jubjub curve")]
    OffCurve,
}

/// An affine Baby-Jubjub point, always on-curve and reduced mod `p`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Point(Affine);

impl Point {
    /// The fixed base point `B`.
    pub fn generator() -> Self {
        Self(Affine::generator())
    }

    /// The point at infinity (additive identity).
    pub fn identity() -> Self {
        Self(Affine::zero())
    }

    /// Deserialize a point from its affine coordinates, rejecting points
    /// that are not on the curve ([`CurveError::OffCurve`]).
    pub fn from_xy(x: Fp, y: Fp) -> Result<Self, CurveError> {
        let point = Affine::new_unchecked(x.inner(), y.inner());
        if !point.is_on_curve() || !Config::is_in_correct_subgroup_assuming_on_curve(&point) {
            return Err(CurveError::OffCurve);
        }
        Ok(Self(point))
    }

    /// The `x` coordinate.
    pub fn x(&self) -> Fp {
        Fp::from_inner(self.0.x)
    }

    /// The `y` coordinate.
    pub fn y(&self) -> Fp {
        Fp::from_inner(self.0.y)
    }

    /// `true` for the point at infinity.
    pub fn is_identity(&self) -> bool {
        self.0.is_zero()
    }

    /// `true` if the point lies on the curve (and, transitively, in the
    /// prime-order subgroup — every [`Point`] is constructed to satisfy
    /// this, so this is mainly useful as a post-condition check).
    pub fn is_on_curve(&self) -> bool {
        self.0.is_on_curve()
    }

    /// Point addition.
    pub fn add(&self, other: &Point) -> Point {
        Point((self.0 + other.0).into_affine())
    }

    /// Point doubling.
    pub fn double(&self) -> Point {
        Point((self.0 + self.0).into_affine())
    }

    /// Constant-time-intent scalar multiplication via a windowed ladder, as
    /// provided by Arkworks' `CurveGroup` scalar multiplication.
    pub fn scalar_mul(&self, scalar: Scalar) -> Point {
        Point((self.0 * scalar.0).into_affine())
    }

    /// Access the raw Arkworks affine point, for sibling crates (EdDSA,
    /// ECDH) that need to feed it into further Arkworks operations.
    pub(crate) fn inner(&self) -> Affine {
        self.0
    }

    pub(crate) fn from_inner(p: Affine) -> Self {
        Self(p)
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::add(&self, &rhs)
    }
}

impl Mul<Scalar> for Point {
    type Output = Point;
    fn mul(self, rhs: Scalar) -> Point {
        self.scalar_mul(rhs)
    }
}

/// A Baby-Jubjub scalar, always reduced mod the subgroup order `l`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scalar(ScalarInner);

impl Scalar {
    /// Reduce little-endian bytes mod `l`.
    pub fn from_le_bytes_mod_order(bytes: &[u8]) -> Self {
        Self(ScalarInner::from_le_bytes_mod_order(bytes))
    }

    /// Reduce big-endian bytes mod `l`.
    pub fn from_be_bytes_mod_order(bytes: &[u8]) -> Self {
        Self(ScalarInner::from_be_bytes_mod_order(bytes))
    }

    /// Reduce a [`Fp`] (an element of `p`, not `l`) mod `l`. Used to fold a
    /// Poseidon output (always `< p`) into a valid EdDSA challenge scalar.
    ///
    /// Since `p < l` is false in general but the two primes are close in
    /// bit-length, this is a true reduction, not a bit-reinterpretation —
    /// safe because the caller only needs a scalar, not an injective map.
    pub fn from_fp_mod_order(fp: Fp) -> Self {
        Self::from_be_bytes_mod_order(&fp.to_bytes_be())
    }

    /// Sample a uniformly random scalar mod `l`.
    pub fn random<R: Rng + CryptoRng>(rng: &mut R) -> Self {
        Self(ScalarInner::rand(rng))
    }

    /// Big-endian canonical bytes (32 bytes).
    pub fn to_bytes_be(&self) -> Vec<u8> {
        self.0.into_bigint().to_bytes_be()
    }

    /// Scalar addition mod `l`.
    pub fn add(&self, other: &Scalar) -> Scalar {
        Scalar(self.0 + other.0)
    }

    /// Scalar multiplication mod `l`.
    pub fn mul(&self, other: &Scalar) -> Scalar {
        Scalar(self.0 * other.0)
    }

    pub(crate) fn inner(&self) -> ScalarInner {
        self.0
    }

    pub(crate) fn from_inner(v: ScalarInner) -> Self {
        Self(v)
    }
}

impl Add for Scalar {
    type Output = Scalar;
    fn add(self, rhs: Scalar) -> Scalar {
        Scalar::add(&self, &rhs)
    }
}

impl Mul for Scalar {
    type Output = Scalar;
    fn mul(self, rhs: Scalar) -> Scalar {
        Scalar::mul(&self, &rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_is_on_curve() {
        assert!(Point::generator().is_on_curve());
    }

    #[test]
    fn scalar_mul_closure() {
        let g = Point::generator();
        for n in [1u64, 2, 3, 100, 12345] {
            let s = Scalar::from_le_bytes_mod_order(&n.to_le_bytes());
            let p = g.scalar_mul(s);
            assert!(p.is_on_curve(), "n={n}");
        }
    }

    #[test]
    fn off_curve_point_is_rejected() {
        // (0, 0) is not on the twisted-Edwards curve for these parameters.
        let err = Point::from_xy(Fp::zero(), Fp::zero());
        assert!(err.is_err());
    }

    #[test]
    fn doubling_matches_self_addition() {
        let g = Point::generator();
        assert_eq!(g.double(), g.add(&g));
    }
}
