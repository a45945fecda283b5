//! Baby-Jubjub curve, key derivation, EdDSA, and ECDH (C3–C6)
//!
//! This crate centralizes every Baby-Jubjub-adjacent primitive: curve
//! arithmetic, the BLAKE2b key-derivation function, Poseidon-EdDSA, and the
//! ECDH shared-key derivation used by the message pipeline (C9) and the
//! coordinator's decryption path (C12). It is grounded on the teacher
//! crate's EdDSA module, re-based onto BN254's embedded Baby-Jubjub curve
//! (`ark_ed_on_bn254`) and BLAKE2b (spec-mandated) instead of the teacher's
//! BLS12-381-embedded curve and BLAKE3.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod curve;
mod ecdh;
mod eddsa;
mod kdf;

pub use curve::{CurveError, Point, Scalar};
pub use ecdh::{generate_ecdh_shared_key, SharedKey};
pub use eddsa::{EdDSAPrivateKey, EdDSAPublicKey, EdDSASignature};
pub use kdf::{derive_private_key, generate_random_private_key};
