//! Poseidon duplex-sponge authenticated encryption (C7)
//!
//! Width `t = 4`, rate `r = 3`, capacity `c = 1`. The sponge is keyed by an
//! ECDH shared point (C6) rather than a symmetric key: `state[1], state[2]`
//! are initialized to the shared point's `(x, y)` and never explicitly
//! re-keyed, so every block permutation mixes the shared secret back in —
//! this is what makes the construction an *authenticated* cipher rather
//! than a stream cipher (tampering any ciphertext block perturbs every
//! later block's keystream and, eventually, the tag).

#![forbid(unsafe_code)]
#![deny(missing_docs)]

use maci_babyjub::Point;
use maci_field::Fp;

/// Errors from the duplex-sponge AEAD.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SpongeError {
    /// Decryption's final permutation did not reproduce the ciphertext's
    /// trailing tag: the ciphertext, shared key, or declared nonce/length do
    /// not match what was encrypted.
    #[error("duplex sponge authentication tag mismatch")]
    AuthTagMismatch,
    /// A ciphertext's body (everything but the trailing tag) was not a
    /// multiple of the rate (3 field elements).
    #[error("ciphertext length is not rate-aligned")]
    MalformedCiphertext,
    /// The underlying Poseidon permutation rejected the state width (should
    /// not occur for this crate's fixed `t = 4` use, but is propagated for
    /// completeness rather than panicking).
    #[error(transparent)]
    Poseidon(#[from] maci_poseidon::PoseidonError),
}

const RATE: usize = 3;
const WIDTH: usize = 4;

/// `nonce + len · 2^128`, folded into a single capacity-slot field element
/// exactly as spec.md §4.6 describes.
fn nonce_len_term(nonce: u64, len: usize) -> Fp {
    let two_pow_128 = Fp::from_u64(2).pow(128);
    Fp::from_u64(len as u64) * two_pow_128 + Fp::from_u64(nonce)
}

fn init_state(shared_key: Point, nonce: u64, len: usize) -> [Fp; WIDTH] {
    [
        Fp::zero(),
        shared_key.x(),
        shared_key.y(),
        nonce_len_term(nonce, len),
    ]
}

fn permute(state: &mut [Fp; WIDTH]) -> Result<(), SpongeError> {
    maci_poseidon::permute_state(state)?;
    Ok(())
}

fn pad_to_rate(plaintext: &[Fp]) -> Vec<Fp> {
    let mut padded = plaintext.to_vec();
    let remainder = padded.len() % RATE;
    if remainder != 0 {
        padded.resize(padded.len() + (RATE - remainder), Fp::zero());
    }
    padded
}

/// Encrypt `plaintext` under `shared_key`, binding `nonce` (and the true,
/// unpadded `plaintext.len()`) into the first permutation. Output length is
/// `ceil(plaintext.len() / 3) * 3 + 1` (padded body plus one tag element).
pub fn poseidon_encrypt(
    plaintext: &[Fp],
    shared_key: Point,
    nonce: u64,
) -> Result<Vec<Fp>, SpongeError> {
    let padded = pad_to_rate(plaintext);
    let mut state = init_state(shared_key, nonce, plaintext.len());

    let mut ciphertext = Vec::with_capacity(padded.len() + 1);
    for block in padded.chunks(RATE) {
        permute(&mut state)?;
        for (i, p) in block.iter().enumerate() {
            let c = *p + state[1 + i];
            state[1 + i] = c;
            ciphertext.push(c);
        }
    }
    permute(&mut state)?;
    ciphertext.push(state[1]);
    Ok(ciphertext)
}

/// Decrypt and authenticate `ciphertext` under `shared_key`, with the same
/// `nonce` used at encryption time and the caller-supplied `expected_len`
/// (the true plaintext length before rate-padding). Fails closed with
/// [`SpongeError::AuthTagMismatch`] if the recomputed tag does not match the
/// trailing element of `ciphertext`.
pub fn poseidon_decrypt(
    ciphertext: &[Fp],
    shared_key: Point,
    nonce: u64,
    expected_len: usize,
) -> Result<Vec<Fp>, SpongeError> {
    if ciphertext.is_empty() || (ciphertext.len() - 1) % RATE != 0 {
        return Err(SpongeError::MalformedCiphertext);
    }
    let (body, tag_slice) = ciphertext.split_at(ciphertext.len() - 1);
    let tag = tag_slice[0];

    let mut state = init_state(shared_key, nonce, expected_len);
    let mut plaintext = Vec::with_capacity(body.len());
    for block in body.chunks(RATE) {
        permute(&mut state)?;
        for (i, c) in block.iter().enumerate() {
            let p = *c - state[1 + i];
            plaintext.push(p);
            state[1 + i] = *c;
        }
    }
    permute(&mut state)?;
    if state[1] != tag {
        return Err(SpongeError::AuthTagMismatch);
    }
    plaintext.truncate(expected_len);
    Ok(plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use maci_babyjub::{generate_ecdh_shared_key, EdDSAPrivateKey};

    fn shared_key() -> Point {
        let mut rng = rand::thread_rng();
        let a = EdDSAPrivateKey::random(&mut rng);
        let b = EdDSAPrivateKey::random(&mut rng);
        generate_ecdh_shared_key(a.scalar(), b.public().point())
    }

    #[test]
    fn round_trips_for_various_lengths() {
        let key = shared_key();
        for len in [0usize, 1, 2, 3, 4, 7, 10] {
            let plaintext: Vec<Fp> = (0..len as u64).map(Fp::from_u64).collect();
            let ciphertext = poseidon_encrypt(&plaintext, key, 5).unwrap();
            assert_eq!(ciphertext.len(), len.div_ceil(3) * 3 + 1);
            let recovered = poseidon_decrypt(&ciphertext, key, 5, len).unwrap();
            assert_eq!(recovered, plaintext);
        }
    }

    #[test]
    fn tampered_ciphertext_fails_closed() {
        let key = shared_key();
        let plaintext = vec![Fp::from_u64(1), Fp::from_u64(2), Fp::from_u64(3)];
        let mut ciphertext = poseidon_encrypt(&plaintext, key, 0).unwrap();
        ciphertext[0] = ciphertext[0] + Fp::one();
        let err = poseidon_decrypt(&ciphertext, key, 0, plaintext.len()).unwrap_err();
        assert_eq!(err, SpongeError::AuthTagMismatch);
    }

    #[test]
    fn wrong_key_fails_closed() {
        let plaintext = vec![Fp::from_u64(9)];
        let key = shared_key();
        let ciphertext = poseidon_encrypt(&plaintext, key, 0).unwrap();
        let other_key = shared_key();
        let err = poseidon_decrypt(&ciphertext, other_key, 0, plaintext.len()).unwrap_err();
        assert_eq!(err, SpongeError::AuthTagMismatch);
    }

    #[test]
    fn wrong_nonce_fails_closed() {
        let plaintext = vec![Fp::from_u64(9)];
        let key = shared_key();
        let ciphertext = poseidon_encrypt(&plaintext, key, 1).unwrap();
        let err = poseidon_decrypt(&ciphertext, key, 2, plaintext.len()).unwrap_err();
        assert_eq!(err, SpongeError::AuthTagMismatch);
    }

    #[test]
    fn seven_element_message_matches_spec_length() {
        // The MACI command plaintext is 7 elements; encrypted length must be 10.
        let key = shared_key();
        let plaintext: Vec<Fp> = (0..7u64).map(Fp::from_u64).collect();
        let ciphertext = poseidon_encrypt(&plaintext, key, 3).unwrap();
        assert_eq!(ciphertext.len(), 10);
    }
}
