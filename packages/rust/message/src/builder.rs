//! MACI message construction pipeline (C9)
//!
//! Wraps a voter's command into the encrypted, on-chain-publishable
//! [`Message`]: pack the command, sign it with the voter's *current* key,
//! generate a fresh ephemeral key pair, derive the ECDH shared secret with
//! the coordinator's public key, and encrypt the 7-element plaintext under
//! the duplex sponge (C7).

use maci_babyjub::{
    generate_ecdh_shared_key, EdDSAPrivateKey, EdDSAPublicKey, EdDSASignature,
};
use maci_field::Fp;
use maci_sponge::{poseidon_encrypt, SpongeError};
use rand::{CryptoRng, Rng};

use crate::codec::{compute_command_hash, generate_salt, pack_command, CommandFields};

/// The 7-element command plaintext before encryption:
/// `[packedCommand, newPkX, newPkY, salt, sigR8x, sigR8y, sigS]`.
const PLAINTEXT_LEN: usize = 7;

/// Errors building an encrypted message.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// A command field did not fit the 50-bit packed representation.
    #[error(transparent)]
    Codec(#[from] crate::codec::CodecError),
    /// The duplex-sponge encryption step failed.
    #[error(transparent)]
    Sponge(#[from] SpongeError),
}

/// An encrypted, publishable MACI message: a 10-element ciphertext plus the
/// ephemeral public key the recipient needs to re-derive the shared secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// `poseidon_encrypt` output over the 7-element command plaintext.
    pub ciphertext: Vec<Fp>,
    /// The one-time public key used for this message's ECDH exchange.
    pub encryption_public_key: EdDSAPublicKey,
}

/// Build a standard vote (or key-change) message.
///
/// `signing_key` is the voter's *current* private key (for a key-change
/// message this is the old key, per spec.md §4.8: the signature commits to
/// the new public key while remaining verifiable under the old one, so the
/// on-chain state transition can prove continuity of ownership).
/// `new_public_key` is ordinarily the voter's own public key, unless this
/// message is itself a key-change, in which case it is the replacement key.
pub fn build_message<R: Rng + CryptoRng>(
    rng: &mut R,
    signing_key: &EdDSAPrivateKey,
    new_public_key: &EdDSAPublicKey,
    coordinator_public_key: &EdDSAPublicKey,
    fields: CommandFields,
) -> Result<Message, BuildError> {
    let packed = pack_command(fields)?;
    let salt = generate_salt(rng);
    let command_hash = compute_command_hash(
        fields.state_index,
        new_public_key.x(),
        new_public_key.y(),
        fields.new_vote_weight,
        salt,
    );
    let signature = signing_key.sign(command_hash);

    encrypt_plaintext(
        rng,
        packed,
        new_public_key,
        &signature,
        salt,
        coordinator_public_key,
    )
}

/// Build a key-change message: identical pipeline, but `voteOptionIndex` and
/// `newVoteWeight` are pinned to zero (spec.md §4.9) so the processor's
/// validity predicate treats this purely as a key rotation, never as a vote.
pub fn build_key_change_message<R: Rng + CryptoRng>(
    rng: &mut R,
    current_key: &EdDSAPrivateKey,
    new_public_key: &EdDSAPublicKey,
    coordinator_public_key: &EdDSAPublicKey,
    state_index: u64,
    nonce: u64,
    poll_id: u64,
) -> Result<Message, BuildError> {
    let fields = CommandFields {
        state_index,
        vote_option_index: 0,
        new_vote_weight: 0,
        nonce,
        poll_id,
    };
    build_message(rng, current_key, new_public_key, coordinator_public_key, fields)
}

fn encrypt_plaintext<R: Rng + CryptoRng>(
    rng: &mut R,
    packed: Fp,
    new_public_key: &EdDSAPublicKey,
    signature: &EdDSASignature,
    salt: Fp,
    coordinator_public_key: &EdDSAPublicKey,
) -> Result<Message, BuildError> {
    let ephemeral_key = EdDSAPrivateKey::random(rng);
    let shared_key =
        generate_ecdh_shared_key(ephemeral_key.scalar(), coordinator_public_key.point());

    let plaintext: [Fp; PLAINTEXT_LEN] = [
        packed,
        new_public_key.x(),
        new_public_key.y(),
        salt,
        signature.r8.x(),
        signature.r8.y(),
        fp_from_scalar(signature.s),
    ];

    let ciphertext = poseidon_encrypt(&plaintext, shared_key, 0)?;
    Ok(Message {
        ciphertext,
        encryption_public_key: ephemeral_key.public(),
    })
}

fn fp_from_scalar(s: maci_babyjub::Scalar) -> Fp {
    Fp::from_be_bytes_mod_order(&s.to_bytes_be())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_ten_element_ciphertext() {
        let mut rng = rand::thread_rng();
        let voter = EdDSAPrivateKey::random(&mut rng);
        let coordinator = EdDSAPrivateKey::random(&mut rng);
        let fields = CommandFields {
            state_index: 1,
            vote_option_index: 2,
            new_vote_weight: 9,
            nonce: 1,
            poll_id: 0,
        };

        let message = build_message(
            &mut rng,
            &voter,
            &voter.public(),
            &coordinator.public(),
            fields,
        )
        .unwrap();

        assert_eq!(message.ciphertext.len(), 10);
    }

    #[test]
    fn key_change_message_pins_vote_fields_to_zero() {
        let mut rng = rand::thread_rng();
        let voter = EdDSAPrivateKey::random(&mut rng);
        let new_key = EdDSAPrivateKey::random(&mut rng);
        let coordinator = EdDSAPrivateKey::random(&mut rng);

        let message = build_key_change_message(
            &mut rng,
            &voter,
            &new_key.public(),
            &coordinator.public(),
            3,
            1,
            0,
        )
        .unwrap();

        assert_eq!(message.ciphertext.len(), 10);
    }

    #[test]
    fn rejects_overflowing_command_fields() {
        let mut rng = rand::thread_rng();
        let voter = EdDSAPrivateKey::random(&mut rng);
        let coordinator = EdDSAPrivateKey::random(&mut rng);
        let fields = CommandFields {
            state_index: 1u64 << 50,
            vote_option_index: 0,
            new_vote_weight: 0,
            nonce: 0,
            poll_id: 0,
        };

        let err = build_message(
            &mut rng,
            &voter,
            &voter.public(),
            &coordinator.public(),
            fields,
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::Codec(_)));
    }
}
