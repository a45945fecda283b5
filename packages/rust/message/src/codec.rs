//! Command bit-packing, command hashing, and salt generation (C8)

use maci_field::Fp;
use num_bigint::BigUint;
use rand::{CryptoRng, Rng};

/// Number of bits allotted to each packed command field.
const FIELD_BITS: u32 = 50;

/// Errors from command packing.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CodecError {
    /// A field supplied to [`pack_command`] was `>= 2^50` and cannot be
    /// packed without silently losing bits.
    #[error("command field {0} is >= 2^50")]
    FieldOverflow(&'static str),
}

/// The five fields a voter's command packs into a single 250-bit integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandFields {
    /// Index of the voter's state leaf.
    pub state_index: u64,
    /// Index of the vote option this command targets.
    pub vote_option_index: u64,
    /// The new vote weight for that option.
    pub new_vote_weight: u64,
    /// This voter's next expected ballot nonce.
    pub nonce: u64,
    /// The poll this command belongs to.
    pub poll_id: u64,
}

fn check_fits(name: &'static str, value: u64) -> Result<(), CodecError> {
    if value >= (1u64 << FIELD_BITS) {
        Err(CodecError::FieldOverflow(name))
    } else {
        Ok(())
    }
}

/// Bit-pack `[stateIndex, voteOptionIndex, newVoteWeight, nonce, pollId]`
/// into the 250-bit integer described in spec.md §3, as a single field
/// element. Every field must be `< 2^50`.
pub fn pack_command(fields: CommandFields) -> Result<Fp, CodecError> {
    check_fits("stateIndex", fields.state_index)?;
    check_fits("voteOptionIndex", fields.vote_option_index)?;
    check_fits("newVoteWeight", fields.new_vote_weight)?;
    check_fits("nonce", fields.nonce)?;
    check_fits("pollId", fields.poll_id)?;

    let mut packed = BigUint::from(fields.poll_id);
    packed = (packed << FIELD_BITS) + fields.nonce;
    packed = (packed << FIELD_BITS) + fields.new_vote_weight;
    packed = (packed << FIELD_BITS) + fields.vote_option_index;
    packed = (packed << FIELD_BITS) + fields.state_index;

    Ok(Fp::from_biguint_mod(&packed))
}

/// Inverse of [`pack_command`].
pub fn unpack_command(packed: Fp) -> CommandFields {
    let value = packed.to_biguint();
    let mask = (BigUint::from(1u64) << FIELD_BITS) - 1u64;

    let extract = |shift: u32| -> u64 {
        let shifted = &value >> (shift * FIELD_BITS);
        (&shifted & &mask)
            .to_u64_digits()
            .first()
            .copied()
            .unwrap_or(0)
    };

    CommandFields {
        state_index: extract(0),
        vote_option_index: extract(1),
        new_vote_weight: extract(2),
        nonce: extract(3),
        poll_id: extract(4),
    }
}

/// `computeCommandHash(stateIndex, newPkX, newPkY, newVoteWeight, salt) =
/// Poseidon_5(...)`.
pub fn compute_command_hash(
    state_index: u64,
    new_pk_x: Fp,
    new_pk_y: Fp,
    new_vote_weight: u64,
    salt: Fp,
) -> Fp {
    maci_poseidon::hash5(
        Fp::from_u64(state_index),
        new_pk_x,
        new_pk_y,
        Fp::from_u64(new_vote_weight),
        salt,
    )
}

/// Generate a fresh salt: 31 random bytes reduced mod `p` (so at most 248
/// bits of entropy, safely within the field without rejection sampling).
pub fn generate_salt<R: Rng + CryptoRng>(rng: &mut R) -> Fp {
    let mut bytes = [0u8; 31];
    rng.fill_bytes(&mut bytes);
    Fp::from_be_bytes_mod_order(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack_round_trip() {
        let fields = CommandFields {
            state_index: 1,
            vote_option_index: 2,
            new_vote_weight: 3,
            nonce: 4,
            poll_id: 5,
        };
        let packed = pack_command(fields).unwrap();
        assert_eq!(unpack_command(packed), fields);
    }

    #[test]
    fn pack_unpack_round_trip_near_max() {
        let max = (1u64 << 50) - 1;
        let fields = CommandFields {
            state_index: max,
            vote_option_index: max,
            new_vote_weight: max,
            nonce: max,
            poll_id: max,
        };
        let packed = pack_command(fields).unwrap();
        assert_eq!(unpack_command(packed), fields);
    }

    #[test]
    fn overflowing_field_is_rejected() {
        let fields = CommandFields {
            state_index: 1u64 << 50,
            vote_option_index: 0,
            new_vote_weight: 0,
            nonce: 0,
            poll_id: 0,
        };
        assert_eq!(
            pack_command(fields),
            Err(CodecError::FieldOverflow("stateIndex"))
        );
    }

    #[test]
    fn salt_generation_is_in_field_and_varies() {
        let mut rng = rand::thread_rng();
        let a = generate_salt(&mut rng);
        let b = generate_salt(&mut rng);
        assert_ne!(a, b);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    const MAX_FIELD: u64 = (1u64 << FIELD_BITS) - 1;

    proptest! {
        #[test]
        fn pack_unpack_round_trips_over_the_full_field_range(
            state_index in 0..=MAX_FIELD,
            vote_option_index in 0..=MAX_FIELD,
            new_vote_weight in 0..=MAX_FIELD,
            nonce in 0..=MAX_FIELD,
            poll_id in 0..=MAX_FIELD,
        ) {
            let fields = CommandFields { state_index, vote_option_index, new_vote_weight, nonce, poll_id };
            let packed = pack_command(fields).unwrap();
            prop_assert_eq!(unpack_command(packed), fields);
        }

        #[test]
        fn any_field_at_or_above_the_limit_is_rejected(value in (1u64 << FIELD_BITS)..u64::MAX) {
            let fields = CommandFields {
                state_index: value,
                vote_option_index: 0,
                new_vote_weight: 0,
                nonce: 0,
                poll_id: 0,
            };
            prop_assert_eq!(pack_command(fields), Err(CodecError::FieldOverflow("stateIndex")));
        }
    }
}
