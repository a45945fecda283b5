//! Per-batch witness assembly: the named field values a completed batch
//! hands to `PublicInputHasher` and, ultimately, the prover adapter.
//!
//! Targets the decomposed-field-free `generateProcessProof` variant noted
//! as an open question in spec.md §9 — the witness carries only tree roots
//! and batch bounds, not per-command decomposed fields, on the assumption
//! that the circuit performs in-circuit DuplexSponge decryption itself.
//! See `DESIGN.md` for the recorded decision.

use maci_field::Fp;

/// The commitment block a processed batch exposes, per spec.md §4.11's
/// "batch boundaries" paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchWitness {
    /// State tree root before this batch.
    pub input_state_root: Fp,
    /// State tree root after this batch.
    pub output_state_root: Fp,
    /// Ballot tree root before this batch.
    pub input_ballot_root: Fp,
    /// Ballot tree root after this batch.
    pub output_ballot_root: Fp,
    /// Message tree root this batch was processed against.
    pub input_message_root: Fp,
    /// `Poseidon_2` hash of the coordinator's public key, binding the
    /// decrypting key into the witness without exposing it directly.
    pub coordinator_pub_key_hash: Fp,
    /// First `messageIndex` in this batch's range (inclusive).
    pub batch_start_index: u64,
    /// One past the last `messageIndex` in this batch's range (exclusive).
    pub batch_end_index: u64,
}

impl BatchWitness {
    /// Flatten the witness into the ordered field-value list
    /// `PublicInputHasher` expects.
    pub fn as_field_values(&self) -> [Fp; 8] {
        [
            self.input_state_root,
            self.output_state_root,
            self.input_ballot_root,
            self.output_ballot_root,
            self.input_message_root,
            self.coordinator_pub_key_hash,
            Fp::from_u64(self.batch_start_index),
            Fp::from_u64(self.batch_end_index),
        ]
    }
}

/// `Poseidon_2(pubKeyX, pubKeyY)`, the coordinator key-hash term bound into
/// every [`BatchWitness`].
pub fn coordinator_pub_key_hash(pub_key_x: Fp, pub_key_y: Fp) -> Fp {
    maci_poseidon::hash(&[pub_key_x, pub_key_y])
        .expect("width-2 input to a 3-wide Poseidon permutation is always supported")
}
