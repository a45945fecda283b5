//! External collaborator contracts (C14's adjacent collaborators):
//! `ProverAdapter` and `ChainAdapter`.
//!
//! Both are narrow, data-in/data-out traits — spec.md §9's "abstract the
//! prover and the chain as capability traits with a narrow surface... this
//! keeps the core pure and testable." No implementation here performs
//! network I/O; a file-backed `ChainAdapter` lives in `maci-coordinator`
//! for local runs, in the teacher's `src/bin/*.rs`-adjacent style of small,
//! narrowly scoped adapters.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

use maci_field::Fp;
use serde::{Deserialize, Serialize};

/// A sign-up event projected from the chain's event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUp {
    /// Assigned state tree index.
    pub state_index: u64,
    /// Sign-up public key, x coordinate.
    pub pub_key_x: FieldHex,
    /// Sign-up public key, y coordinate.
    pub pub_key_y: FieldHex,
    /// Initial voice-credit balance.
    pub voice_credit_balance: u64,
    /// Block timestamp at sign-up.
    pub timestamp: u64,
}

/// A published, encrypted message event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePublished {
    /// Monotonic publish-time index.
    pub message_index: u64,
    /// The 10-element duplex-sponge ciphertext.
    pub enc_message: Vec<FieldHex>,
    /// Ephemeral public key used for this message, x coordinate.
    pub enc_pub_key_x: FieldHex,
    /// Ephemeral public key used for this message, y coordinate.
    pub enc_pub_key_y: FieldHex,
}

/// A field element encoded as a `0x`-prefixed hex string — the wire shape
/// spec.md §6 describes ("each uint256 is the canonical representative of a
/// field element"), kept as a distinct type so JSON fixtures read like the
/// on-chain event ABI rather than decimal integers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldHex(pub String);

impl FieldHex {
    /// Encode a field element as `0x`-prefixed big-endian hex.
    pub fn from_field(value: Fp) -> Self {
        Self(format!("0x{}", hex::encode(value.to_bytes_be())))
    }

    /// Decode back into a field element.
    pub fn to_field(&self) -> Result<Fp, AdapterError> {
        let trimmed = self.0.strip_prefix("0x").unwrap_or(&self.0);
        let bytes = hex::decode(trimmed).map_err(|_| AdapterError::MalformedHex(self.0.clone()))?;
        Ok(Fp::from_be_bytes_mod_order(&bytes))
    }
}

/// An event the `ChainAdapter` may yield.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChainEvent {
    /// A new voter registered.
    SignUp(SignUp),
    /// A new encrypted message was published.
    MessagePublished(MessagePublished),
}

/// A Groth16 proof in the shape the chain's verifier expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Groth16Proof {
    /// `pi_a`, a G1 point `[x, y]`.
    pub pi_a: [FieldHex; 2],
    /// `pi_b`, a G2 point `[[x0, x1], [y0, y1]]`, already coordinate-swapped
    /// for submission (see [`swap_g2_for_submission`]).
    pub pi_b: [[FieldHex; 2]; 2],
    /// `pi_c`, a G1 point `[x, y]`.
    pub pi_c: [FieldHex; 2],
    /// Public signals, with `public_signals[0]` matching the
    /// `PublicInputHasher` output over the same witness.
    pub public_signals: Vec<FieldHex>,
}

/// Apply the pairing-convention coordinate swap spec.md §6 mandates at
/// submission time: `[[b[0][1], b[0][0]], [b[1][1], b[1][0]]]`.
pub fn swap_g2_for_submission(pi_b: [[Fp; 2]; 2]) -> [[Fp; 2]; 2] {
    [[pi_b[0][1], pi_b[0][0]], [pi_b[1][1], pi_b[1][0]]]
}

/// The three artifacts a coordinator submits to the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum SubmissionArtifact {
    /// `processMessages(newStateCommitment, pA, pB, pC)`.
    ProcessMessages {
        /// The new state commitment the batch produced.
        new_state_commitment: FieldHex,
        /// The accompanying Groth16 proof.
        proof: Groth16Proof,
    },
    /// `tallyVotes(newTallyCommitment, pA, pB, pC)`.
    TallyVotes {
        /// The new tally commitment.
        new_tally_commitment: FieldHex,
        /// The accompanying Groth16 proof.
        proof: Groth16Proof,
    },
    /// `publishResults(forVotes, againstVotes, abstainVotes, totalVoters,
    /// tallyResultsHash)`.
    PublishResults {
        /// Total "for" votes.
        for_votes: i64,
        /// Total "against" votes.
        against_votes: i64,
        /// Total "abstain" votes (always zero in quadratic mode).
        abstain_votes: i64,
        /// Count of voters who cast at least one non-zero vote.
        total_voters: u64,
        /// Commitment to the full per-option results array.
        tally_results_hash: FieldHex,
    },
}

/// A transaction receipt a [`ChainAdapter::submit`] call returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    /// Opaque, adapter-defined transaction identifier.
    pub tx_id: String,
}

/// Errors an adapter implementation may surface. Every variant is fatal to
/// the caller's current operation — adapters never produce a per-message
/// "invalid" outcome, only the processor does.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// A `FieldHex` value was not valid hex.
    #[error("malformed field hex: {0}")]
    MalformedHex(String),
    /// The external prover rejected the witness or failed to produce a
    /// proof.
    #[error("prover error: {0}")]
    Prover(String),
    /// The chain adapter's ingest or submit call failed.
    #[error("chain adapter error: {0}")]
    Chain(String),
}

/// A named field-value witness handed to an external Groth16 prover. The
/// core assembles this; the prover is a black box that turns it into a
/// proof (spec.md §4.14).
pub type WitnessFields = Vec<(&'static str, Fp)>;

/// Thin interface to an external Groth16 prover. Implementations shell out
/// to `snarkjs`, a native prover binary, or an HTTP proving service — the
/// core never cares which.
pub trait ProverAdapter {
    /// Produce a proof over `witness`, given paths to the circuit's `.wasm`
    /// and `.zkey` artifacts.
    fn prove(
        &self,
        witness: &WitnessFields,
        wasm_path: &str,
        zkey_path: &str,
    ) -> Result<Groth16Proof, AdapterError>;
}

/// Interface for event ingestion and transaction submission. The core
/// performs no network I/O itself; every chain interaction is mediated
/// through this trait.
pub trait ChainAdapter {
    /// Return every event at or after `from_block`, in emission order.
    fn ingest(&self, from_block: u64) -> Result<Vec<ChainEvent>, AdapterError>;
    /// Submit a completed artifact to the chain.
    fn submit(&self, artifact: SubmissionArtifact) -> Result<TxReceipt, AdapterError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_hex_round_trips() {
        let value = Fp::from_u64(123456789);
        let hex = FieldHex::from_field(value);
        assert_eq!(hex.to_field().unwrap(), value);
    }

    #[test]
    fn malformed_hex_is_rejected() {
        let hex = FieldHex("0xnotahexstring".to_string());
        assert!(hex.to_field().is_err());
    }

    #[test]
    fn g2_swap_exchanges_coordinate_halves() {
        let pi_b = [
            [Fp::from_u64(1), Fp::from_u64(2)],
            [Fp::from_u64(3), Fp::from_u64(4)],
        ];
        let swapped = swap_g2_for_submission(pi_b);
        assert_eq!(swapped, [[Fp::from_u64(2), Fp::from_u64(1)], [Fp::from_u64(4), Fp::from_u64(3)]]);
    }
}
