//! Reverse-order message processing state machine (C12) — the anti-collusion
//! core.
//!
//! Grounded on spec.md §4.11. Per-message cryptographic failures (bad auth
//! tag, bad signature, broken nonce/range/credit rules) are modeled as data
//! — a tagged [`Outcome`] — never as a thrown error; only structural
//! failures (tree capacity, malformed batch shape) are [`ProcessError`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod state;
mod witness;

pub use state::{Ballot, StateLeaf, MAX_VOTE_OPTIONS};
pub use witness::{coordinator_pub_key_hash, BatchWitness};

use maci_babyjub::{generate_ecdh_shared_key, EdDSAPrivateKey, EdDSAPublicKey, EdDSASignature, Point, Scalar};
use maci_field::Fp;
use maci_message::{compute_command_hash, unpack_command};
use maci_sponge::poseidon_decrypt;
use maci_trees::QuinaryTree;

/// Length of a decrypted command plaintext: `[packed, newPkX, newPkY, salt,
/// sigR8x, sigR8y, sigS]`.
const PLAINTEXT_LEN: usize = 7;

/// Fatal, batch-aborting errors. Per-message validity failures are never
/// represented here — see [`Outcome`].
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// A message's declared `stateIndex` could not even be *checked* for
    /// range, because the processor's backing leaf storage is inconsistent
    /// with `numSignUps` (a caller bug, not a voter-supplied fault).
    #[error("state leaf storage has {actual} entries, expected {expected}")]
    LeafStorageMismatch {
        /// Entries actually present.
        actual: usize,
        /// Entries `numSignUps` implies.
        expected: usize,
    },
    /// A tree update exceeded its configured capacity.
    #[error(transparent)]
    Tree(#[from] maci_trees::TreeError),
}

/// A published, not-yet-processed message.
#[derive(Debug, Clone)]
pub struct EncryptedMessage {
    /// Monotonic publish-time index; processing order is `messageIndex`
    /// descending.
    pub message_index: u64,
    /// The 10-element duplex-sponge ciphertext.
    pub ciphertext: Vec<Fp>,
    /// The ephemeral public key used for this message's ECDH exchange.
    pub enc_public_key: Point,
}

/// The outcome of processing one message: either it was applied to the
/// voter's state and ballot, or it was invalid and routed to the blank leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The message passed every validity check and produced this new state
    /// leaf and ballot (already written into the trees).
    Applied {
        /// This message's `messageIndex`.
        message_index: u64,
        /// The state index this message targeted.
        state_index: u64,
        /// The state leaf after applying this message.
        new_state_leaf: StateLeaf,
        /// The ballot after applying this message.
        new_ballot: Ballot,
    },
    /// The message failed a validity check; the blank leaf at index 0 was
    /// re-hashed (no value change) so the batch still consumes one tree
    /// update pair.
    RoutedToBlank {
        /// This message's `messageIndex`.
        message_index: u64,
        /// Which check failed.
        reason: InvalidReason,
    },
}

/// Why a message was routed to the blank leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// Duplex-sponge authentication failed; the message is undecryptable
    /// garbage or was tampered with.
    AuthTagMismatch,
    /// `stateIndex` was `< 0` or `>= numSignUps`.
    StateIndexOutOfRange,
    /// The encrypted payload's `R8` coordinates are not a point on the
    /// curve, or the EdDSA signature did not verify against the current
    /// state leaf's public key.
    SignatureInvalid,
    /// `cmd.nonce != ballot.nonce + 1`.
    NonceMismatch,
    /// `voteOptionIndex` was outside `0..maxVoteOptions`.
    VoteOptionOutOfRange,
    /// Applying `creditChange` would drive `voiceCreditBalance` negative.
    InsufficientVoiceCredits,
}

/// Owns the state tree, ballot tree, and their backing per-voter records for
/// the duration of a processing run.
pub struct MessageProcessor {
    state_leaves: Vec<StateLeaf>,
    ballots: Vec<Ballot>,
    state_tree: QuinaryTree,
    ballot_tree: QuinaryTree,
    max_vote_options: usize,
}

impl MessageProcessor {
    /// Build a processor over an already-projected sign-up set. `state_leaves`
    /// must include the blank leaf at index 0 (spec.md §3: "state index 0
    /// is the blank leaf"). `tree_depth` sizes both the state and ballot
    /// trees (`5^tree_depth >= state_leaves.len()`).
    pub fn new(
        state_leaves: Vec<StateLeaf>,
        max_vote_options: usize,
        tree_depth: u32,
    ) -> Result<Self, ProcessError> {
        let mut state_tree = QuinaryTree::new(tree_depth);
        let mut ballot_tree = QuinaryTree::new(tree_depth);
        let ballots: Vec<Ballot> = state_leaves
            .iter()
            .map(|_| Ballot::blank(max_vote_options))
            .collect();

        for (i, leaf) in state_leaves.iter().enumerate() {
            state_tree.insert(i as u64, leaf.hash())?;
        }
        for (i, ballot) in ballots.iter().enumerate() {
            ballot_tree.insert(i as u64, ballot.hash())?;
        }

        Ok(Self {
            state_leaves,
            ballots,
            state_tree,
            ballot_tree,
            max_vote_options,
        })
    }

    /// Number of sign-ups currently tracked (including the blank leaf).
    pub fn num_sign_ups(&self) -> u64 {
        self.state_leaves.len() as u64
    }

    /// Current state tree root.
    pub fn state_root(&mut self) -> Fp {
        self.state_tree.root()
    }

    /// Current ballot tree root.
    pub fn ballot_root(&mut self) -> Fp {
        self.ballot_tree.root()
    }

    /// The current per-voter ballots, indexed by state index (including the
    /// unused blank entry at index 0). Read-only access for the tally
    /// stage, which consumes the processor's trees after processing
    /// completes (spec.md §5).
    pub fn ballots(&self) -> &[Ballot] {
        &self.ballots
    }

    /// Process `messages` (which MUST already lie within
    /// `[batch_start_index, batch_end_index)`) in descending `messageIndex`
    /// order, producing a [`BatchWitness`] and one [`Outcome`] per message.
    pub fn process_batch(
        &mut self,
        coordinator_sk: &EdDSAPrivateKey,
        input_message_root: Fp,
        messages: &[EncryptedMessage],
        batch_start_index: u64,
        batch_end_index: u64,
    ) -> Result<(BatchWitness, Vec<Outcome>), ProcessError> {
        let input_state_root = self.state_tree.root();
        let input_ballot_root = self.ballot_tree.root();

        let mut ordered = messages.to_vec();
        ordered.sort_by(|a, b| b.message_index.cmp(&a.message_index));

        let mut outcomes = Vec::with_capacity(ordered.len());
        for message in &ordered {
            outcomes.push(self.process_one(coordinator_sk, message)?);
        }

        let coord_pk = coordinator_sk.public();
        let witness = BatchWitness {
            input_state_root,
            output_state_root: self.state_tree.root(),
            input_ballot_root,
            output_ballot_root: self.ballot_tree.root(),
            input_message_root,
            coordinator_pub_key_hash: coordinator_pub_key_hash(coord_pk.x(), coord_pk.y()),
            batch_start_index,
            batch_end_index,
        };
        Ok((witness, outcomes))
    }

    fn route_to_blank(&mut self, message_index: u64, reason: InvalidReason) -> Result<Outcome, ProcessError> {
        let blank_state_hash = self.state_leaves[0].hash();
        let blank_ballot_hash = self.ballots[0].hash();
        self.state_tree.insert(0, blank_state_hash)?;
        self.ballot_tree.insert(0, blank_ballot_hash)?;
        Ok(Outcome::RoutedToBlank { message_index, reason })
    }

    fn process_one(
        &mut self,
        coordinator_sk: &EdDSAPrivateKey,
        message: &EncryptedMessage,
    ) -> Result<Outcome, ProcessError> {
        let shared_key =
            generate_ecdh_shared_key(coordinator_sk.scalar(), message.enc_public_key);

        // The encrypting client has no publish-time `messageIndex` to hand
        // to the sponge (spec.md §4.8 step 8 fixes it at 0), so decryption
        // must use the same constant nonce the builder encrypted with, not
        // `message.message_index`.
        let plaintext = match poseidon_decrypt(&message.ciphertext, shared_key, 0, PLAINTEXT_LEN) {
            Ok(p) => p,
            Err(_) => return self.route_to_blank(message.message_index, InvalidReason::AuthTagMismatch),
        };

        let cmd = unpack_command(plaintext[0]);
        let new_pk_x = plaintext[1];
        let new_pk_y = plaintext[2];
        let salt = plaintext[3];
        let sig_r8x = plaintext[4];
        let sig_r8y = plaintext[5];
        let sig_s = plaintext[6];

        if cmd.state_index >= self.num_sign_ups() {
            return self.route_to_blank(message.message_index, InvalidReason::StateIndexOutOfRange);
        }
        let state_index = cmd.state_index as usize;

        let current_leaf = self.state_leaves[state_index];
        let r8 = match Point::from_xy(sig_r8x, sig_r8y) {
            Ok(p) => p,
            Err(_) => {
                return self.route_to_blank(message.message_index, InvalidReason::SignatureInvalid)
            }
        };
        let sig = EdDSASignature {
            r8,
            s: Scalar::from_fp_mod_order(sig_s),
        };
        let cmd_hash = compute_command_hash(
            cmd.state_index,
            new_pk_x,
            new_pk_y,
            cmd.new_vote_weight,
            salt,
        );
        let current_pk = EdDSAPublicKey::from_point(Point::from_xy(current_leaf.pub_key_x, current_leaf.pub_key_y).unwrap_or_else(|_| Point::identity()));
        if !current_pk.verify(cmd_hash, &sig) {
            return self.route_to_blank(message.message_index, InvalidReason::SignatureInvalid);
        }

        let ballot = &self.ballots[state_index];
        if cmd.nonce != ballot.nonce + 1 {
            return self.route_to_blank(message.message_index, InvalidReason::NonceMismatch);
        }

        if cmd.vote_option_index as usize >= self.max_vote_options {
            return self.route_to_blank(message.message_index, InvalidReason::VoteOptionOutOfRange);
        }
        let vote_option_index = cmd.vote_option_index as usize;

        let prev = ballot.votes[vote_option_index];
        let new_weight = cmd.new_vote_weight as i64;
        // Vote weights fit 50 bits, so a squared weight can reach ~2^100 —
        // compute in i128 to avoid overflowing i64 on a crafted, validly
        // signed command.
        let credit_change = prev as i128 * prev as i128 - new_weight as i128 * new_weight as i128;
        let new_balance = current_leaf.voice_credit_balance as i128 + credit_change;
        if new_balance < 0 {
            return self.route_to_blank(message.message_index, InvalidReason::InsufficientVoiceCredits);
        }

        let mut new_leaf = current_leaf;
        new_leaf.pub_key_x = new_pk_x;
        new_leaf.pub_key_y = new_pk_y;
        new_leaf.voice_credit_balance = new_balance as i64;

        let mut new_ballot = ballot.clone();
        new_ballot.votes[vote_option_index] = new_weight;
        new_ballot.nonce += 1;

        self.state_leaves[state_index] = new_leaf;
        self.ballots[state_index] = new_ballot.clone();
        self.state_tree.insert(cmd.state_index, new_leaf.hash())?;
        self.ballot_tree.insert(cmd.state_index, new_ballot.hash())?;

        Ok(Outcome::Applied {
            message_index: message.message_index,
            state_index: cmd.state_index,
            new_state_leaf: new_leaf,
            new_ballot,
        })
    }
}
