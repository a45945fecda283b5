//! State leaves and ballots: the two per-voter records the processor reads
//! and rewrites (spec.md §3).

use maci_field::Fp;

/// Number of vote options a [`Ballot`] tracks. Fixed for the life of a poll;
/// the processor rejects any `voteOptionIndex` outside `0..MAX_VOTE_OPTIONS`.
pub const MAX_VOTE_OPTIONS: usize = 25;

/// A voter's current public key and voice-credit balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateLeaf {
    /// Current public key, x coordinate.
    pub pub_key_x: Fp,
    /// Current public key, y coordinate.
    pub pub_key_y: Fp,
    /// Remaining voice credits.
    pub voice_credit_balance: i64,
    /// Sign-up timestamp.
    pub timestamp: u64,
}

impl StateLeaf {
    /// The all-zero "blank" state leaf that invalid commands route to.
    pub fn blank() -> Self {
        Self {
            pub_key_x: Fp::zero(),
            pub_key_y: Fp::zero(),
            voice_credit_balance: 0,
            timestamp: 0,
        }
    }

    /// `Poseidon_4(pubKeyX, pubKeyY, voiceCreditBalance, timestamp)`.
    pub fn hash(&self) -> Fp {
        let balance = Fp::from_u64(self.voice_credit_balance.unsigned_abs());
        maci_poseidon::hash(&[
            self.pub_key_x,
            self.pub_key_y,
            balance,
            Fp::from_u64(self.timestamp),
        ])
        .expect("width-4 input to a 5-wide Poseidon permutation is always supported")
    }
}

/// A voter's per-poll ballot: the nonce of the next expected command and
/// the current vote weight for every option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ballot {
    /// Count of commands accepted for this voter since sign-up.
    pub nonce: u64,
    /// Current weight assigned to each vote option.
    pub votes: Vec<i64>,
}

impl Ballot {
    /// A fresh, all-zero ballot over `max_vote_options` options.
    pub fn blank(max_vote_options: usize) -> Self {
        Self {
            nonce: 0,
            votes: vec![0; max_vote_options],
        }
    }

    /// Quinary root of `votes`, padded with zero leaves, via a depth-5 tree
    /// (`5^5 = 3125 ≥ MAX_VOTE_OPTIONS` for any poll this workspace builds).
    pub fn vote_option_root(&self) -> Fp {
        votes_root(&self.votes)
    }

    /// Binds `nonce` and the vote-option root: `Poseidon_2(nonce,
    /// voteOptionRoot)`.
    pub fn hash(&self) -> Fp {
        maci_poseidon::hash(&[Fp::from_u64(self.nonce), self.vote_option_root()])
            .expect("width-2 input to a 3-wide Poseidon permutation is always supported")
    }
}

const VOTE_TREE_DEPTH: u32 = 5;

fn votes_root(votes: &[i64]) -> Fp {
    let mut tree = maci_trees::QuinaryTree::new(VOTE_TREE_DEPTH);
    for (i, v) in votes.iter().enumerate() {
        tree.insert(i as u64, Fp::from_u64(v.unsigned_abs()))
            .expect("vote option count never exceeds 5^VOTE_TREE_DEPTH");
    }
    tree.root()
}
