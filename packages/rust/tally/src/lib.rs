//! Tally aggregation and commitment (C13).
//!
//! Consumes the post-processing ballot set read-only (spec.md §5: "the
//! tally consumes [the trees] read-only after processing completes") and
//! folds it into per-option sums, the totals the chain contract publishes,
//! and a single `tallyCommitment` binding everything for on-chain
//! verification.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

use maci_field::Fp;
use maci_processor::Ballot;
use maci_trees::QuinaryTree;

/// Depth of the quinary trees `tallyCommitment` is built over. `5^5 = 3125`
/// comfortably covers any vote-option count this workspace's processor
/// accepts (bounded by `maci_processor::MAX_VOTE_OPTIONS`).
const RESULTS_TREE_DEPTH: u32 = 5;

/// Vote-option index spec.md's linear (D1) mode treats as "for".
const FOR_OPTION_INDEX: usize = 1;
/// Vote-option index spec.md's linear (D1) mode treats as "against".
const AGAINST_OPTION_INDEX: usize = 0;
/// Vote-option index spec.md's linear (D1) mode treats as "abstain".
/// Always reported as zero in quadratic (D2) mode.
const ABSTAIN_OPTION_INDEX: usize = 2;

/// Errors raised assembling a tally.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TallyError {
    /// `ballots.len()` did not match the configured `numSignUps`.
    #[error("expected {expected} ballots (numSignUps), got {actual}")]
    BallotCountMismatch {
        /// Ballots actually supplied.
        actual: usize,
        /// Ballots `numSignUps` implies.
        expected: usize,
    },
}

/// Aggregation mode: linear voice-credit spending (D1) or quadratic (D2).
/// The quadratic cost is charged by the processor (spec.md §4.11e); the
/// tally itself only changes whether an "abstain" bucket is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TallyMode {
    /// Linear mode: `perOptionTally[2]` is reported as `abstainVotes`.
    Linear,
    /// Quadratic mode: `abstainVotes` is always reported as zero.
    Quadratic,
}

/// The aggregated result of tallying one poll's ballots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TallyResult {
    /// Sum of `ballot.votes[j]` across all voters, per option `j`.
    pub per_option_tally: Vec<i64>,
    /// Sum of `ballot.votes[j]^2` across all voters, per option `j`.
    pub per_option_spent: Vec<i64>,
    /// Sum of every `per_option_spent` entry.
    pub total_spent_voice_credits: i64,
    /// Count of voters (state indices `1..numSignUps`) with any non-zero
    /// vote.
    pub total_voters: u64,
    /// `perOptionTally[FOR_OPTION_INDEX]`.
    pub for_votes: i64,
    /// `perOptionTally[AGAINST_OPTION_INDEX]`.
    pub against_votes: i64,
    /// `perOptionTally[ABSTAIN_OPTION_INDEX]` in linear mode, else zero.
    pub abstain_votes: i64,
    /// `Poseidon_3(tallyResultsRoot, totalSpentVoiceCredits,
    /// perOptionSpentRoot)`.
    pub tally_commitment: Fp,
}

/// Aggregate `ballots` (indexed by state index, including the unused blank
/// entry at index 0) into a [`TallyResult`].
pub fn compute_tally(
    ballots: &[Ballot],
    num_sign_ups: u64,
    max_vote_options: usize,
    mode: TallyMode,
) -> Result<TallyResult, TallyError> {
    if ballots.len() as u64 != num_sign_ups {
        return Err(TallyError::BallotCountMismatch {
            actual: ballots.len(),
            expected: num_sign_ups as usize,
        });
    }

    let mut per_option_tally = vec![0i64; max_vote_options];
    // Vote weights fit 50 bits, so a squared weight can reach ~2^100 —
    // accumulate in i128 to avoid overflowing i64 on a crafted, validly
    // signed vote weight, then narrow once at the end.
    let mut per_option_spent = vec![0i128; max_vote_options];
    let mut total_voters = 0u64;

    for ballot in ballots.iter().skip(1) {
        let mut voted = false;
        for (j, weight) in ballot.votes.iter().enumerate().take(max_vote_options) {
            if *weight != 0 {
                voted = true;
            }
            per_option_tally[j] += weight;
            per_option_spent[j] += weight as i128 * weight as i128;
        }
        if voted {
            total_voters += 1;
        }
    }

    let total_spent_voice_credits: i64 = per_option_spent.iter().sum::<i128>() as i64;
    let per_option_spent: Vec<i64> = per_option_spent.into_iter().map(|v| v as i64).collect();

    let for_votes = *per_option_tally.get(FOR_OPTION_INDEX).unwrap_or(&0);
    let against_votes = *per_option_tally.get(AGAINST_OPTION_INDEX).unwrap_or(&0);
    let abstain_votes = match mode {
        TallyMode::Linear => *per_option_tally.get(ABSTAIN_OPTION_INDEX).unwrap_or(&0),
        TallyMode::Quadratic => 0,
    };

    let tally_root = signed_values_root(&per_option_tally);
    let spent_root = signed_values_root(&per_option_spent);
    let tally_commitment = maci_poseidon::hash(&[
        tally_root,
        Fp::from_u64(total_spent_voice_credits.unsigned_abs()),
        spent_root,
    ])
    .expect("width-3 input to a 4-wide Poseidon permutation is always supported");

    Ok(TallyResult {
        per_option_tally,
        per_option_spent,
        total_spent_voice_credits,
        total_voters,
        for_votes,
        against_votes,
        abstain_votes,
        tally_commitment,
    })
}

fn signed_values_root(values: &[i64]) -> Fp {
    let mut tree = QuinaryTree::new(RESULTS_TREE_DEPTH);
    for (i, v) in values.iter().enumerate() {
        tree.insert(i as u64, Fp::from_u64(v.unsigned_abs()))
            .expect("value count never exceeds 5^RESULTS_TREE_DEPTH");
    }
    tree.root()
}
