//! Coordinator orchestration: event projection, batch processing, tallying,
//! and the public-input/submission pipeline tying the lower-level crates
//! together (SPEC_FULL.md §5).

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod file_adapter;
pub mod keys;
pub mod state;

pub use config::CoordinatorConfig;
pub use error::CoreError;
pub use file_adapter::FileChainAdapter;
pub use state::PollState;

use maci_adapters::{ChainAdapter, SubmissionArtifact};
use maci_babyjub::EdDSAPrivateKey;
use maci_field::Fp;
use maci_processor::{BatchWitness, MessageProcessor, Outcome};
use maci_tally::TallyResult;

/// Replay every event a `ChainAdapter` yields into a fresh [`PollState`].
pub fn project_state(
    adapter: &dyn ChainAdapter,
    message_sub_depth: u32,
    message_main_depth: u32,
) -> Result<PollState, CoreError> {
    let mut state = PollState::new().with_message_queue(message_sub_depth, message_main_depth);
    for event in adapter.ingest(0).map_err(CoreError::Adapter)? {
        state.apply(event).map_err(CoreError::State)?;
    }
    Ok(state)
}

/// Process every message in `poll_state` against a freshly built
/// `MessageProcessor`, in batches of `batch_size`, oldest batch first (each
/// batch itself processes its messages newest-first, per spec.md §4.11).
pub fn process_all_batches(
    poll_state: &PollState,
    coordinator_sk: &EdDSAPrivateKey,
    max_vote_options: usize,
    state_tree_depth: u32,
    input_message_root: Fp,
    batch_size: u64,
) -> Result<(MessageProcessor, Vec<(BatchWitness, Vec<Outcome>)>), CoreError> {
    let mut processor = MessageProcessor::new(
        poll_state.state_leaves().to_vec(),
        max_vote_options,
        state_tree_depth,
    )
    .map_err(CoreError::Process)?;

    let messages = poll_state.messages();
    let mut batches = Vec::new();
    let mut start = 0u64;
    let total = messages.len() as u64;

    while start < total {
        let end = (start + batch_size).min(total);
        let batch = &messages[start as usize..end as usize];
        let result = processor
            .process_batch(coordinator_sk, input_message_root, batch, start, end)
            .map_err(CoreError::Process)?;
        batches.push(result);
        start = end;
    }

    Ok((processor, batches))
}

/// Compute the final tally from a processor's current ballots.
pub fn compute_final_tally(
    ballots: &[maci_processor::Ballot],
    num_sign_ups: u64,
    max_vote_options: usize,
    mode: maci_tally::TallyMode,
) -> Result<TallyResult, CoreError> {
    maci_tally::compute_tally(ballots, num_sign_ups, max_vote_options, mode).map_err(CoreError::Tally)
}

/// Submit a batch's results to the chain via the given adapter. A thin
/// wrapper so callers don't need to reach into `maci_adapters` directly for
/// the common "processMessages" case.
pub fn submit_process_messages(
    adapter: &dyn ChainAdapter,
    new_state_commitment: Fp,
    proof: maci_adapters::Groth16Proof,
) -> Result<maci_adapters::TxReceipt, CoreError> {
    adapter
        .submit(SubmissionArtifact::ProcessMessages {
            new_state_commitment: maci_adapters::FieldHex::from_field(new_state_commitment),
            proof,
        })
        .map_err(CoreError::Adapter)
}
