//! Small batch-runner binary: loads a `CoordinatorConfig`, replays a
//! JSON-lines event fixture through a file-backed `ChainAdapter`, runs
//! every `MessageProcessor` batch, prints each batch's witness and
//! `PublicInputHasher` output, then runs the final `Tally` and submits its
//! commitment through the same adapter.
//!
//! Not a server: no network I/O, no long-running loop. Exactly the
//! ambient surface spec.md's Non-goals leave room for — enough to exercise
//! the core end to end without a real chain or prover attached.

use std::env;

use maci_adapters::ChainAdapter;
use maci_coordinator::{
    compute_final_tally, process_all_batches, project_state, CoordinatorConfig, CoreError,
    FileChainAdapter,
};
use maci_pubinput::hash_public_inputs;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config_path = env::args()
        .nth(1)
        .unwrap_or_else(|| "coordinator.toml".to_string());
    let config = CoordinatorConfig::load(&config_path)?;

    if let Err(err) = run(&config) {
        tracing::error!(error = %err, "coordinator run failed");
        return Err(err.into());
    }
    Ok(())
}

fn run(config: &CoordinatorConfig) -> Result<(), CoreError> {
    let coordinator_sk =
        maci_coordinator::keys::load_coordinator_key(&config.coordinator_seed_env)?;
    let adapter = FileChainAdapter::new(config.events_path.clone());

    tracing::info!(events_path = %config.events_path, "projecting poll state from event fixture");
    let mut poll_state =
        project_state(&adapter, config.message_sub_depth, config.message_main_depth)?;
    let num_sign_ups = poll_state.num_sign_ups();
    let message_root = poll_state.merge_message_queue()?;

    tracing::info!(num_sign_ups, ?message_root, "running message processor batches");
    let (processor, batches) = process_all_batches(
        &poll_state,
        &coordinator_sk,
        config.max_vote_options,
        config.state_tree_depth,
        message_root,
        config.batch_size,
    )?;

    for (batch_index, (witness, outcomes)) in batches.iter().enumerate() {
        let applied = outcomes
            .iter()
            .filter(|o| matches!(o, maci_processor::Outcome::Applied { .. }))
            .count();
        let public_input = hash_public_inputs(&witness.as_field_values());
        tracing::info!(
            batch_index,
            batch_start = witness.batch_start_index,
            batch_end = witness.batch_end_index,
            applied,
            routed_to_blank = outcomes.len() - applied,
            %public_input,
            "batch processed"
        );
    }

    let final_ballots: Vec<_> = processor
        .ballots()
        .to_vec();
    let tally = compute_final_tally(
        &final_ballots,
        num_sign_ups,
        config.max_vote_options,
        config.tally_mode.into(),
    )?;
    tracing::info!(
        for_votes = tally.for_votes,
        against_votes = tally.against_votes,
        abstain_votes = tally.abstain_votes,
        total_voters = tally.total_voters,
        total_spent_voice_credits = tally.total_spent_voice_credits,
        tally_commitment = ?tally.tally_commitment,
        "tally complete"
    );

    adapter
        .submit(maci_adapters::SubmissionArtifact::PublishResults {
            for_votes: tally.for_votes,
            against_votes: tally.against_votes,
            abstain_votes: tally.abstain_votes,
            total_voters: tally.total_voters,
            tally_results_hash: maci_adapters::FieldHex::from_field(tally.tally_commitment),
        })
        .map_err(CoreError::Adapter)?;

    Ok(())
}
