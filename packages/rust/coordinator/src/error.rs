//! The coordinator's composed error type: every fatal failure a batch run
//! can produce, folded from the component crates' own error types.

/// Fatal errors from a coordinator run. Per-message validity failures never
/// appear here — see `maci_processor::Outcome`.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A config file failed to load or parse.
    #[error(transparent)]
    Config(#[from] anyhow::Error),
    /// The coordinator's signing key could not be loaded.
    #[error(transparent)]
    Key(#[from] crate::keys::KeyError),
    /// Event projection failed.
    #[error(transparent)]
    State(#[from] crate::state::StateError),
    /// The message processor hit a structural failure.
    #[error(transparent)]
    Process(#[from] maci_processor::ProcessError),
    /// Tally aggregation failed.
    #[error(transparent)]
    Tally(#[from] maci_tally::TallyError),
    /// A chain or prover adapter call failed.
    #[error(transparent)]
    Adapter(#[from] maci_adapters::AdapterError),
}
