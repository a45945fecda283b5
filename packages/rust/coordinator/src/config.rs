//! Coordinator run configuration, loaded from a TOML file.

use serde::{Deserialize, Serialize};

/// Aggregation mode selector mirroring [`maci_tally::TallyMode`], kept as a
/// plain config-friendly enum so `serde`/`toml` don't need to reach into
/// `maci-tally`'s internals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TallyModeConfig {
    /// Linear (D1) aggregation.
    Linear,
    /// Quadratic (D2) aggregation.
    Quadratic,
}

impl From<TallyModeConfig> for maci_tally::TallyMode {
    fn from(value: TallyModeConfig) -> Self {
        match value {
            TallyModeConfig::Linear => maci_tally::TallyMode::Linear,
            TallyModeConfig::Quadratic => maci_tally::TallyMode::Quadratic,
        }
    }
}

/// Top-level coordinator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Maximum number of vote options this poll supports.
    pub max_vote_options: usize,
    /// Depth of the state and ballot trees (`5^depth` capacity).
    pub state_tree_depth: u32,
    /// AccQueue sub-tree depth for the message tree.
    pub message_sub_depth: u32,
    /// AccQueue main-tree depth for the message tree.
    pub message_main_depth: u32,
    /// Size of each processing batch, in messages.
    pub batch_size: u64,
    /// Aggregation mode for the final tally.
    pub tally_mode: TallyModeConfig,
    /// Path to a JSON-lines fixture of `ChainEvent` values, consumed by the
    /// file-backed `ChainAdapter` used for local runs.
    pub events_path: String,
    /// Name of the environment variable holding the coordinator's signing
    /// seed, hex-encoded. Never logged.
    pub coordinator_seed_env: String,
}

impl CoordinatorConfig {
    /// Parse configuration from a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Load configuration from a file on disk.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading config {path}: {e}"))?;
        Self::from_toml_str(&contents).map_err(|e| anyhow::anyhow!("parsing config {path}: {e}"))
    }
}
