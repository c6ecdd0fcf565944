//! Consensus configuration from TOML (`[consensus]` section)

use nutri_domain::ConsensusLevel;
use nutri_domain::agent::config::MAX_FAN_OUT;
use nutri_domain::consensus::{DEFAULT_MIN_AGREEMENT, DEFAULT_MIN_CONFIDENCE};
use serde::{Deserialize, Serialize};

/// # Example
///
/// ```toml
/// [consensus]
/// level = "ensemble"            # solo | ensemble
/// min_confidence = 0.6
/// min_agreement = 2
/// max_fan_out = 3
/// task_timeout_seconds = 60
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConsensusConfig {
    pub level: ConsensusLevel,
    pub min_confidence: f64,
    pub min_agreement: usize,
    pub max_fan_out: usize,
    /// Outer bound on one task; unset means no bound
    pub task_timeout_seconds: Option<u64>,
}

impl Default for FileConsensusConfig {
    fn default() -> Self {
        Self {
            level: ConsensusLevel::default(),
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            min_agreement: DEFAULT_MIN_AGREEMENT,
            max_fan_out: MAX_FAN_OUT,
            task_timeout_seconds: Some(60),
        }
    }
}
